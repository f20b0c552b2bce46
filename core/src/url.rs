//! `http://host[:port]/path` splitting.
//!
//! Everything up to the first `/` after the scheme is the authority, the
//! first `/` onward is the request path and is sent verbatim. A `:` in the
//! authority introduces a decimal port, otherwise port 80 is used.

use crate::error::UrlError;

const SCHEME: &str = "http://";

pub const DEFAULT_PORT: u16 = 80;

/// Longest host name accepted.
pub const MAX_HOST_LEN: usize = 255;

/// A parsed request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Target {
    pub fn parse(url: &str) -> Result<Self, UrlError> {
        let rest = strip_scheme(url).ok_or(UrlError::UnsupportedScheme)?;
        let slash = rest.find('/').ok_or(UrlError::MissingPath)?;
        let (authority, path) = rest.split_at(slash);
        let (host, port) = split_authority(authority)?;

        Ok(Self {
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// `host:port`, as handed to the resolver.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn strip_scheme(url: &str) -> Option<&str> {
    let prefix = url.get(..SCHEME.len())?;
    if prefix.eq_ignore_ascii_case(SCHEME) {
        Some(&url[SCHEME.len()..])
    } else {
        None
    }
}

/// Split `host[:port]`.
pub fn split_authority(authority: &str) -> Result<(&str, u16), UrlError> {
    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| UrlError::InvalidPort(port.to_string()))?;
            (host, port)
        }
        None => (authority, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(UrlError::EmptyHost);
    }
    if host.len() > MAX_HOST_LEN {
        return Err(UrlError::HostTooLong {
            len: host.len(),
            max: MAX_HOST_LEN,
        });
    }
    Ok((host, port))
}
