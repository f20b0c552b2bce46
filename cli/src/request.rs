use std::path::Path;

use anyhow::{bail, Context};
use httpc_core::{json, ClientConfig, FramingPolicy, HttpClient, HttpMethod, HttpResponse};

use crate::Options;

/// Config file (if any) with command-line overrides applied.
pub fn load_config(options: &Options) -> anyhow::Result<ClientConfig> {
    let mut config = match &options.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(ms) = options.connect_timeout_ms {
        config.connect_timeout_ms = Some(ms);
    }
    if let Some(ms) = options.read_timeout_ms {
        config.read_timeout_ms = Some(ms);
    }
    if options.strict_framing {
        config.framing = FramingPolicy::Strict;
    }
    config.validate()?;
    Ok(config)
}

/// Join `Name: value` arguments into header text, one CRLF-terminated line each.
pub fn header_text(headers: &[String]) -> anyhow::Result<String> {
    let mut text = String::new();
    for header in headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("header {header:?} is not of the form \"Name: value\"");
        };
        let name = name.trim();
        if name.is_empty() || header.contains(['\r', '\n']) {
            bail!("invalid header {header:?}");
        }
        text.push_str(name);
        text.push_str(": ");
        text.push_str(value.trim());
        text.push_str("\r\n");
    }
    Ok(text)
}

pub fn read_body(data: Option<String>, data_file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match (data, data_file) {
        (Some(data), _) => Ok(data.into_bytes()),
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("reading body from {}", path.display()))
        }
        (None, None) => Ok(Vec::new()),
    }
}

pub fn get(config: ClientConfig, url: &str, headers: &[String], pretty: bool) -> anyhow::Result<()> {
    let header = header_text(headers)?;
    let client = HttpClient::new(config);
    tracing::info!(url, "GET");
    let response = client
        .fetch(HttpMethod::Get, url, &header, None)
        .with_context(|| format!("GET {url}"))?;
    println!("{}", format_response(&response, pretty)?);
    Ok(())
}

pub fn post(
    config: ClientConfig,
    url: &str,
    headers: &[String],
    body: &[u8],
    pretty: bool,
) -> anyhow::Result<()> {
    let header = header_text(headers)?;
    let client = HttpClient::new(config);
    tracing::info!(url, body = body.len(), "POST");
    let response = client
        .fetch(HttpMethod::Post, url, &header, Some(body))
        .with_context(|| format!("POST {url}"))?;
    println!("{}", format_response(&response, pretty)?);
    Ok(())
}

fn format_response(response: &HttpResponse, pretty: bool) -> anyhow::Result<String> {
    let text = if pretty {
        json::render_pretty(response)?
    } else {
        json::render(response)?
    };
    Ok(text)
}
