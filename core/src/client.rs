//! Blocking HTTP/1.0 client.
//!
//! # Design
//! `HttpClient` holds only an immutable `ClientConfig` and a resolver, so one
//! client can serve calls from several threads. Each call parses the URL,
//! resolves the host, opens its own `TcpStream`, runs one exchange and drops
//! the stream. Input errors are reported before any socket exists, and the
//! socket is closed on every exit path because it is owned by the call.

use std::fmt;
use std::net::TcpStream;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{HttpError, HttpResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::json;
use crate::resolver::{Endpoint, Resolve, SystemResolver};
use crate::transport;
use crate::url::Target;

#[derive(Clone)]
pub struct HttpClient {
    config: ClientConfig,
    resolver: Arc<dyn Resolve>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_resolver(config, SystemResolver)
    }

    pub fn with_resolver(config: ClientConfig, resolver: impl Resolve + 'static) -> Self {
        Self {
            config,
            resolver: Arc::new(resolver),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET url`, returning the response as JSON text.
    pub fn get(&self, url: &str, header_text: &str) -> HttpResult<String> {
        let response = self.fetch(HttpMethod::Get, url, header_text, None)?;
        Ok(json::render(&response)?)
    }

    /// `POST url` with `body`, returning the response as JSON text.
    pub fn post(&self, url: &str, header_text: &str, body: &[u8]) -> HttpResult<String> {
        let response = self.fetch(HttpMethod::Post, url, header_text, Some(body))?;
        Ok(json::render(&response)?)
    }

    /// Run one request and return the parsed response.
    pub fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        header_text: &str,
        body: Option<&[u8]>,
    ) -> HttpResult<HttpResponse> {
        self.config.validate()?;
        let target = Target::parse(url)?;
        let request = HttpRequest {
            method,
            path: target.path.clone(),
            header_text: header_text.to_string(),
            body: body.map(<[u8]>::to_vec),
        };

        let endpoint = self.resolver.resolve(&target.host, target.port)?;
        let mut stream = self.connect(&endpoint)?;
        tracing::debug!(
            method = method.as_str(),
            addr = %endpoint.socket_addr(),
            path = %target.path,
            "connected"
        );

        transport::exchange(&mut stream, &request, &self.config)
    }

    fn connect(&self, endpoint: &Endpoint) -> HttpResult<TcpStream> {
        let addr = endpoint.socket_addr();
        let stream = match self.config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(HttpError::Connect)?;

        stream
            .set_read_timeout(self.config.read_timeout())
            .map_err(HttpError::Connect)?;
        stream
            .set_write_timeout(self.config.write_timeout())
            .map_err(HttpError::Connect)?;
        Ok(stream)
    }
}

/// `GET url` with the default configuration.
pub fn http_get(url: &str, header_text: &str) -> HttpResult<String> {
    HttpClient::default().get(url, header_text)
}

/// `POST url` with the default configuration.
pub fn http_post(url: &str, header_text: &str, body: &[u8]) -> HttpResult<String> {
    HttpClient::default().post(url, header_text, body)
}
