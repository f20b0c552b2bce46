//! HTTP/1.0 request and response values.
//!
//! # Design
//! Requests and responses are plain data. `HttpRequest::encode` produces the
//! exact bytes to put on the wire; `HttpResponse` is the structured result
//! of `ResponseParser` and the input of the JSON assembler. Neither type
//! touches the network, which keeps the serializer and the parser testable
//! without sockets.

use crate::buffer::ByteBuffer;
use crate::error::BufferError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP/1.0 request described as plain data.
///
/// `header_text` is opaque: it is written as-is, followed by the blank line
/// that ends the header block, so callers pass zero or more complete
/// `Name: value\r\n` lines.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub header_text: String,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(path: &str, header_text: &str) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.to_string(),
            header_text: header_text.to_string(),
            body: None,
        }
    }

    pub fn post(path: &str, header_text: &str, body: &[u8]) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.to_string(),
            header_text: header_text.to_string(),
            body: Some(body.to_vec()),
        }
    }

    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }

    /// Serialize into wire bytes:
    ///
    /// ```text
    /// <METHOD> <path> HTTP/1.0\r\n
    /// Content-Length: <n>\r\n
    /// <header_text>\r\n
    /// <body>
    /// ```
    pub fn encode(&self) -> Result<ByteBuffer, BufferError> {
        let mut buf = ByteBuffer::new();
        buf.print(format_args!("{} {} HTTP/1.0\r\n", self.method.as_str(), self.path))?;
        buf.print(format_args!("Content-Length: {}\r\n", self.body_len()))?;
        buf.print(format_args!("{}\r\n", self.header_text))?;
        if let Some(body) = &self.body {
            buf.write(body)?;
        }
        Ok(buf)
    }
}

/// A parsed HTTP response.
///
/// `headers` keeps wire order. A `Content-Length` header appears under that
/// exact name with the parsed decimal value, whatever its spelling on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub version: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub content_length: Option<usize>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
