//! Minimal synchronous HTTP/1.0 client.
//!
//! # Overview
//! Sends one request per connection over a blocking `TcpStream`, parses the
//! response incrementally and returns it as JSON text:
//!
//! ```text
//! {"status": 200,"header": {"Content-Length": "2"},"body": "\\x4f\\x4b"}
//! ```
//!
//! # Design
//! - `ByteBuffer` is the one growable byte primitive; the request encoder,
//!   the receive path and the JSON renderer all build on it.
//! - `ResponseParser` is an explicit state machine that can be pumped with
//!   arbitrarily split input; `transport` drives it from any `Read + Write`.
//! - Parsing produces a structured `HttpResponse`; `json::render` turns it
//!   into text as a separate step.
//! - `HttpClient` adds URL parsing, name resolution, connection setup and
//!   optional deadlines from `ClientConfig`.

pub mod buffer;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod json;
pub mod parser;
pub mod resolver;
pub mod transport;
pub mod url;

pub use buffer::ByteBuffer;
pub use client::{http_get, http_post, HttpClient};
pub use config::{ClientConfig, FramingPolicy};
pub use error::{BufferError, ConfigError, ErrorKind, HttpError, HttpResult, ParseError, UrlError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use parser::{parse_response, ParseState, Progress, ResponseParser};
pub use resolver::{Endpoint, Resolve, StaticResolver, SystemResolver};
pub use url::Target;
