//! Error types for the HTTP/1.0 client.
//!
//! # Design
//! Each stage owns a narrow error enum (`BufferError`, `UrlError`,
//! `ParseError`) and `HttpError` wraps them together with the transport
//! failures, one variant per failing phase. Callers that only care about the
//! category use `HttpError::kind()`; the FFI layer maps kinds to stable
//! numeric codes.

use std::io;

use thiserror::Error;

/// Result alias used throughout the client.
pub type HttpResult<T> = Result<T, HttpError>;

/// Failures of the growable byte buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The allocator refused to grow the buffer.
    #[error("failed to allocate {requested} bytes")]
    AllocationFailed { requested: usize },

    /// `read` was asked to consume more bytes than are buffered.
    #[error("cannot consume {requested} bytes, only {available} buffered")]
    Underflow { requested: usize, available: usize },

    /// A `Display` implementation reported an error while rendering.
    #[error("formatting failed")]
    Format,
}

/// Caller errors in the URL. Raised before any network activity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("protocol error: url must start with http://")]
    UnsupportedScheme,

    #[error("url error: missing '/' path separator")]
    MissingPath,

    #[error("url error: empty host")]
    EmptyHost,

    #[error("url error: host is {len} bytes, limit is {max}")]
    HostTooLong { len: usize, max: usize },

    #[error("url error: invalid port {0:?}")]
    InvalidPort(String),
}

/// Protocol errors found while parsing the response stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line starting with `HTTP/` lacked the version and status fields.
    #[error("malformed status line {0:?}")]
    MalformedStatusLine(String),

    /// A header line without a `:` separator.
    #[error("malformed header line {0:?}")]
    MalformedHeader(String),

    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),

    /// A header or the blank line arrived before any status line.
    #[error("response does not start with a status line")]
    MissingStatusLine,

    #[error("duplicate status line {0:?}")]
    DuplicateStatusLine(String),

    /// The peer closed the connection in the middle of the header block.
    #[error("connection closed before the header block ended")]
    UnexpectedEof,

    /// Strict framing only: the body length disagrees with `Content-Length`.
    #[error("body is {received} bytes but Content-Length declared {declared}")]
    FramingMismatch { declared: usize, received: usize },

    #[error("response already complete")]
    AlreadyComplete,

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Broad error category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Resolution,
    Transport,
    Protocol,
    Internal,
}

/// Errors returned by the client entry points.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Url(#[from] UrlError),

    #[error("failed to resolve host {host:?}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    /// The read deadline elapsed while waiting for response bytes.
    #[error("timed out waiting for response")]
    Timeout,

    #[error("response parse failed: {0}")]
    Parse(ParseError),

    #[error("internal error: {0}")]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ParseError> for HttpError {
    fn from(err: ParseError) -> Self {
        match err {
            // Allocation failures stay internal errors even when they surface
            // through the parser.
            ParseError::Buffer(e) => HttpError::Buffer(e),
            other => HttpError::Parse(other),
        }
    }
}

impl HttpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::Url(_) | HttpError::Config(_) => ErrorKind::Input,
            HttpError::Resolve { .. } => ErrorKind::Resolution,
            HttpError::Connect(_)
            | HttpError::Send(_)
            | HttpError::Receive(_)
            | HttpError::Timeout => ErrorKind::Transport,
            HttpError::Parse(_) => ErrorKind::Protocol,
            HttpError::Buffer(_) => ErrorKind::Internal,
        }
    }
}
