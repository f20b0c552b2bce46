//! Incremental HTTP/1.0 response parser.
//!
//! # Design
//! `ResponseParser` owns the receive buffer and moves through
//! `Headers -> Body -> Done`, never backwards. The caller pumps it: `feed`
//! received bytes, `close` when the peer hangs up, and call `advance`, which
//! consumes whatever is buffered and answers either `NeedMore` or
//! `Complete`. Every step depends only on the current state, the buffered
//! bytes and the peer-closed flag, so the result is the same however the
//! stream was split into reads.

use crate::buffer::ByteBuffer;
use crate::config::FramingPolicy;
use crate::error::ParseError;
use crate::http::HttpResponse;

const STATUS_PREFIX: &[u8] = b"HTTP/";
const CONTENT_LENGTH_PREFIX: &[u8] = b"Content-Length:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Reading the status line and header block.
    Headers,
    /// Header block done; waiting for the body to be framed.
    Body,
    /// A response has been produced.
    Done,
}

/// Result of one `advance` step.
#[derive(Debug)]
pub enum Progress {
    /// Receive more bytes (or the peer close) before advancing again.
    NeedMore,
    Complete(HttpResponse),
}

#[derive(Debug)]
pub struct ResponseParser {
    recv: ByteBuffer,
    state: ParseState,
    peer_closed: bool,
    policy: FramingPolicy,
    status: Option<(String, u16)>,
    headers: Vec<(String, String)>,
    content_length: Option<usize>,
}

impl ResponseParser {
    pub fn new(policy: FramingPolicy) -> Self {
        Self::from_buffer(ByteBuffer::new(), policy)
    }

    /// Parser whose receive buffer starts with room for `capacity` bytes.
    pub fn with_capacity(policy: FramingPolicy, capacity: usize) -> Result<Self, ParseError> {
        Ok(Self::from_buffer(ByteBuffer::with_capacity(capacity)?, policy))
    }

    fn from_buffer(recv: ByteBuffer, policy: FramingPolicy) -> Self {
        Self {
            recv,
            state: ParseState::Headers,
            peer_closed: false,
            policy,
            status: None,
            headers: Vec::new(),
            content_length: None,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_peer_closed(&self) -> bool {
        self.peer_closed
    }

    /// Bytes received but not yet consumed by the header parser.
    pub fn buffered(&self) -> usize {
        self.recv.len()
    }

    /// Append received bytes.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        self.recv.write(bytes)?;
        Ok(())
    }

    /// Record that the peer closed the connection; no more bytes will come.
    pub fn close(&mut self) {
        self.peer_closed = true;
    }

    /// Consume buffered bytes as far as possible.
    pub fn advance(&mut self) -> Result<Progress, ParseError> {
        loop {
            match self.state {
                ParseState::Headers => match self.recv.read_line() {
                    Some(line) => {
                        if self.header_line(&line)? {
                            tracing::debug!(
                                headers = self.headers.len(),
                                content_length = ?self.content_length,
                                "header block complete"
                            );
                            self.state = ParseState::Body;
                        }
                    }
                    None if self.peer_closed => return Err(ParseError::UnexpectedEof),
                    None => return Ok(Progress::NeedMore),
                },
                ParseState::Body => {
                    if !self.body_complete()? {
                        return Ok(Progress::NeedMore);
                    }
                    let response = self.take_response()?;
                    self.state = ParseState::Done;
                    return Ok(Progress::Complete(response));
                }
                ParseState::Done => return Err(ParseError::AlreadyComplete),
            }
        }
    }

    /// Handle one header-block line. Returns `true` on the terminating blank line.
    fn header_line(&mut self, line: &[u8]) -> Result<bool, ParseError> {
        if line.is_empty() {
            if self.status.is_none() {
                return Err(ParseError::MissingStatusLine);
            }
            return Ok(true);
        }

        let text = String::from_utf8_lossy(line);

        if starts_with_ignore_case(line, STATUS_PREFIX) {
            if self.status.is_some() {
                return Err(ParseError::DuplicateStatusLine(text.into_owned()));
            }
            self.status = Some(parse_status_line(&text)?);
            return Ok(false);
        }

        if self.status.is_none() {
            return Err(ParseError::MissingStatusLine);
        }

        if starts_with_ignore_case(line, CONTENT_LENGTH_PREFIX) {
            let raw = text[CONTENT_LENGTH_PREFIX.len()..].trim();
            let declared = raw
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))?;
            self.content_length = Some(declared);
            self.headers
                .push(("Content-Length".to_string(), declared.to_string()));
            return Ok(false);
        }

        let (name, value) = text
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedHeader(text.to_string()))?;
        let value = value.trim_start_matches(|c: char| c.is_control() || c.is_whitespace());
        self.headers.push((name.to_string(), value.to_string()));
        Ok(false)
    }

    fn body_complete(&self) -> Result<bool, ParseError> {
        let received = self.recv.len();
        let Some(declared) = self.content_length else {
            return Ok(self.peer_closed);
        };
        if received == declared {
            return Ok(true);
        }

        match self.policy {
            FramingPolicy::Strict if received > declared || self.peer_closed => {
                Err(ParseError::FramingMismatch { declared, received })
            }
            FramingPolicy::Lenient if self.peer_closed => {
                tracing::warn!(declared, received, "body length differs from Content-Length");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn take_response(&mut self) -> Result<HttpResponse, ParseError> {
        let (version, status) = self.status.take().ok_or(ParseError::MissingStatusLine)?;
        let body = std::mem::take(&mut self.recv).into_vec();
        Ok(HttpResponse {
            version,
            status,
            headers: std::mem::take(&mut self.headers),
            content_length: self.content_length,
            body,
        })
    }
}

/// Parse a complete response held in memory, as if the peer closed after it.
pub fn parse_response(bytes: &[u8], policy: FramingPolicy) -> Result<HttpResponse, ParseError> {
    let mut parser = ResponseParser::new(policy);
    parser.feed(bytes)?;
    if let Progress::Complete(response) = parser.advance()? {
        return Ok(response);
    }
    parser.close();
    match parser.advance()? {
        Progress::Complete(response) => Ok(response),
        Progress::NeedMore => Err(ParseError::UnexpectedEof),
    }
}

fn starts_with_ignore_case(line: &[u8], prefix: &[u8]) -> bool {
    line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// `HTTP/<version> <status> [reason]` -> (version, status).
fn parse_status_line(line: &str) -> Result<(String, u16), ParseError> {
    let malformed = || ParseError::MalformedStatusLine(line.to_string());

    let mut fields = line[STATUS_PREFIX.len()..].split_whitespace();
    let version = fields.next().ok_or_else(malformed)?;
    version.parse::<f64>().map_err(|_| malformed())?;
    let status = fields
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(malformed)?;

    Ok((version.to_string(), status))
}
