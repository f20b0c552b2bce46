//! Blocking request/response exchange over any byte stream.
//!
//! # Design
//! The functions here take `Read`/`Write` values rather than sockets, so the
//! same code drives a `TcpStream` in production and an in-memory stream in
//! tests. One exchange is one request and one response; the stream is not
//! reused.

use std::io::{self, Read, Write};

use crate::buffer::ByteBuffer;
use crate::config::ClientConfig;
use crate::error::{HttpError, HttpResult};
use crate::http::{HttpRequest, HttpResponse};
use crate::parser::{Progress, ResponseParser};

/// Send `request`, then read and parse the response.
pub fn exchange<S: Read + Write>(
    stream: &mut S,
    request: &HttpRequest,
    config: &ClientConfig,
) -> HttpResult<HttpResponse> {
    let mut outgoing = request.encode()?;
    send_request(stream, &mut outgoing)?;
    receive_response(stream, config)
}

/// Drain `buf` into `writer`, consuming exactly what each write accepted.
pub fn send_request<W: Write>(writer: &mut W, buf: &mut ByteBuffer) -> HttpResult<()> {
    let total = buf.len();
    while !buf.is_empty() {
        match writer.write(buf.as_slice()) {
            Ok(0) => return Err(HttpError::Send(io::Error::from(io::ErrorKind::WriteZero))),
            Ok(n) => buf.read(n)?,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HttpError::Send(e)),
        }
    }
    writer.flush().map_err(HttpError::Send)?;
    tracing::debug!(bytes = total, "request sent");
    Ok(())
}

/// Read from `reader` until the parser produces a response.
pub fn receive_response<R: Read>(reader: &mut R, config: &ClientConfig) -> HttpResult<HttpResponse> {
    let mut parser = ResponseParser::with_capacity(config.framing, config.initial_buffer_capacity)?;
    let mut chunk = vec![0u8; config.recv_chunk_size.max(1)];
    let mut received = 0usize;

    loop {
        if let Progress::Complete(response) = parser.advance()? {
            tracing::debug!(
                status = response.status,
                body = response.body.len(),
                received,
                "response complete"
            );
            return Ok(response);
        }

        match reader.read(&mut chunk) {
            Ok(0) => {
                tracing::debug!(received, "peer closed connection");
                parser.close();
            }
            Ok(n) => {
                received += n;
                parser.feed(&chunk[..n])?;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(HttpError::Timeout);
            }
            Err(e) => return Err(HttpError::Receive(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::config::FramingPolicy;
    use crate::error::{ErrorKind, ParseError};

    /// In-memory stream: replays `reads` chunk by chunk, records writes.
    #[derive(Default)]
    struct MockStream {
        reads: VecDeque<io::Result<Vec<u8>>>,
        written: Vec<u8>,
        max_write: Option<usize>,
        write_error: Option<io::ErrorKind>,
    }

    impl MockStream {
        fn replying(chunks: &[&[u8]]) -> Self {
            Self {
                reads: chunks.iter().map(|c| Ok(c.to_vec())).collect(),
                ..Self::default()
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(mut chunk)) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.reads.push_front(Ok(chunk.split_off(n)));
                    }
                    Ok(n)
                }
            }
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(kind) = self.write_error {
                return Err(io::Error::from(kind));
            }
            let n = self.max_write.map_or(buf.len(), |m| m.min(buf.len()));
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn get_exchange_writes_request_and_parses_reply() {
        let mut stream = MockStream::replying(&[b"HTTP/1.0 200 OK\r\nContent-Length: 2\r\n\r\nOK"]);
        let request = HttpRequest::get("/index", "");
        let response = exchange(&mut stream, &request, &ClientConfig::default()).unwrap();

        assert_eq!(stream.written, b"GET /index HTTP/1.0\r\nContent-Length: 0\r\n\r\n");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"OK");
    }

    #[test]
    fn partial_writes_are_resumed() {
        let mut stream = MockStream {
            max_write: Some(3),
            ..MockStream::replying(&[b"HTTP/1.0 201 Created\r\n\r\n"])
        };
        let request = HttpRequest::post("/items", "X-Id: 7\r\n", b"payload");
        let response = exchange(&mut stream, &request, &ClientConfig::default()).unwrap();

        assert_eq!(
            stream.written,
            b"POST /items HTTP/1.0\r\nContent-Length: 7\r\nX-Id: 7\r\n\r\npayload"
        );
        assert_eq!(response.status, 201);
    }

    #[test]
    fn write_failure_is_a_send_error() {
        let mut stream = MockStream {
            write_error: Some(io::ErrorKind::BrokenPipe),
            ..MockStream::default()
        };
        let err = exchange(&mut stream, &HttpRequest::get("/", ""), &ClientConfig::default()).unwrap_err();
        assert!(matches!(err, HttpError::Send(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn zero_length_write_is_a_send_error() {
        let mut stream = MockStream {
            max_write: Some(0),
            ..MockStream::default()
        };
        let err = exchange(&mut stream, &HttpRequest::get("/", ""), &ClientConfig::default()).unwrap_err();
        assert!(matches!(err, HttpError::Send(ref e) if e.kind() == io::ErrorKind::WriteZero));
    }

    #[test]
    fn small_read_chunks_give_the_same_response() {
        let reply: &[u8] = b"HTTP/1.0 200 OK\r\nServer: mock\r\nContent-Length: 5\r\n\r\nhello";
        let config = ClientConfig {
            recv_chunk_size: 1,
            ..ClientConfig::default()
        };
        let mut stream = MockStream::replying(&[reply]);
        let tiny = receive_response(&mut stream, &config).unwrap();

        let mut stream = MockStream::replying(&[reply]);
        let whole = receive_response(&mut stream, &ClientConfig::default()).unwrap();
        assert_eq!(tiny, whole);
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut stream = MockStream::default();
        stream.reads.push_back(Ok(b"HTTP/1.0 200 OK\r\n".to_vec()));
        stream.reads.push_back(Err(io::Error::from(io::ErrorKind::Interrupted)));
        stream.reads.push_back(Ok(b"\r\nbody".to_vec()));
        let response = receive_response(&mut stream, &ClientConfig::default()).unwrap();
        assert_eq!(response.body, b"body");
    }

    #[test]
    fn read_timeout_maps_to_timeout() {
        let mut stream = MockStream::default();
        stream.reads.push_back(Ok(b"HTTP/1.0 200 OK\r\n".to_vec()));
        stream.reads.push_back(Err(io::Error::from(io::ErrorKind::WouldBlock)));
        let err = receive_response(&mut stream, &ClientConfig::default()).unwrap_err();
        assert!(matches!(err, HttpError::Timeout));
    }

    #[test]
    fn read_failure_is_a_receive_error() {
        let mut stream = MockStream::default();
        stream.reads.push_back(Err(io::Error::from(io::ErrorKind::ConnectionReset)));
        let err = receive_response(&mut stream, &ClientConfig::default()).unwrap_err();
        assert!(matches!(err, HttpError::Receive(_)));
    }

    #[test]
    fn close_during_headers_is_a_parse_error() {
        let mut stream = MockStream::replying(&[b"HTTP/1.0 200 OK\r\nServer"]);
        let err = receive_response(&mut stream, &ClientConfig::default()).unwrap_err();
        assert!(matches!(err, HttpError::Parse(ParseError::UnexpectedEof)));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn strict_framing_comes_from_config() {
        let config = ClientConfig::default().with_framing(FramingPolicy::Strict);
        let mut stream = MockStream::replying(&[b"HTTP/1.0 200 OK\r\nContent-Length: 9\r\n\r\nshort"]);
        let err = receive_response(&mut stream, &config).unwrap_err();
        assert!(matches!(
            err,
            HttpError::Parse(ParseError::FramingMismatch { declared: 9, received: 5 })
        ));
    }

    #[test]
    fn content_length_stops_reading_before_close() {
        let mut stream = MockStream::replying(&[b"HTTP/1.0 200 OK\r\nContent-Length: 2\r\n\r\nOK"]);
        stream
            .reads
            .push_back(Err(io::Error::other("read past end of response")));
        let response = receive_response(&mut stream, &ClientConfig::default()).unwrap();
        assert_eq!(response.body, b"OK");
    }
}
