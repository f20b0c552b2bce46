//! Raw TCP responder that replays scripted bytes.
//!
//! Serves exactly one connection: reads the full request (head plus any
//! `Content-Length` body), writes each chunk with a flush and a pause in
//! between, optionally keeps the socket open, then closes it. The captured
//! request is returned from `ScriptedServer::finish`.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Script {
    chunks: Vec<Vec<u8>>,
    pause: Duration,
    hold_open: Option<Duration>,
}

impl Script {
    /// Reply with `reply` in one write.
    pub fn reply(reply: impl Into<Vec<u8>>) -> Self {
        Self {
            chunks: vec![reply.into()],
            ..Self::default()
        }
    }

    /// Reply with each chunk in its own write.
    pub fn chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sleep between chunk writes so they arrive as separate reads.
    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Keep the connection open this long after the last chunk.
    pub fn hold_open(mut self, hold: Duration) -> Self {
        self.hold_open = Some(hold);
        self
    }
}

pub struct ScriptedServer {
    addr: SocketAddr,
    handle: thread::JoinHandle<io::Result<Vec<u8>>>,
}

impl ScriptedServer {
    /// Bind an ephemeral localhost port and serve `script` on a thread.
    pub fn start(script: Script) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let handle = thread::spawn(move || {
            let (mut conn, _) = listener.accept()?;
            serve(&mut conn, &script)
        });
        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Wait for the connection to finish and return the request bytes.
    pub fn finish(self) -> io::Result<Vec<u8>> {
        self.handle
            .join()
            .map_err(|_| io::Error::other("scripted server panicked"))?
    }
}

fn serve(conn: &mut TcpStream, script: &Script) -> io::Result<Vec<u8>> {
    let request = read_request(conn)?;
    for (i, chunk) in script.chunks.iter().enumerate() {
        if i > 0 && !script.pause.is_zero() {
            thread::sleep(script.pause);
        }
        conn.write_all(chunk)?;
        conn.flush()?;
    }
    if let Some(hold) = script.hold_open {
        thread::sleep(hold);
    }
    Ok(request)
}

/// Read one request: the head up to the blank line, then `Content-Length`
/// body bytes. Stops early if the client closes.
pub fn read_request(conn: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        if let Some(end) = head_end(&request) {
            if request.len() >= end + body_len(&request[..end]) {
                return Ok(request);
            }
        }
        let n = conn.read(&mut buf)?;
        if n == 0 {
            return Ok(request);
        }
        request.extend_from_slice(&buf[..n]);
    }
}

fn head_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn body_len(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}
