//! JSON text rendering of a parsed response.
//!
//! Produces one object with the keys `status`, `header` and `body`:
//!
//! ```text
//! {"status": 200,"header": {"Server": "x","Content-Length": "2"},"body": "\\x4f\\x4b"}
//! ```
//!
//! Header entries keep wire order; a comma precedes every entry except the
//! first. Header names and values are JSON-escaped. The body is written as
//! one `\\xNN` token per byte (lowercase hex), so the decoded string value
//! reads `\x4f\x4b`.

use crate::buffer::ByteBuffer;
use crate::error::BufferError;
use crate::http::HttpResponse;

/// Render `response` as JSON text.
pub fn render(response: &HttpResponse) -> Result<String, BufferError> {
    let mut out = ByteBuffer::new();
    render_into(response, &mut out)?;
    into_string(out)
}

/// Render `response` as indented JSON text.
///
/// Same keys and values as `render`, one entry per line. Header entries stay
/// in wire order and repeated names are kept.
pub fn render_pretty(response: &HttpResponse) -> Result<String, BufferError> {
    let mut out = ByteBuffer::new();
    out.print(format_args!("{{\n  \"status\": {},\n", response.status))?;
    if response.headers.is_empty() {
        out.print(format_args!("  \"header\": {{}},\n"))?;
    } else {
        out.print(format_args!("  \"header\": {{\n"))?;
        let last = response.headers.len() - 1;
        for (i, (name, value)) in response.headers.iter().enumerate() {
            let comma = if i == last { "" } else { "," };
            out.print(format_args!(
                "    {}: {}{comma}\n",
                json_string(name)?,
                json_string(value)?
            ))?;
        }
        out.print(format_args!("  }},\n"))?;
    }
    out.print(format_args!("  \"body\": "))?;
    write_body(&response.body, &mut out)?;
    out.print(format_args!("\n}}"))?;
    into_string(out)
}

/// Append the JSON text for `response` to `out`.
pub fn render_into(response: &HttpResponse, out: &mut ByteBuffer) -> Result<(), BufferError> {
    out.print(format_args!("{{\"status\": {},", response.status))?;
    out.print(format_args!("\"header\": {{"))?;
    for (i, (name, value)) in response.headers.iter().enumerate() {
        let comma = if i == 0 { "" } else { "," };
        out.print(format_args!(
            "{comma}{}: {}",
            json_string(name)?,
            json_string(value)?
        ))?;
    }
    out.print(format_args!("}},"))?;
    out.print(format_args!("\"body\": "))?;
    write_body(&response.body, out)?;
    out.print(format_args!("}}"))
}

/// Quoted body string, one `\\xNN` token per byte.
fn write_body(body: &[u8], out: &mut ByteBuffer) -> Result<(), BufferError> {
    out.reserve(body.len().saturating_mul(5).saturating_add(2))?;
    out.print(format_args!("\""))?;
    for byte in body {
        out.print(format_args!("\\\\x{byte:02x}"))?;
    }
    out.print(format_args!("\""))
}

fn into_string(out: ByteBuffer) -> Result<String, BufferError> {
    String::from_utf8(out.into_vec()).map_err(|_| BufferError::Format)
}

fn json_string(s: &str) -> Result<String, BufferError> {
    serde_json::to_string(s).map_err(|_| BufferError::Format)
}

/// Inverse of the body encoding: turn a decoded `\xNN...` string back into
/// bytes. Returns `None` if the text is not a sequence of such tokens.
pub fn unescape_body(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    if bytes.len() % 4 != 0 {
        return None;
    }
    bytes
        .chunks(4)
        .map(|token| match token {
            [b'\\', b'x', hi, lo] => Some(hex_digit(*hi)? << 4 | hex_digit(*lo)?),
            _ => None,
        })
        .collect()
}

fn hex_digit(b: u8) -> Option<u8> {
    char::from(b).to_digit(16).map(|d| d as u8)
}
