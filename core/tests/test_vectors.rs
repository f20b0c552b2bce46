//! Replay the response vectors in `test-vectors/responses.json`.
//!
//! Each case is a raw response as it would arrive on the wire, plus either
//! the expected parse (status, headers, body and rendered JSON text) or the
//! name of the expected `ParseError` variant. Every case is fed whole, one
//! byte at a time, and split at every offset, then once more through
//! `transport::receive_response` in small reads; all runs must agree.

use std::io;

use httpc_core::{json, transport, ClientConfig, FramingPolicy, HttpError, HttpResponse, ParseError};
use httpc_core::{parse_response, Progress, ResponseParser};
use serde::Deserialize;

#[derive(Deserialize)]
struct Vectors {
    cases: Vec<Case>,
}

#[derive(Deserialize)]
struct Case {
    name: String,
    policy: FramingPolicy,
    raw: String,
    expected: Option<Expected>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct Expected {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
    json: String,
}

fn load() -> Vec<Case> {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Vectors = serde_json::from_str(raw).unwrap();
    vectors.cases
}

fn error_name(err: &ParseError) -> &'static str {
    match err {
        ParseError::MalformedStatusLine(_) => "MalformedStatusLine",
        ParseError::MalformedHeader(_) => "MalformedHeader",
        ParseError::InvalidContentLength(_) => "InvalidContentLength",
        ParseError::MissingStatusLine => "MissingStatusLine",
        ParseError::DuplicateStatusLine(_) => "DuplicateStatusLine",
        ParseError::UnexpectedEof => "UnexpectedEof",
        ParseError::FramingMismatch { .. } => "FramingMismatch",
        ParseError::AlreadyComplete => "AlreadyComplete",
        ParseError::Buffer(_) => "Buffer",
    }
}

/// Feed `chunks` in order, advancing after each; close after the last.
fn feed_chunks(chunks: &[&[u8]], policy: FramingPolicy) -> Result<HttpResponse, ParseError> {
    let mut parser = ResponseParser::new(policy);
    for chunk in chunks {
        parser.feed(chunk)?;
        if let Progress::Complete(response) = parser.advance()? {
            return Ok(response);
        }
    }
    parser.close();
    match parser.advance()? {
        Progress::Complete(response) => Ok(response),
        Progress::NeedMore => Err(ParseError::UnexpectedEof),
    }
}

fn check(case: &Case, how: &str, result: Result<HttpResponse, ParseError>) {
    let name = &case.name;
    match (&case.expected, &case.error, result) {
        (Some(expected), None, Ok(response)) => {
            assert_eq!(response.status, expected.status, "{name} ({how}): status");
            assert_eq!(response.headers, expected.headers, "{name} ({how}): headers");
            assert_eq!(response.body, expected.body.as_bytes(), "{name} ({how}): body");
            assert_eq!(json::render(&response).unwrap(), expected.json, "{name} ({how}): json");
        }
        (None, Some(error), Err(err)) => {
            assert_eq!(error_name(&err), error, "{name} ({how}): error {err}");
        }
        (_, _, result) => panic!("{name} ({how}): unexpected outcome {result:?}"),
    }
}

#[test]
fn whole_input() {
    for case in load() {
        check(&case, "whole", parse_response(case.raw.as_bytes(), case.policy));
    }
}

#[test]
fn byte_at_a_time() {
    for case in load() {
        let chunks: Vec<&[u8]> = case.raw.as_bytes().chunks(1).collect();
        check(&case, "bytewise", feed_chunks(&chunks, case.policy));
    }
}

#[test]
fn every_two_way_split() {
    for case in load() {
        let raw = case.raw.as_bytes();
        for at in 0..=raw.len() {
            let (head, tail) = raw.split_at(at);
            check(&case, &format!("split at {at}"), feed_chunks(&[head, tail], case.policy));
        }
    }
}

#[test]
fn through_transport_in_small_reads() {
    for case in load() {
        let config = ClientConfig {
            recv_chunk_size: 3,
            ..ClientConfig::default()
        }
        .with_framing(case.policy);
        let mut reader = io::Cursor::new(case.raw.clone().into_bytes());
        let result = match transport::receive_response(&mut reader, &config) {
            Ok(response) => Ok(response),
            Err(HttpError::Parse(err)) => Err(err),
            Err(other) => panic!("{}: non-parse error {other:?}", case.name),
        };
        check(&case, "transport", result);
    }
}

#[test]
fn vectors_cover_both_policies() {
    let cases = load();
    assert!(cases.iter().any(|c| c.policy == FramingPolicy::Strict));
    assert!(cases.iter().any(|c| c.policy == FramingPolicy::Lenient));
    assert!(cases.iter().all(|c| c.expected.is_some() != c.error.is_some()));
}
