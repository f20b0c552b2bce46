//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The client handle is opaque; callers only hold a pointer to it. Every call
//! that touches the network returns one heap-allocated `FfiHttpResult`
//! envelope carrying either the JSON text or an error code and message.
//! Conversion from core results lives here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use httpc_core::{ErrorKind, HttpError, HttpResult};

/// Opaque handle to an `HttpClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiHttpClient {
    pub(crate) inner: httpc_core::HttpClient,
}

/// Error codes returned in `FfiHttpResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// Bad URL, bad argument encoding or invalid configuration.
    InvalidInput = 1,
    Resolve = 2,
    Connect = 3,
    Send = 4,
    Receive = 5,
    Timeout = 6,
    /// The peer's reply was not a well-formed response.
    Parse = 7,
    Internal = 8,
    Panic = 9,
    NullArg = 10,
}

impl From<&HttpError> for FfiErrorCode {
    fn from(err: &HttpError) -> Self {
        match err {
            HttpError::Connect(_) => FfiErrorCode::Connect,
            HttpError::Send(_) => FfiErrorCode::Send,
            HttpError::Receive(_) => FfiErrorCode::Receive,
            HttpError::Timeout => FfiErrorCode::Timeout,
            other => match other.kind() {
                ErrorKind::Input => FfiErrorCode::InvalidInput,
                ErrorKind::Resolution => FfiErrorCode::Resolve,
                ErrorKind::Protocol => FfiErrorCode::Parse,
                ErrorKind::Transport | ErrorKind::Internal => FfiErrorCode::Internal,
            },
        }
    }
}

/// Result envelope for every request.
///
/// On success `error_code` is `Ok`, `error_message` is null and `json`
/// points to NUL-terminated JSON text of `json_len` bytes.
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string and `json` is null.
#[repr(C)]
pub struct FfiHttpResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub json: *mut c_char,
    pub json_len: usize,
}

impl FfiHttpResult {
    pub(crate) fn from_core(result: HttpResult<String>) -> *mut Self {
        match result {
            Ok(json) => Self::ok(json),
            Err(err) => {
                tracing::debug!(error = %err, "request failed");
                Self::error(FfiErrorCode::from(&err), &err.to_string())
            }
        }
    }

    fn ok(json: String) -> *mut Self {
        let json_len = json.len();
        match CString::new(json) {
            Ok(json) => Box::into_raw(Box::new(FfiHttpResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                json: json.into_raw(),
                json_len,
            })),
            Err(_) => Self::error(FfiErrorCode::Internal, "response text contains NUL"),
        }
    }

    pub(crate) fn error(code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiHttpResult {
            error_code: code,
            error_message: CString::new(msg).unwrap_or_default().into_raw(),
            json: std::ptr::null_mut(),
            json_len: 0,
        }))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg)
    }
}
