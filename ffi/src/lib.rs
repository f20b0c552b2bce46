//! C-ABI wrapper around `httpc-core`.
//!
//! # Overview
//! Exposes the blocking HTTP/1.0 client through `extern "C"` functions so any
//! language with a C FFI can issue GET and POST requests and receive the
//! response as JSON text.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiHttpResult` envelope conveys the JSON text or an error
//!   code and message.
//! - The C caller owns all returned pointers and must call the matching
//!   `httpc_*_free` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use httpc_core::{ClientConfig, FramingPolicy, HttpClient};

use types::*;

/// Run `f`, turning a panic into an `FfiErrorCode::Panic` result.
fn guarded(f: impl FnOnce() -> *mut FfiHttpResult) -> *mut FfiHttpResult {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|_| FfiHttpResult::panic("panic inside httpc"))
}

/// Borrow a C string as `&str`. `Err` carries the message for the result.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string that lives
/// for `'a`.
unsafe fn c_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, String> {
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| format!("{name} is not valid UTF-8"))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client with the default configuration: no timeouts, lenient
/// framing.
///
/// Returns null if an internal panic occurs.
/// The caller must free the returned pointer with `httpc_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn httpc_client_new() -> *mut FfiHttpClient {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiHttpClient {
            inner: HttpClient::default(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Set connect and read timeouts in milliseconds. Zero means no timeout.
#[unsafe(no_mangle)]
pub extern "C" fn httpc_client_set_timeouts(
    client: *mut FfiHttpClient,
    connect_ms: u64,
    read_ms: u64,
) -> FfiErrorCode {
    update_config(client, |config| {
        config.connect_timeout_ms = (connect_ms > 0).then_some(connect_ms);
        config.read_timeout_ms = (read_ms > 0).then_some(read_ms);
    })
}

/// Reject bodies that disagree with `Content-Length` when `strict` is true.
#[unsafe(no_mangle)]
pub extern "C" fn httpc_client_set_strict_framing(
    client: *mut FfiHttpClient,
    strict: bool,
) -> FfiErrorCode {
    update_config(client, |config| {
        config.framing = if strict {
            FramingPolicy::Strict
        } else {
            FramingPolicy::Lenient
        };
    })
}

fn update_config(client: *mut FfiHttpClient, edit: impl FnOnce(&mut ClientConfig)) -> FfiErrorCode {
    if client.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &mut *client };
        let mut config = client.inner.config().clone();
        edit(&mut config);
        if config.validate().is_err() {
            return FfiErrorCode::InvalidInput;
        }
        client.inner = HttpClient::new(config);
        FfiErrorCode::Ok
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

/// Free a client created by `httpc_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpc_client_free(client: *mut FfiHttpClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `GET url`, sending `header` verbatim after the generated headers.
///
/// `header` may be null, meaning no extra headers; when present every line
/// must end in `"\r\n"`. Never returns null.
/// The caller must free the returned pointer with `httpc_result_free`.
#[unsafe(no_mangle)]
pub extern "C" fn httpc_get(
    client: *const FfiHttpClient,
    url: *const c_char,
    header: *const c_char,
) -> *mut FfiHttpResult {
    guarded(|| {
        if client.is_null() {
            return FfiHttpResult::null_arg("client");
        }
        if url.is_null() {
            return FfiHttpResult::null_arg("url");
        }
        let client = unsafe { &*client };
        let (url, header) = match unsafe { url_and_header(url, header) } {
            Ok(args) => args,
            Err(msg) => return FfiHttpResult::error(FfiErrorCode::InvalidInput, &msg),
        };
        FfiHttpResult::from_core(client.inner.get(url, header))
    })
}

/// `POST url` with `body_len` bytes from `body`.
///
/// `body` may be null only when `body_len` is zero. Never returns null.
/// The caller must free the returned pointer with `httpc_result_free`.
#[unsafe(no_mangle)]
pub extern "C" fn httpc_post(
    client: *const FfiHttpClient,
    url: *const c_char,
    header: *const c_char,
    body: *const u8,
    body_len: usize,
) -> *mut FfiHttpResult {
    guarded(|| {
        if client.is_null() {
            return FfiHttpResult::null_arg("client");
        }
        if url.is_null() {
            return FfiHttpResult::null_arg("url");
        }
        if body.is_null() && body_len > 0 {
            return FfiHttpResult::null_arg("body");
        }
        let client = unsafe { &*client };
        let (url, header) = match unsafe { url_and_header(url, header) } {
            Ok(args) => args,
            Err(msg) => return FfiHttpResult::error(FfiErrorCode::InvalidInput, &msg),
        };
        let body: &[u8] = if body_len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(body, body_len) }
        };
        FfiHttpResult::from_core(client.inner.post(url, header, body))
    })
}

/// # Safety
/// `url` must be non-null; both pointers must be valid C strings if non-null.
unsafe fn url_and_header<'a>(
    url: *const c_char,
    header: *const c_char,
) -> Result<(&'a str, &'a str), String> {
    let url = unsafe { c_str(url, "url") }?;
    let header = if header.is_null() {
        ""
    } else {
        unsafe { c_str(header, "header") }?
    };
    Ok((url, header))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpResult` returned by `httpc_get` or `httpc_post`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpc_result_free(result: *mut FfiHttpResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { std::ffi::CString::from_raw(result.error_message) });
        }
        if !result.json.is_null() {
            drop(unsafe { std::ffi::CString::from_raw(result.json) });
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
