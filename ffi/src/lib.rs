//! C-ABI wrapper around `movies-core`.
//!
//! # Overview
//! Exposes the catalog fetch pipeline through `extern "C"` functions so a
//! mobile host can either let Rust run the whole fetch cycle
//! (`movies_fetch_catalog`) or execute the HTTP request on its own stack and
//! hand the response back (`movies_build_discover_request` +
//! `movies_parse_catalog`).
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Connectivity is owned by the host: it reports changes through
//!   `movies_set_connected`, and a disconnected client short-circuits
//!   `movies_fetch_catalog` with `NoNetwork`.
//! - `movies_fetch_catalog` blocks; call it off the UI thread.
//! - The C caller owns all returned pointers and must call the matching
//!   `movies_free_*` function to release them.

pub mod types;

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use movies_core::{
    HostConnectivity, HttpFetcher, HttpResponse, MovieCatalogService, UrlBuilder,
};
use tracing::warn;

use types::*;

/// Read a borrowed C string; invalid UTF-8 sequences become U+FFFD.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string.
unsafe fn borrowed_str<'a>(ptr: *const c_char) -> Cow<'a, str> {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `api_key`.
///
/// `api_root` may be null to use the public API; otherwise it replaces the
/// root (e.g. `http://10.0.2.2:3000/3`). Returns null if `api_key` is null or
/// empty, if `api_root` is not a valid URL, or if an internal panic occurs.
/// The client starts out connected. Free it with `movies_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn movies_client_new(
    api_key: *const c_char,
    api_root: *const c_char,
) -> *mut FfiMoviesClient {
    catch_unwind(AssertUnwindSafe(|| {
        if api_key.is_null() {
            return std::ptr::null_mut();
        }
        let key = unsafe { borrowed_str(api_key) }.trim().to_string();
        if key.is_empty() {
            return std::ptr::null_mut();
        }
        let urls = if api_root.is_null() {
            UrlBuilder::default()
        } else {
            match UrlBuilder::from_api_root(&unsafe { borrowed_str(api_root) }) {
                Ok(urls) => urls,
                Err(e) => {
                    warn!(error = %e, "rejecting invalid api root");
                    return std::ptr::null_mut();
                }
            }
        };
        let service =
            MovieCatalogService::with_parts(urls, HttpFetcher::new(), HostConnectivity::new(true));
        Box::into_raw(Box::new(FfiMoviesClient {
            service,
            api_key: key,
        }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `movies_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn movies_client_free(client: *mut FfiMoviesClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

/// Record the host's current network state. Ignored when `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn movies_set_connected(client: *const FfiMoviesClient, connected: bool) {
    if client.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &*client };
        client.service.connectivity().set(connected);
    }));
}

// ---------------------------------------------------------------------------
// Host-does-IO path
// ---------------------------------------------------------------------------

/// Build the discover request for `sort_order` (`MOVIES_SORT_*`).
///
/// Returns null if `client` is null or `sort_order` is unknown.
/// The caller must free the returned pointer with `movies_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn movies_build_discover_request(
    client: *const FfiMoviesClient,
    sort_order: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(sort_order) = sort_order_from_ffi(sort_order) else {
            return std::ptr::null_mut();
        };
        let req = client.service.urls().build_request(sort_order, &client.api_key);
        FfiHttpRequest::from_core(req)
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty text.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { borrowed_str(resp.body) }.into_owned()
    };
    HttpResponse {
        status: resp.status,
        body,
    }
}

/// Interpret a response the host fetched itself.
///
/// Applies the same status and payload rules as `movies_fetch_catalog`.
#[unsafe(no_mangle)]
pub extern "C" fn movies_parse_catalog(
    client: *const FfiMoviesClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCatalogResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiCatalogResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCatalogResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        FfiCatalogResult::from_core(client.service.read_response(ffi_response_to_core(resp)))
    }))
    .unwrap_or_else(|_| FfiCatalogResult::panic("panic in movies_parse_catalog"))
}

// ---------------------------------------------------------------------------
// Rust-does-IO path
// ---------------------------------------------------------------------------

/// Run one full fetch cycle: connectivity check, build, GET, parse.
///
/// Blocks for up to the connect plus read timeouts.
#[unsafe(no_mangle)]
pub extern "C" fn movies_fetch_catalog(
    client: *const FfiMoviesClient,
    sort_order: u32,
) -> *mut FfiCatalogResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiCatalogResult::null_arg("client");
        }
        let client = unsafe { &*client };
        let Some(order) = sort_order_from_ffi(sort_order) else {
            return FfiCatalogResult::invalid_argument(format!("unknown sort order: {sort_order}"));
        };
        FfiCatalogResult::from_core(client.service.fetch_catalog(order, &client.api_key))
    }))
    .unwrap_or_else(|_| FfiCatalogResult::panic("panic in movies_fetch_catalog"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `movies_build_discover_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn movies_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        for h in unsafe { from_raw_array(req.headers, req.headers_len) } {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    }));
}

/// Free an `FfiCatalogResult` returned by `movies_parse_catalog` or
/// `movies_fetch_catalog`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn movies_free_result(result: *mut FfiCatalogResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        for movie in unsafe { from_raw_array(result.movies, result.len) } {
            free_c_string(movie.title);
            free_c_string(movie.overview);
            free_c_string(movie.release_date);
            free_c_string(movie.poster_url);
        }
    }));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn movies_free_string(s: *mut c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| free_c_string(s)));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
