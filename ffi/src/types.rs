//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, a pointer plus length instead of `Vec`,
//! and enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use movies_core::{
    DisplayState, FetchError, HostConnectivity, HttpRequest, Movie, MovieCatalogService,
    ParseError, SortOrder, UreqConnector,
};

/// Opaque handle to a configured catalog client. C callers receive a pointer
/// to this and pass it back into every FFI function.
pub struct FfiMoviesClient {
    pub(crate) service: MovieCatalogService<UreqConnector, HostConnectivity>,
    pub(crate) api_key: String,
}

/// Sort order values accepted across the boundary.
pub const MOVIES_SORT_MOST_POPULAR: u32 = 0;
pub const MOVIES_SORT_TOP_RATED: u32 = 1;

pub(crate) fn sort_order_from_ffi(value: u32) -> Option<SortOrder> {
    match value {
        MOVIES_SORT_MOST_POPULAR => Some(SortOrder::MostPopular),
        MOVIES_SORT_TOP_RATED => Some(SortOrder::TopRated),
        _ => None,
    }
}

/// Convert to an owned C string. Interior NUL bytes are dropped rather than
/// failing the whole conversion.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}

/// Hand a vector to C as a pointer + length pair (null when empty).
pub(crate) fn into_raw_array<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Take back an array produced by `into_raw_array`.
///
/// # Safety
/// `ptr` and `len` must come from a single `into_raw_array` call and must not
/// have been reclaimed already.
pub(crate) unsafe fn from_raw_array<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A GET request described as C-compatible plain data.
///
/// Built by `movies_build_discover_request`. The C caller executes the
/// request and passes the response back through `movies_parse_catalog`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_array(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            url: c_string(req.url),
            headers,
            headers_len,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing the request, then passes a
/// pointer to `movies_parse_catalog`. The FFI layer reads but does not free
/// these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCatalogResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NoNetwork = 1,
    BadStatus = 2,
    IoFailure = 3,
    EmptyBody = 4,
    MissingResults = 5,
    Panic = 6,
    NullArg = 7,
    InvalidArgument = 8,
}

/// Which screen state the host should render.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDisplayState {
    Movies = 0,
    NoNetwork = 1,
    NoData = 2,
}

impl From<DisplayState> for FfiDisplayState {
    fn from(state: DisplayState) -> Self {
        match state {
            DisplayState::NoNetwork => FfiDisplayState::NoNetwork,
            DisplayState::NoData => FfiDisplayState::NoData,
        }
    }
}

/// A single movie exposed to C.
#[repr(C)]
pub struct FfiMovie {
    pub title: *mut c_char,
    pub overview: *mut c_char,
    pub user_rating: f64,
    pub release_date: *mut c_char,
    pub poster_url: *mut c_char,
}

impl From<Movie> for FfiMovie {
    fn from(movie: Movie) -> Self {
        FfiMovie {
            title: c_string(movie.title),
            overview: c_string(movie.overview),
            user_rating: movie.user_rating,
            release_date: c_string(movie.release_date),
            poster_url: c_string(movie.poster_url),
        }
    }
}

/// Result envelope for parse and fetch operations.
///
/// On success `error_code` is `Ok`, `error_message` is null and `movies`
/// holds `len` entries (null when the page was empty, in which case
/// `display_state` is `NoData`). On failure `error_code` names the kind,
/// `error_message` is a human-readable C string for logs and `movies` is null.
#[repr(C)]
pub struct FfiCatalogResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub display_state: FfiDisplayState,
    pub movies: *mut FfiMovie,
    pub len: u32,
}

impl FfiCatalogResult {
    pub(crate) fn from_core(result: Result<Vec<Movie>, FetchError>) -> *mut Self {
        match result {
            Ok(movies) => Self::ok(movies),
            Err(e) => Self::from_error(e),
        }
    }

    /// Build a success result carrying the catalog.
    pub(crate) fn ok(movies: Vec<Movie>) -> *mut Self {
        let display_state = if movies.is_empty() {
            FfiDisplayState::NoData
        } else {
            FfiDisplayState::Movies
        };
        let items: Vec<FfiMovie> = movies.into_iter().map(FfiMovie::from).collect();
        let (movies, len) = into_raw_array(items);

        Box::into_raw(Box::new(FfiCatalogResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            display_state,
            movies,
            len,
        }))
    }

    /// Build an error result from a `FetchError`.
    pub(crate) fn from_error(err: FetchError) -> *mut Self {
        let (error_code, http_status) = match &err {
            FetchError::NoNetwork => (FfiErrorCode::NoNetwork, 0),
            FetchError::BadStatus(status) => (FfiErrorCode::BadStatus, *status),
            FetchError::IoFailure(_) => (FfiErrorCode::IoFailure, 0),
            FetchError::Parse(ParseError::Empty) => (FfiErrorCode::EmptyBody, 0),
            FetchError::Parse(ParseError::MissingResults) => (FfiErrorCode::MissingResults, 0),
        };
        Self::failure(
            error_code,
            err.to_string(),
            http_status,
            err.display_state().into(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(
            FfiErrorCode::NullArg,
            format!("null argument: {name}"),
            0,
            FfiDisplayState::NoData,
        )
    }

    pub(crate) fn invalid_argument(msg: String) -> *mut Self {
        Self::failure(FfiErrorCode::InvalidArgument, msg, 0, FfiDisplayState::NoData)
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(
            FfiErrorCode::Panic,
            msg.to_string(),
            0,
            FfiDisplayState::NoData,
        )
    }

    fn failure(
        error_code: FfiErrorCode,
        message: String,
        http_status: u16,
        display_state: FfiDisplayState,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCatalogResult {
            error_code,
            error_message: c_string(message),
            http_status,
            display_state,
            movies: std::ptr::null_mut(),
            len: 0,
        }))
    }
}
