//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::c_char;

use todo_core::{ApiError, HttpMethod, Pending, SyncCore, SyncError, SyncState, Todo};

/// Opaque handle to one sync session. C callers receive a pointer to this
/// and pass it back into every `todo_session_*` function.
pub struct FfiTodoSession {
    pub(crate) core: SyncCore,
    pub(crate) next_ticket: u64,
    pub(crate) pending: HashMap<u64, Pending>,
}

impl FfiTodoSession {
    pub(crate) fn new(core: SyncCore) -> Self {
        Self {
            core,
            next_ticket: 1,
            pending: HashMap::new(),
        }
    }

    /// Park an outstanding call under a fresh ticket and hand it to C.
    pub(crate) fn issue(&mut self, out: todo_core::Outbound) -> *mut FfiPendingCall {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.insert(ticket, out.pending);
        let call = Box::new(FfiPendingCall {
            ticket,
            request: FfiHttpRequest::from_core(out.request),
        });
        Box::into_raw(call)
    }
}

/// Copy `s` into a C string owned by the caller. Interior NULs are dropped.
pub(crate) fn c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', "")).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request the C host must execute.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    /// Null when the request has no body.
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: todo_core::HttpRequest) -> Self {
        let body = match req.body {
            Some(b) => c_string(&b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        FfiHttpRequest {
            method: req.method.into(),
            path: c_string(&req.path),
            headers,
            headers_len,
            body,
        }
    }
}

/// An outstanding call: execute `request`, then report the outcome with
/// `todo_session_complete` or `todo_session_fail` under `ticket`.
#[repr(C)]
pub struct FfiPendingCall {
    pub ticket: u64,
    pub request: FfiHttpRequest,
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing a request and passes a
/// pointer to `todo_session_complete`. The FFI layer reads but does not free
/// these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Kind of the last error, or `Ok` when there is none.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Transport = 1,
    Network = 2,
    Validation = 3,
    Decoding = 4,
    Serialization = 5,
}

/// Which flow produced the last error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOperation {
    None = 0,
    Refresh = 1,
    Create = 2,
    Delete = 3,
}

/// A single todo item exposed to C.
#[repr(C)]
pub struct FfiTodo {
    pub id: *mut c_char,
    pub text: *mut c_char,
    /// Null when the todo has no category.
    pub category: *mut c_char,
}

impl FfiTodo {
    fn from_core(todo: &Todo) -> Self {
        FfiTodo {
            id: c_string(&todo.id.to_string()),
            text: c_string(&todo.text),
            category: todo
                .category
                .as_deref()
                .map_or(std::ptr::null_mut(), c_string),
        }
    }
}

/// Copy of the session state at one point in time.
///
/// `error_message` is the user-facing text and is null when `error_code` is
/// `Ok`. `http_status` is non-zero only for `Transport` errors.
#[repr(C)]
pub struct FfiSnapshot {
    pub items: *mut FfiTodo,
    pub len: u32,
    pub is_loading: bool,
    pub failed_operation: FfiOperation,
    pub error_code: FfiErrorCode,
    pub http_status: u16,
    pub error_message: *mut c_char,
}

impl FfiSnapshot {
    pub(crate) fn from_state(state: &SyncState) -> *mut Self {
        let len = state.items().len() as u32;
        let items = if state.items().is_empty() {
            std::ptr::null_mut()
        } else {
            let todos: Box<[FfiTodo]> = state.items().iter().map(FfiTodo::from_core).collect();
            Box::into_raw(todos) as *mut FfiTodo
        };

        let (failed_operation, error_code, http_status, error_message) = match state.last_error() {
            None => (FfiOperation::None, FfiErrorCode::Ok, 0, std::ptr::null_mut()),
            Some(err) => {
                let operation = match err {
                    SyncError::Refresh(_) => FfiOperation::Refresh,
                    SyncError::Create(_) => FfiOperation::Create,
                    SyncError::Delete(_) => FfiOperation::Delete,
                };
                let code = match err.cause() {
                    ApiError::Transport { .. } => FfiErrorCode::Transport,
                    ApiError::Network(_) => FfiErrorCode::Network,
                    ApiError::Validation { .. } => FfiErrorCode::Validation,
                    ApiError::Decoding(_) => FfiErrorCode::Decoding,
                    ApiError::Serialization(_) => FfiErrorCode::Serialization,
                };
                let status = err.cause().status().unwrap_or(0);
                (operation, code, status, c_string(&err.to_string()))
            }
        };

        Box::into_raw(Box::new(FfiSnapshot {
            items,
            len,
            is_loading: state.is_loading(),
            failed_operation,
            error_code,
            http_status,
            error_message,
        }))
    }
}
