//! C-ABI wrapper around the `todo-core` sync session.
//!
//! # Overview
//! Lets any language with a C FFI keep a todo view in sync with the store
//! while doing the HTTP itself. The host starts an operation, executes the
//! returned request, and reports the response back under the call's ticket.
//! A successful create or delete answers with the refresh call that
//! reconciles the view; the host keeps going until no call is returned.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Several calls may be outstanding at once; each is identified by its
//!   ticket and the last refresh to complete decides the items.
//! - The C caller owns all returned pointers and must call the matching
//!   `todo_free_*` function to release them.
//! - Every ticket must be settled with `todo_session_complete`,
//!   `todo_session_fail` or `todo_session_abandon`. An unsettled refresh
//!   keeps the session loading.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use todo_core::{ApiError, HttpResponse, SyncCore, TodoClient, TodoId};

use types::*;

/// Borrow a C string as UTF-8. Null or invalid input yields `None`.
fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Create a session bound to `base_url`. The session starts loading with no
/// items; issue the initial refresh with `todo_session_begin_refresh`.
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `todo_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_new(base_url: *const c_char) -> *mut FfiTodoSession {
    catch_unwind(|| {
        let Some(url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        let core = SyncCore::new(TodoClient::new(url));
        Box::into_raw(Box::new(FfiTodoSession::new(core)))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a session created by `todo_session_new`. Safe to call with null.
/// Outstanding tickets of the session become invalid.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_free(session: *mut FfiTodoSession) {
    if !session.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(session) });
        });
    }
}

// ---------------------------------------------------------------------------
// Starting operations
// ---------------------------------------------------------------------------

/// Start a refresh. Returns null if `session` is null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_begin_refresh(session: *mut FfiTodoSession) -> *mut FfiPendingCall {
    catch_unwind(|| {
        if session.is_null() {
            return std::ptr::null_mut();
        }
        let session = unsafe { &mut *session };
        let out = session.core.begin_refresh();
        session.issue(out)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Start a create. `category` may be null.
///
/// Returns null, without touching the session, when `text` is blank after
/// trimming, and also if `session` or `text` is null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_begin_create(
    session: *mut FfiTodoSession,
    text: *const c_char,
    category: *const c_char,
) -> *mut FfiPendingCall {
    catch_unwind(|| {
        if session.is_null() {
            return std::ptr::null_mut();
        }
        let Some(text) = read_str(text) else {
            return std::ptr::null_mut();
        };
        let session = unsafe { &mut *session };
        match session.core.begin_create(text, read_str(category)) {
            Some(out) => session.issue(out),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Start a delete of the todo whose id renders as `id`.
///
/// Returns null if `session` or `id` is null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_begin_delete(
    session: *mut FfiTodoSession,
    id: *const c_char,
) -> *mut FfiPendingCall {
    catch_unwind(|| {
        if session.is_null() {
            return std::ptr::null_mut();
        }
        let Some(id) = read_str(id) else {
            return std::ptr::null_mut();
        };
        let id: TodoId = match id.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        };
        let session = unsafe { &mut *session };
        let out = session.core.begin_delete(id);
        session.issue(out)
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Completing operations
// ---------------------------------------------------------------------------

fn settle(
    session: *mut FfiTodoSession,
    ticket: u64,
    outcome: Result<HttpResponse, ApiError>,
) -> *mut FfiPendingCall {
    if session.is_null() {
        return std::ptr::null_mut();
    }
    let session = unsafe { &mut *session };
    let Some(pending) = session.pending.remove(&ticket) else {
        return std::ptr::null_mut();
    };
    match session.core.complete(pending, outcome) {
        Some(next) => session.issue(next),
        None => std::ptr::null_mut(),
    }
}

/// Report the response received for `ticket`. A null `body` counts as empty.
///
/// Returns the follow-up call to execute (the reconciling refresh after a
/// successful create or delete), or null when the operation is settled.
/// Unknown tickets and null arguments are ignored and return null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_complete(
    session: *mut FfiTodoSession,
    ticket: u64,
    response: *const FfiHttpResponse,
) -> *mut FfiPendingCall {
    catch_unwind(|| {
        if response.is_null() {
            return std::ptr::null_mut();
        }
        let resp = unsafe { &*response };
        let body = if resp.body.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
        };
        settle(session, ticket, Ok(HttpResponse::new(resp.status, body)))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Report that the request for `ticket` never produced a response (refused
/// connection, timeout). `message` may be null. Always returns null: a
/// failed call has no follow-up.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_fail(
    session: *mut FfiTodoSession,
    ticket: u64,
    message: *const c_char,
) -> *mut FfiPendingCall {
    catch_unwind(|| {
        let message = read_str(message).unwrap_or("transport failure").to_string();
        settle(session, ticket, Err(ApiError::Network(message)))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Drop the call for `ticket` without executing it. The call settles as a
/// network failure, so a dropped refresh no longer counts as loading.
/// Always returns null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_abandon(session: *mut FfiTodoSession, ticket: u64) -> *mut FfiPendingCall {
    catch_unwind(|| settle(session, ticket, Err(ApiError::Network("call abandoned".to_string()))))
        .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Reading state
// ---------------------------------------------------------------------------

/// Copy the current state. Returns null if `session` is null.
/// The caller must free the returned pointer with `todo_free_snapshot`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_session_snapshot(session: *const FfiTodoSession) -> *mut FfiSnapshot {
    catch_unwind(|| {
        if session.is_null() {
            return std::ptr::null_mut();
        }
        let session = unsafe { &*session };
        FfiSnapshot::from_state(session.core.state())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiPendingCall` returned by any `todo_session_*` function.
/// Safe to call with null. Does not settle the call's ticket; use
/// `todo_session_abandon` for a call that will never be executed.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_call(call: *mut FfiPendingCall) {
    if call.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let call = unsafe { Box::from_raw(call) };
        let req = &call.request;
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiSnapshot` returned by `todo_session_snapshot`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_snapshot(snapshot: *mut FfiSnapshot) {
    if snapshot.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let snapshot = unsafe { Box::from_raw(snapshot) };
        free_c_string(snapshot.error_message);
        if !snapshot.items.is_null() && snapshot.len > 0 {
            let items = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    snapshot.items,
                    snapshot.len as usize,
                ))
            };
            for item in items.iter() {
                free_c_string(item.id);
                free_c_string(item.text);
                free_c_string(item.category);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
