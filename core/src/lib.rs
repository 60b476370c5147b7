//! Client core for a remote todo store.
//!
//! # Overview
//! Keeps an in-memory list of todos consistent with the authoritative store.
//! The store client builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network, and the sync core decides how each
//! outcome changes the local view. Hosts own the I/O, either step by step
//! through `SyncCore` or with a blocking `Transport` through `Session`.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - `SyncCore` is the single owner of `SyncState`. After a mutation it
//!   always re-reads the full list instead of patching local state.
//! - Failures are kept as structured `SyncError` values and rendered to a
//!   string only by the view projection.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod sync;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use error::{ApiError, SyncError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{Session, Transport};
pub use sync::{Intent, Outbound, Pending, SyncCore, SyncState};
pub use types::{NewTodo, Todo, TodoId, DEFAULT_CATEGORY};
pub use view::{project, ListView, TodoRow, View};
