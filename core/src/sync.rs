//! Client-side synchronization state machine.
//!
//! # Design
//! `SyncCore` owns the only mutable copy of the local view (`SyncState`) and
//! never performs I/O. Every operation returns an `Outbound`: the request to
//! execute plus a `Pending` tag that the host hands back to `complete` along
//! with the outcome. A completed mutation answers with the follow-up refresh
//! to execute, so local state is only ever replaced by a full listing from
//! the store and never patched.
//!
//! Several calls may be outstanding at once. Each completion applies its own
//! outcome and the last refresh to complete decides `items`.

use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::{ApiError, SyncError};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{NewTodo, Todo, TodoId};

/// The local view of the store as last confirmed by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    items: Vec<Todo>,
    is_loading: bool,
    last_error: Option<SyncError>,
}

impl SyncState {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            is_loading: true,
            last_error: None,
        }
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    /// The user-facing rendering of `last_error`.
    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(ToString::to_string)
    }

    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.items.iter().find(|t| &t.id == id)
    }
}

/// A user intent entering the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Refresh,
    SubmitCreate {
        text: String,
        category: Option<String>,
    },
    RequestDelete {
        id: TodoId,
    },
}

impl Intent {
    /// Form submission guard: blank text yields no intent at all.
    pub fn submit(text: &str, category: Option<&str>) -> Option<Self> {
        NewTodo::new(text, category).map(|input| Intent::SubmitCreate {
            text: input.text,
            category: input.category,
        })
    }

    pub fn delete(id: impl Into<TodoId>) -> Self {
        Intent::RequestDelete { id: id.into() }
    }
}

/// Which call an outstanding request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Refresh,
    Create,
    Delete { id: TodoId },
}

/// A call the host must execute and report back through `SyncCore::complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub pending: Pending,
    pub request: HttpRequest,
}

/// Owner of the local todo view for one session.
#[derive(Debug, Clone)]
pub struct SyncCore {
    client: TodoClient,
    state: SyncState,
    refreshes_in_flight: usize,
}

impl SyncCore {
    /// A fresh core is loading with no items. The caller issues the initial
    /// refresh with `begin_refresh`.
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            state: SyncState::new(),
            refreshes_in_flight: 0,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    /// Route an intent to its operation. `None` means nothing was sent.
    pub fn dispatch(&mut self, intent: Intent) -> Option<Outbound> {
        match intent {
            Intent::Refresh => Some(self.begin_refresh()),
            Intent::SubmitCreate { text, category } => self.begin_create(&text, category.as_deref()),
            Intent::RequestDelete { id } => Some(self.begin_delete(id)),
        }
    }

    pub fn begin_refresh(&mut self) -> Outbound {
        self.refreshes_in_flight += 1;
        self.state.is_loading = true;
        debug!(in_flight = self.refreshes_in_flight, "refreshing todos");
        Outbound {
            pending: Pending::Refresh,
            request: self.client.build_list_todos(),
        }
    }

    /// Blank text after trimming issues no request and leaves state untouched.
    pub fn begin_create(&mut self, text: &str, category: Option<&str>) -> Option<Outbound> {
        let Some(input) = NewTodo::new(text, category) else {
            debug!("ignoring create with blank text");
            return None;
        };
        match self.client.build_create_todo(&input) {
            Ok(request) => {
                debug!(text = %input.text, category = ?input.category, "creating todo");
                Some(Outbound {
                    pending: Pending::Create,
                    request,
                })
            }
            Err(err) => {
                self.fail(SyncError::Create(err));
                None
            }
        }
    }

    pub fn begin_delete(&mut self, id: TodoId) -> Outbound {
        debug!(%id, "deleting todo");
        Outbound {
            request: self.client.build_delete_todo(&id),
            pending: Pending::Delete { id },
        }
    }

    /// Apply the outcome of an outstanding call. A successful mutation
    /// returns the refresh that reconciles local state with the store.
    pub fn complete(
        &mut self,
        pending: Pending,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Option<Outbound> {
        match pending {
            Pending::Refresh => {
                self.refreshes_in_flight = self.refreshes_in_flight.saturating_sub(1);
                self.state.is_loading = self.refreshes_in_flight > 0;
                match outcome.and_then(|r| self.client.parse_list_todos(r)) {
                    Ok(items) => {
                        debug!(count = items.len(), "todos loaded");
                        self.state.items = items;
                        self.state.last_error = None;
                    }
                    Err(err) => self.fail(SyncError::Refresh(err)),
                }
                None
            }
            Pending::Create => match outcome.and_then(|r| self.client.parse_create_todo(r)) {
                Ok(todo) => {
                    debug!(id = %todo.id, "todo created");
                    self.state.last_error = None;
                    Some(self.begin_refresh())
                }
                Err(err) => {
                    self.fail(SyncError::Create(err));
                    None
                }
            },
            Pending::Delete { id } => match outcome.and_then(|r| self.client.parse_delete_todo(r)) {
                Ok(()) => {
                    debug!(%id, "todo deleted");
                    self.state.last_error = None;
                    Some(self.begin_refresh())
                }
                Err(err) => {
                    self.fail(SyncError::Delete(err));
                    None
                }
            },
        }
    }

    fn fail(&mut self, err: SyncError) {
        warn!(error = %err, cause = %err.cause(), "todo sync operation failed");
        self.state.last_error = Some(err);
    }
}
