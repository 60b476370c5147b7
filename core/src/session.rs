//! Blocking driver that runs a `SyncCore` against a `Transport`.
//!
//! # Design
//! `Session` executes one call at a time and follows each successful
//! mutation with its reconciling refresh before returning, so every method
//! hands back a settled state. Operations are serialized by `&mut self`.

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::sync::{Intent, Outbound, SyncCore, SyncState};
use crate::types::TodoId;

/// Executes a single HTTP exchange. Implementations apply their own timeout
/// and report failures without a status as `ApiError::Network`.
pub trait Transport {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// One view session: a core plus the transport that feeds it.
pub struct Session<T> {
    core: SyncCore,
    transport: T,
}

impl<T: Transport> Session<T> {
    /// Create the core and run its initial refresh.
    pub fn open(client: TodoClient, transport: T) -> Self {
        let mut session = Self {
            core: SyncCore::new(client),
            transport,
        };
        session.refresh();
        session
    }

    pub fn state(&self) -> &SyncState {
        self.core.state()
    }

    pub fn refresh(&mut self) -> &SyncState {
        let out = self.core.begin_refresh();
        self.drive(Some(out))
    }

    pub fn create(&mut self, text: &str, category: Option<&str>) -> &SyncState {
        let out = self.core.begin_create(text, category);
        self.drive(out)
    }

    pub fn delete(&mut self, id: TodoId) -> &SyncState {
        let out = self.core.begin_delete(id);
        self.drive(Some(out))
    }

    pub fn dispatch(&mut self, intent: Intent) -> &SyncState {
        let out = self.core.dispatch(intent);
        self.drive(out)
    }

    pub fn into_parts(self) -> (SyncCore, T) {
        (self.core, self.transport)
    }

    fn drive(&mut self, mut next: Option<Outbound>) -> &SyncState {
        while let Some(Outbound { pending, request }) = next {
            let outcome = self.transport.execute(&request);
            next = self.core.complete(pending, outcome);
        }
        self.core.state()
    }
}
