//! Error types for the todo store client and the sync core.
//!
//! # Design
//! `ApiError` keeps the structured detail of a failed exchange. `SyncError`
//! records which flow failed and is only turned into a user-facing string by
//! `Display`, at the view boundary.

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods and by transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The store answered with a non-2xx status and no structured message.
    #[error("HTTP {status}")]
    Transport { status: u16 },

    /// The exchange failed before any status was received.
    #[error("network failure: {0}")]
    Network(String),

    /// The store rejected the payload and said why.
    #[error("{message}")]
    Validation { message: String },

    /// A success body could not be decoded into the expected shape.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Status code reported by the store, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport { status } => Some(*status),
            _ => None,
        }
    }
}

pub const REFRESH_FAILED: &str = "failed to load todos, check that the server is reachable";
pub const CREATE_FAILED: &str = "failed to create todo";
pub const DELETE_FAILED: &str = "failed to delete, try again";

/// The most recent failed operation of a `SyncCore`, with its cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("{}", REFRESH_FAILED)]
    Refresh(#[source] ApiError),

    /// Renders the store's validation message when it sent one.
    #[error("{}", create_message(.0))]
    Create(#[source] ApiError),

    #[error("{}", DELETE_FAILED)]
    Delete(#[source] ApiError),
}

impl SyncError {
    pub fn cause(&self) -> &ApiError {
        match self {
            SyncError::Refresh(e) | SyncError::Create(e) | SyncError::Delete(e) => e,
        }
    }
}

fn create_message(err: &ApiError) -> String {
    match err {
        ApiError::Validation { message } => message.clone(),
        _ => CREATE_FAILED.to_string(),
    }
}
