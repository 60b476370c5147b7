//! Domain DTOs for the todo store.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Ids are assigned by the store and may be integers or strings, so `TodoId`
//! deserializes untagged and renders both forms the same way in paths.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category label used when a todo is created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Store-assigned identifier of a todo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoId::Number(n) => write!(f, "{n}"),
            TodoId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TodoId {
    fn from(n: i64) -> Self {
        TodoId::Number(n)
    }
}

impl From<&str> for TodoId {
    fn from(s: &str) -> Self {
        TodoId::Text(s.to_string())
    }
}

/// Parses the form `Display` writes: a string is `Number` only when it is
/// the canonical rendering of that integer, so `"007"` and `"+5"` stay `Text`.
impl FromStr for TodoId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => TodoId::Number(n),
            _ => TodoId::Text(s.to_string()),
        })
    }
}

/// A single todo item as held by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl NewTodo {
    /// Normalize raw form input. Returns `None` when `text` is blank after
    /// trimming; a blank category counts as absent.
    pub fn new(text: &str, category: Option<&str>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        #[cfg(feature = "default-category")]
        let category = category.or_else(|| Some(DEFAULT_CATEGORY.to_string()));
        Some(Self {
            text: text.to_string(),
            category,
        })
    }
}

/// Body of a structured error response, e.g. `{"error": "Todo text is required"}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Check that a listing can be held locally: every text is non-empty and no
/// id appears twice. Returns a description of the first violation.
pub(crate) fn check_listing(todos: &[Todo]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(todos.len());
    for todo in todos {
        if todo.text.trim().is_empty() {
            return Err(format!("todo {} has empty text", todo.id));
        }
        if !seen.insert(&todo.id) {
            return Err(format!("duplicate todo id {}", todo.id));
        }
    }
    Ok(())
}
