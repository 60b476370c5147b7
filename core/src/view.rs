//! Stateless projection of a `SyncState` into something a front end can draw.

use std::fmt;

use crate::sync::SyncState;
use crate::types::TodoId;

/// Options offered by the category selector, default first.
pub const CATEGORY_CHOICES: &[&str] = &["General", "Work", "Personal", "Shopping", "Health"];

pub const LOADING_TEXT: &str = "Loading todos...";
pub const EMPTY_TEXT: &str = "No todos yet. Add one above!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: TodoId,
    pub text: String,
    /// Hidden when the record has no category.
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Empty,
    Rows(Vec<TodoRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub error: Option<String>,
    pub list: ListView,
}

pub fn project(state: &SyncState) -> View {
    let list = if state.is_loading() {
        ListView::Loading
    } else if state.items().is_empty() {
        ListView::Empty
    } else {
        ListView::Rows(
            state
                .items()
                .iter()
                .map(|todo| TodoRow {
                    id: todo.id.clone(),
                    text: todo.text.clone(),
                    badge: todo.category.clone(),
                })
                .collect(),
        )
    };
    View {
        error: state.error_message(),
        list,
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            writeln!(f, "error: {error}")?;
        }
        match &self.list {
            ListView::Loading => writeln!(f, "{LOADING_TEXT}"),
            ListView::Empty => writeln!(f, "{EMPTY_TEXT}"),
            ListView::Rows(rows) => {
                for row in rows {
                    write!(f, "#{} {}", row.id, row.text)?;
                    if let Some(badge) = &row.badge {
                        write!(f, " [{badge}]")?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}
