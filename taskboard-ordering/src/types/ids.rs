//! Identifier newtypes for ordered records and their containers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an orderable record (a list, card or checklist item)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh, time-sortable identifier
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Wrap an existing identifier
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a container holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// The lists of one board
    Lists,
    /// The cards of one list
    Cards,
    /// The items of one checklist
    Items,
}

impl ContainerKind {
    /// Prefix used in container identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lists => "lists",
            Self::Cards => "cards",
            Self::Items => "items",
        }
    }
}

/// Scope within which ranks are unique and ordered.
///
/// Opaque to the engine. The helpers build `{kind}:{owner}` identifiers, for
/// example `cards:42` for the cards of list 42.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Wrap an existing identifier
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Container of the given kind owned by `owner`
    pub fn scoped(kind: ContainerKind, owner: impl fmt::Display) -> Self {
        Self(format!("{}:{}", kind.as_str(), owner))
    }

    /// The lists of a board
    pub fn board_lists(board: impl fmt::Display) -> Self {
        Self::scoped(ContainerKind::Lists, board)
    }

    /// The cards of a list
    pub fn list_cards(list: impl fmt::Display) -> Self {
        Self::scoped(ContainerKind::Cards, list)
    }

    /// The items of a checklist
    pub fn checklist_items(checklist: impl fmt::Display) -> Self {
        Self::scoped(ContainerKind::Items, checklist)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContainerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
