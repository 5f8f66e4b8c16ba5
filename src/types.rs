/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Kinds of records kept by the warehouse store
/// Used by error reporting, filters and the hierarchy navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Location,
    Storage,
    Container,
    Item,
    Role,
    Image, // Item picture in the image store, not a table row
}

impl EntityKind {
    /// Capitalized label used in client-facing messages ("Storage not found")
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Location => "Location",
            EntityKind::Storage => "Storage",
            EntityKind::Container => "Container",
            EntityKind::Item => "Item",
            EntityKind::Role => "Role",
            EntityKind::Image => "Picture",
        }
    }

    /// Lowercase noun used mid-sentence ("Invalid storage code")
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::Location => "location",
            EntityKind::Storage => "storage",
            EntityKind::Container => "container",
            EntityKind::Item => "item",
            EntityKind::Role => "role",
            EntityKind::Image => "picture",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
