use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::auth::Identity;
use crate::database::{DatabaseError, Store};
use crate::filter::Filter;
use crate::warehouse::error::WarehouseError;
use crate::warehouse::models::PermissionRole;

/// A user's role at a single location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ANY_ROLE: &[Role] = &[Role::Admin, Role::Editor, Role::Viewer];
const WRITERS: &[Role] = &[Role::Admin, Role::Editor];
const ADMINS: &[Role] = &[Role::Admin];

/// Operations that require a role at the owning location.
/// Creating a location is absent on purpose: anyone may do it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewLocation,
    ExportLocation,
    CreateStorage,
    ViewStorage,
    CreateContainer,
    ViewContainer,
    CreateItem,
    ViewItem,
    ViewItemPicture,
    SetItemPicture,
}

impl Action {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Action::ViewLocation
            | Action::ExportLocation
            | Action::ViewStorage
            | Action::ViewContainer
            | Action::ViewItem
            | Action::ViewItemPicture => ANY_ROLE,
            Action::CreateStorage => ADMINS,
            Action::CreateContainer | Action::CreateItem | Action::SetItemPicture => WRITERS,
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Action::ViewLocation => "view this location",
            Action::ExportLocation => "export this location",
            Action::CreateStorage => "create storage in this location",
            Action::ViewStorage => "view this storage",
            Action::CreateContainer => "create container in this storage",
            Action::ViewContainer => "view this container",
            Action::CreateItem => "create an item in this container",
            Action::ViewItem => "view this item",
            Action::ViewItemPicture => "view the picture of this item",
            Action::SetItemPicture => "set the picture of this item",
        }
    }
}

/// Looks up roles in the `roles` relation
pub struct PermissionResolver<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> PermissionResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The caller's role at a location, if any. A stored role outside the
    /// known set counts as no role.
    pub async fn role_of(&self, user_id: &str, location_code: &str) -> Result<Option<Role>, DatabaseError> {
        let row: Option<PermissionRole> = self
            .store
            .find_one(
                Filter::new()
                    .eq("user_id", user_id)
                    .eq("location_code", location_code),
            )
            .await?;

        Ok(row.and_then(|r| match r.role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!("Ignoring role row {} for '{}' at '{}': {}", r.id, user_id, location_code, e);
                None
            }
        }))
    }

    /// Resolve the caller's role and require it to be in the action's allowed set.
    /// "No role" and "wrong role" fail identically.
    pub async fn authorize(
        &self,
        identity: &Identity,
        location_code: &str,
        action: Action,
    ) -> Result<Role, WarehouseError> {
        match self.role_of(&identity.user_id, location_code).await? {
            Some(role) if action.permits(role) => {
                debug!("Authorized {} ({}) to {} at '{}'", identity.username, role, action.describe(), location_code);
                Ok(role)
            }
            _ => {
                warn!(
                    "Denied {} ({}) permission to {} at '{}'",
                    identity.username,
                    identity.user_id,
                    action.describe(),
                    location_code
                );
                Err(WarehouseError::Forbidden(action))
            }
        }
    }

    pub async fn grant(&self, user_id: &str, location_code: &str, role: Role) -> Result<PermissionRole, DatabaseError> {
        self.store
            .insert(PermissionRole::new(user_id, location_code, role.as_str()))
            .await
    }
}
