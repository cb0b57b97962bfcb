//! User and session value types

use serde::{Deserialize, Serialize};

use super::enums::Role;

/// Snapshot of the signed-in user, taken at login or restore time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub role: Role,
    pub email: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Actions gated by the client-side role check.
///
/// This only decides what the UI offers; the API enforces its own rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewEquipment,
    EditEquipment,
    DeleteEquipment,
    ManageUsers,
}

impl Capability {
    /// Whether only administrators hold this capability
    pub fn admin_only(&self) -> bool {
        !matches!(self, Capability::ViewEquipment)
    }
}

/// Authenticated user plus the opaque bearer token issued with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Capability predicate, evaluated once before any dispatch
    pub fn can(&self, capability: Capability) -> bool {
        !capability.admin_only() || self.is_admin()
    }
}

/// Capability check over an optional session; no session grants nothing
pub fn can(session: Option<&Session>, capability: Capability) -> bool {
    session.map(|s| s.can(capability)).unwrap_or(false)
}
