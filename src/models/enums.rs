//! Shared domain enums

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// User role as reported by the API at login time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    /// Any role the client does not recognize is treated as standard
    #[serde(other)]
    Standard,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Standard => "Standard",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EquipmentStatus {
    #[default]
    Available,
    Assigned,
    InMaintenance,
    Decommissioned,
}

impl EquipmentStatus {
    pub const ALL: [EquipmentStatus; 4] = [
        EquipmentStatus::Available,
        EquipmentStatus::Assigned,
        EquipmentStatus::InMaintenance,
        EquipmentStatus::Decommissioned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "Available",
            EquipmentStatus::Assigned => "Assigned",
            EquipmentStatus::InMaintenance => "InMaintenance",
            EquipmentStatus::Decommissioned => "Decommissioned",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "Available",
            EquipmentStatus::Assigned => "Assigned",
            EquipmentStatus::InMaintenance => "In maintenance",
            EquipmentStatus::Decommissioned => "Decommissioned",
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EquipmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid equipment status: {}", s))
    }
}
