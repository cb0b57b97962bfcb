//! Data models for the IT Manager dashboard

pub mod enums;
pub mod equipment;
pub mod user;

// Re-export commonly used types
pub use enums::{EquipmentStatus, Role};
pub use equipment::{Equipment, EquipmentDraft, EquipmentType};
pub use user::{Capability, Session, User};
