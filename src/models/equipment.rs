//! Equipment model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::enums::EquipmentStatus;

/// Equipment record as served by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i64,
    /// Type name, one of the catalog entries
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub brand: String,
    #[serde(default)]
    pub model: String,
    pub serial_number: String,
    pub inventory_code: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: EquipmentStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Equipment type catalog entry (reference data for the type selector)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentType {
    pub id: i64,
    pub name: String,
}

/// Create / update form state. Sent as-is as the request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDraft {
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub equipment_type: String,
    #[validate(length(min = 1))]
    pub brand: String,
    pub model: String,
    #[validate(length(min = 1))]
    pub serial_number: String,
    #[validate(length(min = 1))]
    pub inventory_code: String,
    pub ip_address: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: EquipmentStatus,
    pub assigned_to: Option<String>,
}

/// Required draft fields with the label used in validation messages
const REQUIRED_FIELDS: [(&str, &str); 4] = [
    ("equipment_type", "type"),
    ("brand", "brand"),
    ("serial_number", "serial number"),
    ("inventory_code", "inventory code"),
];

impl EquipmentDraft {
    /// Copy with surrounding whitespace removed and blank optionals dropped
    pub fn normalized(&self) -> Self {
        fn opt(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            equipment_type: self.equipment_type.trim().to_string(),
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            serial_number: self.serial_number.trim().to_string(),
            inventory_code: self.inventory_code.trim().to_string(),
            ip_address: opt(&self.ip_address),
            purchase_date: self.purchase_date,
            status: self.status,
            assigned_to: opt(&self.assigned_to),
        }
    }

    /// Labels of required fields that are empty, in form order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        match self.normalized().validate() {
            Ok(()) => Vec::new(),
            Err(errors) => missing_labels(&errors),
        }
    }
}

fn missing_labels(errors: &ValidationErrors) -> Vec<&'static str> {
    let fields = errors.field_errors();
    REQUIRED_FIELDS
        .iter()
        .filter(|(field, _)| fields.contains_key(*field))
        .map(|(_, label)| *label)
        .collect()
}

impl From<&Equipment> for EquipmentDraft {
    fn from(item: &Equipment) -> Self {
        Self {
            equipment_type: item.equipment_type.clone(),
            brand: item.brand.clone(),
            model: item.model.clone(),
            serial_number: item.serial_number.clone(),
            inventory_code: item.inventory_code.clone(),
            ip_address: item.ip_address.clone(),
            purchase_date: item.purchase_date,
            status: item.status,
            assigned_to: item.assigned_to.clone(),
        }
    }
}
