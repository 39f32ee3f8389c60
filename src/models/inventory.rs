use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{StockStatus, TemperatureRisk};

/// One batch of a medicine held by a store.
///
/// `expiry_days` counts days until expiry and may be zero or negative
/// (already expired). Risk is always derived from these fields on
/// demand, never written back onto the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub store: String,
    pub medicine: String,
    pub quantity: i64,
    pub expiry_days: i64,
    pub temperature_risk: TemperatureRisk,
    pub visible_to_users: bool,
    pub status: StockStatus,
    /// Store uploads land unapproved; an admin flips this.
    pub approved: bool,
}

impl InventoryRecord {
    /// A fresh, admin-approved, user-visible record.
    pub fn new(
        store: &str,
        medicine: &str,
        quantity: i64,
        expiry_days: i64,
        temperature_risk: TemperatureRisk,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            store: store.to_string(),
            medicine: medicine.to_string(),
            quantity,
            expiry_days,
            temperature_risk,
            visible_to_users: true,
            status: StockStatus::Available,
            approved: true,
        }
    }
}
