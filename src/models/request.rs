use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::RequestStatus;

/// An outstanding ask for a medicine from a user at a location.
///
/// A request owns its lifecycle: it opens when created and is marked
/// fulfilled exactly once, in the same transaction that reserves the
/// matched inventory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineRequest {
    pub id: Uuid,
    pub medicine: String,
    pub quantity: i64,
    pub requester: String,
    pub location: String,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
}

impl MedicineRequest {
    pub fn new(medicine: &str, quantity: i64, requester: &str, location: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            medicine: medicine.to_string(),
            quantity,
            requester: requester.to_string(),
            location: location.to_string(),
            status: RequestStatus::Open,
            requested_at: Utc::now(),
        }
    }
}
