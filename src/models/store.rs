use serde::{Deserialize, Serialize};

use super::enums::StoreStatus;
use crate::geo::Coordinates;

/// A participating pharmacy or hospital dispensary. `name` is the
/// unique key inventory rows reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub status: StoreStatus,
}

impl Store {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}
