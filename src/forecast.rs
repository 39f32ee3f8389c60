//! Demand forecasting from request history.
//!
//! A flat lifetime count of exact-name requests, classified into
//! three bands. No time decay or windowing: a medicine requested five
//! times two years ago still forecasts High. Kept deliberately — the
//! request log is small and the bands are coarse.

use rusqlite::Connection;

use crate::db::{self, StorageError};
use crate::models::enums::DemandLevel;
use crate::models::MedicineRequest;

const HIGH_THRESHOLD: usize = 5;
const MEDIUM_THRESHOLD: usize = 2;

/// Classify demand for `medicine` from a request history slice.
/// Name comparison is exact, matching how requests are recorded.
pub fn forecast_demand(history: &[MedicineRequest], medicine: &str) -> DemandLevel {
    let count = history.iter().filter(|r| r.medicine == medicine).count();
    classify_count(count)
}

/// Classify demand from the persisted request log.
pub fn forecast_for(conn: &Connection, medicine: &str) -> Result<DemandLevel, StorageError> {
    let count = db::count_for_medicine(conn, medicine)?;
    Ok(classify_count(count as usize))
}

fn classify_count(count: usize) -> DemandLevel {
    if count >= HIGH_THRESHOLD {
        DemandLevel::High
    } else if count >= MEDIUM_THRESHOLD {
        DemandLevel::Medium
    } else {
        DemandLevel::Low
    }
}
