//! Wastage-risk scoring for inventory records.
//!
//! One canonical additive policy on a 0–100 scale. Four factors are
//! evaluated in a fixed order (expiry, temperature, stock, demand);
//! each contributes a weight and a reason string. The level is a step
//! function of the total. Scoring is pure: it reads only the record's
//! own fields and is recomputed on demand, never written back.

use serde::{Deserialize, Serialize};

use crate::models::enums::{RiskLevel, TemperatureRisk};
use crate::models::InventoryRecord;

/// Medicines with chronically high pull; their presence in stock is
/// worth escalating slightly even when other factors are quiet.
/// Matched by substring, so "Insulin (Human) 10ml" qualifies.
pub const HIGH_DEMAND_MEDICINES: &[&str] =
    &["Insulin (Human)", "COVID-19 Vaccine", "MMR Vaccine"];

const WEIGHT_NEAR_EXPIRY: u32 = 50;
const WEIGHT_EXPIRING_SOON: u32 = 30;
const WEIGHT_TEMP_BREACH: u32 = 30;
const WEIGHT_TEMP_RISK: u32 = 20;
const WEIGHT_LOW_STOCK: u32 = 20;
const WEIGHT_HIGH_DEMAND: u32 = 10;

const MAX_SCORE: u32 = 100;
const CRITICAL_THRESHOLD: u32 = 70;
const WARNING_THRESHOLD: u32 = 40;

/// Derived severity for one record. Not persisted anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub reasons: Vec<String>,
}

/// Expiry pill band for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryBand {
    Critical,
    Warning,
    Notice,
    Safe,
}

impl ExpiryBand {
    /// ≤7 critical, ≤30 warning, ≤60 notice, else safe. Negative days
    /// (already expired) sit in the critical band.
    pub fn classify(expiry_days: i64) -> Self {
        if expiry_days <= 7 {
            Self::Critical
        } else if expiry_days <= 30 {
            Self::Warning
        } else if expiry_days <= 60 {
            Self::Notice
        } else {
            Self::Safe
        }
    }
}

/// Score one record. Deterministic and side-effect free.
pub fn assess(record: &InventoryRecord) -> RiskAssessment {
    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    // Expiry factor. Expired stock (days <= 0) is a subset of the
    // near-expiry branch, not a separate state.
    if record.expiry_days <= 7 {
        score += WEIGHT_NEAR_EXPIRY;
        reasons.push("Near expiry".to_string());
    } else if record.expiry_days <= 30 {
        score += WEIGHT_EXPIRING_SOON;
        reasons.push("Expiring soon".to_string());
    }

    // Temperature factor
    match record.temperature_risk {
        TemperatureRisk::Critical => {
            score += WEIGHT_TEMP_BREACH;
            reasons.push("Temperature breach".to_string());
        }
        TemperatureRisk::High => {
            score += WEIGHT_TEMP_RISK;
            reasons.push("Temperature risk".to_string());
        }
        TemperatureRisk::Low => {}
    }

    // Stock factor
    if record.quantity <= 10 {
        score += WEIGHT_LOW_STOCK;
        reasons.push("Low stock".to_string());
    }

    // Demand factor
    if is_high_demand(&record.medicine) {
        score += WEIGHT_HIGH_DEMAND;
        reasons.push("High demand".to_string());
    }

    let score = score.min(MAX_SCORE);
    RiskAssessment {
        score,
        level: classify(score),
        reasons,
    }
}

/// Step function from score to level.
pub fn classify(score: u32) -> RiskLevel {
    if score >= CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if score >= WARNING_THRESHOLD {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    }
}

pub fn is_high_demand(medicine: &str) -> bool {
    HIGH_DEMAND_MEDICINES.iter().any(|m| medicine.contains(m))
}

/// Redistribution advice for a scored record, in descending urgency.
pub fn advisory(record: &InventoryRecord, assessment: &RiskAssessment) -> &'static str {
    if assessment.level == RiskLevel::Critical {
        "High risk of wastage. Immediate redistribution recommended."
    } else if record.expiry_days <= 7 {
        "Expiring soon. Suggest nearby redistribution."
    } else if record.temperature_risk != TemperatureRisk::Low {
        "Temperature breach detected. Cold-chain attention required."
    } else {
        "Stock is safe."
    }
}
