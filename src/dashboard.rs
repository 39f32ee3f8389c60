//! View assembly for the dashboards — rows, KPIs and alerts ready for
//! a renderer, with all severity derived on the way out.
//!
//! Risk never lives in the database. Every query here recomputes it
//! from the record's own fields, so two renders of the same state are
//! identical and nothing stale can be painted.

use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{self, StorageError};
use crate::geo::{self, Coordinates};
use crate::models::enums::{RiskLevel, StockStatus};
use crate::models::InventoryRecord;
use crate::risk::{self, ExpiryBand, RiskAssessment};

/// One inventory row for the stock list.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRow {
    pub id: Uuid,
    pub store: String,
    pub medicine: String,
    pub quantity: i64,
    pub expiry_days: i64,
    pub expiry_band: ExpiryBand,
    pub status: StockStatus,
    pub assessment: RiskAssessment,
    pub advisory: &'static str,
    pub needs_reorder: bool,
}

/// The stock list plus its header stats.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryOverview {
    pub rows: Vec<InventoryRow>,
    pub total_items: usize,
    pub reserved_count: usize,
    pub critical_count: usize,
    pub expiring_soon_count: usize,
}

/// One row of the admin priority report: risk plus distance from the
/// coordination hub.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityRow {
    pub id: Uuid,
    pub medicine: String,
    pub store: String,
    pub location: String,
    pub distance_km: f64,
    pub expiry_days: i64,
    pub visible_to_users: bool,
    pub assessment: RiskAssessment,
}

/// The admin report with its KPI header.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityReport {
    pub rows: Vec<PriorityRow>,
    pub critical_count: usize,
    pub warning_count: usize,
    pub verified_stores: i64,
}

/// Stock needing an automatic re-order: nothing left, or already past
/// expiry.
pub fn needs_reorder(record: &InventoryRecord) -> bool {
    record.quantity <= 0 || record.expiry_days <= 0
}

fn to_row(record: InventoryRecord) -> InventoryRow {
    let assessment = risk::assess(&record);
    let advisory = risk::advisory(&record, &assessment);
    InventoryRow {
        id: record.id,
        expiry_band: ExpiryBand::classify(record.expiry_days),
        needs_reorder: needs_reorder(&record),
        store: record.store,
        medicine: record.medicine,
        quantity: record.quantity,
        expiry_days: record.expiry_days,
        status: record.status,
        assessment,
        advisory,
    }
}

/// The full stock list with derived severity and header stats.
pub fn overview(conn: &Connection) -> Result<InventoryOverview, StorageError> {
    let rows: Vec<InventoryRow> = db::list_records(conn)?.into_iter().map(to_row).collect();

    let total_items = rows.len();
    let reserved_count = rows.iter().filter(|r| r.status == StockStatus::Reserved).count();
    let critical_count = rows
        .iter()
        .filter(|r| r.assessment.level == RiskLevel::Critical)
        .count();
    let expiring_soon_count = rows
        .iter()
        .filter(|r| r.expiry_band == ExpiryBand::Warning)
        .count();

    Ok(InventoryOverview {
        rows,
        total_items,
        reserved_count,
        critical_count,
        expiring_soon_count,
    })
}

/// The admin priority report: every record scored and measured from
/// `origin`, highest risk first, nearest first within equal risk.
pub fn priority_report(
    conn: &Connection,
    origin: Coordinates,
) -> Result<PriorityReport, StorageError> {
    let stores = db::list_stores(conn)?;

    let mut rows = Vec::new();
    for record in db::list_records(conn)? {
        let Some(store) = stores.iter().find(|s| s.name == record.store) else {
            tracing::warn!(store = %record.store, "priority report skipping unknown store");
            continue;
        };
        rows.push(PriorityRow {
            id: record.id,
            distance_km: geo::distance_km(origin, store.coordinates()),
            location: store.location.clone(),
            assessment: risk::assess(&record),
            medicine: record.medicine,
            store: record.store,
            expiry_days: record.expiry_days,
            visible_to_users: record.visible_to_users,
        });
    }

    rows.sort_by(|a, b| {
        b.assessment
            .score
            .cmp(&a.assessment.score)
            .then(a.distance_km.total_cmp(&b.distance_km))
    });

    let critical_count = rows
        .iter()
        .filter(|r| r.assessment.level == RiskLevel::Critical)
        .count();
    let warning_count = rows
        .iter()
        .filter(|r| r.assessment.level == RiskLevel::Warning)
        .count();
    let verified_stores = db::verified_count(conn)?;

    Ok(PriorityReport {
        rows,
        critical_count,
        warning_count,
        verified_stores,
    })
}

/// Records inside the critical-expiry window (≤ 7 days).
pub fn expiry_alerts(conn: &Connection) -> Result<Vec<InventoryRecord>, StorageError> {
    let mut records: Vec<InventoryRecord> = db::list_records(conn)?
        .into_iter()
        .filter(|r| r.expiry_days <= crate::notify::EXPIRY_ALERT_DAYS)
        .collect();
    records.sort_by_key(|r| r.expiry_days);
    Ok(records)
}

/// Stock flagged for automatic re-order.
pub fn reorder_candidates(conn: &Connection) -> Result<Vec<InventoryRecord>, StorageError> {
    Ok(db::list_records(conn)?
        .into_iter()
        .filter(needs_reorder)
        .collect())
}

/// The banner alert source: the highest-scoring critical record, if
/// any stock is critical at all.
pub fn top_risk(conn: &Connection) -> Result<Option<InventoryRow>, StorageError> {
    let overview = overview(conn)?;
    Ok(overview
        .rows
        .into_iter()
        .filter(|r| r.assessment.level == RiskLevel::Critical)
        .max_by_key(|r| r.assessment.score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed_demo_data;
    use crate::config;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::TemperatureRisk;

    fn seeded_db() -> Connection {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();
        conn
    }

    #[test]
    fn overview_scores_every_row() {
        let conn = seeded_db();
        let view = overview(&conn).unwrap();

        assert_eq!(view.total_items, 2);
        assert_eq!(view.reserved_count, 0);

        // Seed vaccine: 10 days (+30), critical temp (+30), high demand (+10) = 70.
        let vaccine = view.rows.iter().find(|r| r.medicine == "COVID-19 Vaccine").unwrap();
        assert_eq!(vaccine.assessment.score, 70);
        assert_eq!(vaccine.assessment.level, RiskLevel::Critical);

        // Seed insulin: 25 days (+30), high temp (+20) = 50. Plain
        // "Insulin" is not in the high-demand set.
        let insulin = view.rows.iter().find(|r| r.medicine == "Insulin").unwrap();
        assert_eq!(insulin.assessment.score, 50);
        assert_eq!(insulin.assessment.level, RiskLevel::Warning);
    }

    #[test]
    fn overview_counts_reserved_stock() {
        let conn = seeded_db();
        let id = db::list_records(&conn).unwrap()[0].id;
        db::reserve_record(&conn, &id).unwrap();

        let view = overview(&conn).unwrap();
        assert_eq!(view.reserved_count, 1);
    }

    #[test]
    fn priority_report_sorts_critical_first_then_nearest() {
        let conn = seeded_db();
        let report = priority_report(&conn, config::admin_hq()).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].medicine, "COVID-19 Vaccine");
        assert_eq!(report.critical_count, 1);
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.verified_stores, 1);
        assert!(report.rows.iter().all(|r| r.distance_km > 0.0));
    }

    #[test]
    fn equal_scores_order_by_distance() {
        let conn = seeded_db();
        // Same medicine and condition at both stores → equal scores.
        db::insert_record(
            &conn,
            &InventoryRecord::new("Pharmacy A", "Paracetamol", 100, 90, TemperatureRisk::Low),
        )
        .unwrap();
        db::insert_record(
            &conn,
            &InventoryRecord::new(
                "City Hospital Pharmacy",
                "Paracetamol",
                100,
                90,
                TemperatureRisk::Low,
            ),
        )
        .unwrap();

        let report = priority_report(&conn, config::admin_hq()).unwrap();
        let paracetamol: Vec<&PriorityRow> = report
            .rows
            .iter()
            .filter(|r| r.medicine == "Paracetamol")
            .collect();
        assert_eq!(paracetamol.len(), 2);
        assert!(paracetamol[0].distance_km <= paracetamol[1].distance_km);
    }

    #[test]
    fn expiry_alerts_only_within_window() {
        let conn = seeded_db();
        db::insert_record(
            &conn,
            &InventoryRecord::new("Pharmacy A", "Amoxicillin", 30, 3, TemperatureRisk::Low),
        )
        .unwrap();

        let alerts = expiry_alerts(&conn).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].medicine, "Amoxicillin");
    }

    #[test]
    fn reorder_flags_empty_or_expired_stock() {
        let conn = seeded_db();
        db::insert_record(
            &conn,
            &InventoryRecord::new("Pharmacy A", "Depleted", 0, 40, TemperatureRisk::Low),
        )
        .unwrap();
        db::insert_record(
            &conn,
            &InventoryRecord::new("Pharmacy A", "Expired", 30, -1, TemperatureRisk::Low),
        )
        .unwrap();

        let candidates = reorder_candidates(&conn).unwrap();
        let names: Vec<&str> = candidates.iter().map(|r| r.medicine.as_str()).collect();
        assert_eq!(names, vec!["Depleted", "Expired"]);
    }

    #[test]
    fn top_risk_is_the_highest_critical_record() {
        let conn = seeded_db();
        let top = top_risk(&conn).unwrap().unwrap();
        assert_eq!(top.medicine, "COVID-19 Vaccine");
        assert_eq!(
            top.advisory,
            "High risk of wastage. Immediate redistribution recommended."
        );
    }

    #[test]
    fn top_risk_is_none_when_nothing_critical() {
        let conn = open_memory_database().unwrap();
        db::insert_store(
            &conn,
            &crate::models::Store {
                name: "Pharmacy A".into(),
                location: "Sector 21".into(),
                lat: 28.5355,
                lng: 77.3910,
                status: crate::models::StoreStatus::Pending,
            },
        )
        .unwrap();
        db::insert_record(
            &conn,
            &InventoryRecord::new("Pharmacy A", "Paracetamol", 100, 90, TemperatureRisk::Low),
        )
        .unwrap();

        assert!(top_risk(&conn).unwrap().is_none());
    }
}
