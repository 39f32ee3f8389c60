//! Catalog loading and inventory ingest.
//!
//! Two ways stock enters the system: a JSON catalog document read at
//! startup, and comma-separated store uploads. Malformed upload rows
//! are skipped and counted — the count travels with the result so the
//! caller can report it instead of silently shrinking the upload.

use std::path::Path;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{self, StorageError};
use crate::models::enums::{StockStatus, TempStatus, TemperatureRisk};
use crate::models::{InventoryRecord, Store, StoreStatus};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One entry of the `medicines.json` catalog document.
///
/// `quantity` is a compatible extension of the upstream document;
/// entries without one ingest as zero stock, which keeps them flagged
/// (low stock, reorder) until a store upload supplies a real count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub expiry: i64,
    pub temp_status: TempStatus,
    pub status: StockStatus,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl CatalogEntry {
    pub fn into_record(self, store: &str) -> InventoryRecord {
        let mut record = InventoryRecord::new(
            store,
            &self.name,
            self.quantity.unwrap_or(0),
            self.expiry,
            TemperatureRisk::from(self.temp_status),
        );
        record.status = self.status;
        record
    }
}

/// Parse a catalog document from JSON text.
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

/// Load the catalog from a file. A missing or unreadable file is a
/// typed error; the caller decides whether to start empty.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let text = std::fs::read_to_string(path).inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to load catalog");
    })?;
    parse_catalog(&text)
}

/// Persist catalog entries as inventory of the named store.
pub fn ingest_catalog(
    conn: &Connection,
    entries: Vec<CatalogEntry>,
    store: &str,
) -> Result<usize, CatalogError> {
    let mut inserted = 0;
    for entry in entries {
        db::insert_record(conn, &entry.into_record(store))?;
        inserted += 1;
    }
    tracing::info!(store, inserted, "catalog ingested");
    Ok(inserted)
}

/// Result of parsing a store upload.
#[derive(Debug)]
pub struct UploadOutcome {
    pub records: Vec<InventoryRecord>,
    /// Non-empty rows that were dropped (too few columns, or numbers
    /// that would not parse).
    pub skipped_rows: usize,
}

/// Parse a comma-separated upload: `medicine,quantity,expiry,temp`
/// with a header line. Rows with fewer than four columns or with
/// unparsable quantity/expiry are skipped and counted; blank lines
/// are ignored. Uploaded records are visible but unapproved until an
/// admin signs them off.
pub fn parse_upload(text: &str, store: &str) -> UploadOutcome {
    let mut records = Vec::new();
    let mut skipped_rows = 0;

    for line in text.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() < 4 {
            skipped_rows += 1;
            continue;
        }

        let quantity = columns[1].trim().parse::<i64>();
        let expiry = columns[2].trim().parse::<i64>();
        let temp = parse_temperature(columns[3].trim());
        let (Ok(quantity), Ok(expiry), Some(temp)) = (quantity, expiry, temp) else {
            skipped_rows += 1;
            continue;
        };
        if quantity < 0 {
            skipped_rows += 1;
            continue;
        }

        let mut record =
            InventoryRecord::new(store, columns[0].trim(), quantity, expiry, temp);
        record.approved = false;
        records.push(record);
    }

    if skipped_rows > 0 {
        tracing::warn!(store, skipped_rows, "upload contained malformed rows");
    }
    UploadOutcome { records, skipped_rows }
}

/// Store uploads use either the sensor vocabulary (Safe/Unsafe) or
/// the exposure vocabulary (Low/High/Critical).
fn parse_temperature(cell: &str) -> Option<TemperatureRisk> {
    match cell.to_ascii_lowercase().as_str() {
        "safe" | "low" => Some(TemperatureRisk::Low),
        "unsafe" | "high" => Some(TemperatureRisk::High),
        "critical" => Some(TemperatureRisk::Critical),
        _ => None,
    }
}

/// Persist an upload.
pub fn ingest_upload(conn: &Connection, outcome: &UploadOutcome) -> Result<(), StorageError> {
    for record in &outcome.records {
        db::insert_record(conn, record)?;
    }
    Ok(())
}

/// Seed the two demo stores and their starting stock. No-op when
/// stores already exist.
pub fn seed_demo_data(conn: &Connection) -> Result<(), StorageError> {
    if !db::list_stores(conn)?.is_empty() {
        return Ok(());
    }

    db::insert_store(
        conn,
        &Store {
            name: "Pharmacy A".into(),
            location: "Sector 21".into(),
            lat: 28.5355,
            lng: 77.3910,
            status: StoreStatus::Pending,
        },
    )?;
    db::insert_store(
        conn,
        &Store {
            name: "City Hospital Pharmacy".into(),
            location: "MG Road".into(),
            lat: 28.4595,
            lng: 77.0266,
            status: StoreStatus::Verified,
        },
    )?;

    db::insert_record(
        conn,
        &InventoryRecord::new("Pharmacy A", "Insulin", 20, 25, TemperatureRisk::High),
    )?;
    db::insert_record(
        conn,
        &InventoryRecord::new(
            "City Hospital Pharmacy",
            "COVID-19 Vaccine",
            50,
            10,
            TemperatureRisk::Critical,
        ),
    )?;

    tracing::info!("seeded demo stores and inventory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use std::io::Write;

    const CATALOG_JSON: &str = r#"[
        { "name": "Insulin (Human)", "expiry": 5, "tempStatus": "Unsafe", "status": "Available", "quantity": 12 },
        { "name": "Paracetamol", "expiry": 90, "tempStatus": "Safe", "status": "Reserved" }
    ]"#;

    #[test]
    fn parses_catalog_document() {
        let entries = parse_catalog(CATALOG_JSON).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Insulin (Human)");
        assert_eq!(entries[0].temp_status, TempStatus::Unsafe);
        assert_eq!(entries[0].quantity, Some(12));
        assert_eq!(entries[1].status, StockStatus::Reserved);
        assert_eq!(entries[1].quantity, None);
    }

    #[test]
    fn malformed_catalog_is_a_parse_error() {
        let err = parse_catalog("{ not a list").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() {
        let err = load_catalog(Path::new("/nonexistent/medicines.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn loads_catalog_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG_JSON.as_bytes()).unwrap();

        let entries = load_catalog(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn catalog_entry_maps_sensor_status_to_exposure() {
        let entries = parse_catalog(CATALOG_JSON).unwrap();
        let record = entries[0].clone().into_record("Pharmacy A");
        assert_eq!(record.temperature_risk, TemperatureRisk::High);
        assert_eq!(record.quantity, 12);
        assert!(record.visible_to_users);
    }

    const UPLOAD_CSV: &str = "\
Medicine,Quantity,ExpiryDays,Temperature
Insulin,20,25,High
Paracetamol,100,90,Safe
BrokenRow,5
Aspirin,not-a-number,30,Safe
MMR Vaccine,40,12,Critical
";

    #[test]
    fn upload_skips_malformed_rows_and_counts_them() {
        let outcome = parse_upload(UPLOAD_CSV, "Pharmacy A");
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.skipped_rows, 2);

        let names: Vec<&str> = outcome.records.iter().map(|r| r.medicine.as_str()).collect();
        assert_eq!(names, vec!["Insulin", "Paracetamol", "MMR Vaccine"]);
    }

    #[test]
    fn uploaded_records_are_unapproved() {
        let outcome = parse_upload(UPLOAD_CSV, "Pharmacy A");
        assert!(outcome.records.iter().all(|r| !r.approved));
        assert!(outcome.records.iter().all(|r| r.visible_to_users));
    }

    #[test]
    fn upload_accepts_both_temperature_vocabularies() {
        let outcome = parse_upload(UPLOAD_CSV, "Pharmacy A");
        assert_eq!(outcome.records[0].temperature_risk, TemperatureRisk::High);
        assert_eq!(outcome.records[1].temperature_risk, TemperatureRisk::Low);
        assert_eq!(outcome.records[2].temperature_risk, TemperatureRisk::Critical);
    }

    #[test]
    fn blank_lines_are_not_counted_as_skipped() {
        let outcome = parse_upload("header\n\nInsulin,5,10,Safe\n\n", "Pharmacy A");
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped_rows, 0);
    }

    #[test]
    fn header_only_upload_is_empty_not_an_error() {
        let outcome = parse_upload("Medicine,Quantity,ExpiryDays,Temperature\n", "Pharmacy A");
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped_rows, 0);
    }

    #[test]
    fn ingest_upload_persists_records() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let outcome = parse_upload("h\nAmoxicillin,30,40,Safe\n", "Pharmacy A");
        ingest_upload(&conn, &outcome).unwrap();

        let all = db::list_records(&conn).unwrap();
        assert!(all.iter().any(|r| r.medicine == "Amoxicillin" && !r.approved));
    }

    #[test]
    fn seed_is_idempotent() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();
        seed_demo_data(&conn).unwrap();

        assert_eq!(db::list_stores(&conn).unwrap().len(), 2);
        assert_eq!(db::list_records(&conn).unwrap().len(), 2);
    }

    #[test]
    fn ingest_catalog_persists_into_store() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let entries = parse_catalog(CATALOG_JSON).unwrap();
        let inserted = ingest_catalog(&conn, entries, "City Hospital Pharmacy").unwrap();
        assert_eq!(inserted, 2);
    }
}
