use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::StorageError;
use crate::models::enums::{StockStatus, TemperatureRisk};
use crate::models::InventoryRecord;

pub fn insert_record(conn: &Connection, rec: &InventoryRecord) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO inventory (id, store, medicine, quantity, expiry_days, temperature_risk,
         visible_to_users, status, approved)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            rec.id.to_string(),
            rec.store,
            rec.medicine,
            rec.quantity,
            rec.expiry_days,
            rec.temperature_risk.as_str(),
            rec.visible_to_users as i32,
            rec.status.as_str(),
            rec.approved as i32,
        ],
    )?;
    Ok(())
}

pub fn list_records(conn: &Connection) -> Result<Vec<InventoryRecord>, StorageError> {
    query_records(conn, "SELECT id, store, medicine, quantity, expiry_days, temperature_risk,
         visible_to_users, status, approved FROM inventory ORDER BY created_at, rowid")
}

/// Records the matcher is allowed to see: visible and still available.
pub fn list_visible(conn: &Connection) -> Result<Vec<InventoryRecord>, StorageError> {
    query_records(conn, "SELECT id, store, medicine, quantity, expiry_days, temperature_risk,
         visible_to_users, status, approved FROM inventory
         WHERE visible_to_users = 1 AND status = 'available' ORDER BY created_at, rowid")
}

pub fn get_record(conn: &Connection, id: &Uuid) -> Result<InventoryRecord, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, store, medicine, quantity, expiry_days, temperature_risk,
         visible_to_users, status, approved FROM inventory WHERE id = ?1",
    )?;
    match stmt.query_row(params![id.to_string()], |row| record_row(row)) {
        Ok(row) => record_from_row(row),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            entity_type: "InventoryRecord".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(StorageError::from(e)),
    }
}

/// Flip user visibility (Hidden ⇄ Visible). Returns the new state.
pub fn toggle_visibility(conn: &Connection, id: &Uuid) -> Result<bool, StorageError> {
    let rec = get_record(conn, id)?;
    let next = !rec.visible_to_users;
    conn.execute(
        "UPDATE inventory SET visible_to_users = ?1 WHERE id = ?2",
        params![next as i32, id.to_string()],
    )?;
    Ok(next)
}

/// Admin approval flag for store uploads.
pub fn set_approved(conn: &Connection, id: &Uuid, approved: bool) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE inventory SET approved = ?1 WHERE id = ?2",
        params![approved as i32, id.to_string()],
    )?;
    if changed == 0 {
        return Err(StorageError::NotFound {
            entity_type: "InventoryRecord".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Transition Available → Reserved. Once reserved the record stays
/// reserved; a second reservation attempt is a constraint violation.
pub fn reserve_record(conn: &Connection, id: &Uuid) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE inventory SET status = 'reserved' WHERE id = ?1 AND status = 'available'",
        params![id.to_string()],
    )?;
    if changed == 0 {
        // Distinguish missing from already-reserved for the caller.
        let rec = get_record(conn, id)?;
        return Err(StorageError::ConstraintViolation(format!(
            "inventory record {} is already {}",
            rec.id,
            rec.status.as_str()
        )));
    }
    Ok(())
}

// Internal row type for InventoryRecord mapping
struct InventoryRow {
    id: String,
    store: String,
    medicine: String,
    quantity: i64,
    expiry_days: i64,
    temperature_risk: String,
    visible_to_users: i32,
    status: String,
    approved: i32,
}

fn record_row(row: &rusqlite::Row<'_>) -> Result<InventoryRow, rusqlite::Error> {
    Ok(InventoryRow {
        id: row.get(0)?,
        store: row.get(1)?,
        medicine: row.get(2)?,
        quantity: row.get(3)?,
        expiry_days: row.get(4)?,
        temperature_risk: row.get(5)?,
        visible_to_users: row.get(6)?,
        status: row.get(7)?,
        approved: row.get(8)?,
    })
}

fn record_from_row(row: InventoryRow) -> Result<InventoryRecord, StorageError> {
    Ok(InventoryRecord {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| StorageError::ConstraintViolation(e.to_string()))?,
        store: row.store,
        medicine: row.medicine,
        quantity: row.quantity,
        expiry_days: row.expiry_days,
        temperature_risk: TemperatureRisk::from_str(&row.temperature_risk)?,
        visible_to_users: row.visible_to_users != 0,
        status: StockStatus::from_str(&row.status)?,
        approved: row.approved != 0,
    })
}

fn query_records(conn: &Connection, sql: &str) -> Result<Vec<InventoryRecord>, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok(record_row(row)))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(record_from_row(row??)?);
    }
    Ok(records)
}
