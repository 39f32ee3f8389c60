use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::StorageError;
use crate::models::enums::StoreStatus;
use crate::models::Store;

pub fn insert_store(conn: &Connection, store: &Store) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO stores (name, location, lat, lng, status) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            store.name,
            store.location,
            store.lat,
            store.lng,
            store.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn list_stores(conn: &Connection) -> Result<Vec<Store>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT name, location, lat, lng, status FROM stores ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut stores = Vec::new();
    for row in rows {
        let (name, location, lat, lng, status) = row?;
        stores.push(Store {
            name,
            location,
            lat,
            lng,
            status: StoreStatus::from_str(&status)?,
        });
    }
    Ok(stores)
}

pub fn get_store(conn: &Connection, name: &str) -> Result<Store, StorageError> {
    let mut stmt =
        conn.prepare("SELECT name, location, lat, lng, status FROM stores WHERE name = ?1")?;
    let result = stmt.query_row([name], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, String>(4)?,
        ))
    });

    match result {
        Ok((name, location, lat, lng, status)) => Ok(Store {
            name,
            location,
            lat,
            lng,
            status: StoreStatus::from_str(&status)?,
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NotFound {
            entity_type: "Store".into(),
            id: name.into(),
        }),
        Err(e) => Err(StorageError::from(e)),
    }
}

/// Verified-store KPI for the admin header.
pub fn verified_count(conn: &Connection) -> Result<i64, StorageError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM stores WHERE status = 'verified'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn set_store_status(
    conn: &Connection,
    name: &str,
    status: StoreStatus,
) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE stores SET status = ?1 WHERE name = ?2",
        params![status.as_str(), name],
    )?;
    if changed == 0 {
        return Err(StorageError::NotFound {
            entity_type: "Store".into(),
            id: name.into(),
        });
    }
    Ok(())
}
