use rusqlite::{params, Connection};

use crate::db::StorageError;
use crate::models::Organization;

pub fn insert_organization(conn: &Connection, org: &Organization) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO organizations (name, location, kind) VALUES (?1, ?2, ?3)",
        params![org.name, org.location, org.kind],
    )?;
    Ok(())
}

pub fn list_organizations(conn: &Connection) -> Result<Vec<Organization>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT name, location, kind FROM organizations ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Organization {
            name: row.get(0)?,
            location: row.get(1)?,
            kind: row.get(2)?,
        })
    })?;

    let mut orgs = Vec::new();
    for row in rows {
        orgs.push(row?);
    }
    Ok(orgs)
}
