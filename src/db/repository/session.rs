use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::db::StorageError;
use crate::models::enums::Role;
use crate::models::UserSession;

/// Save the login session (singleton row, id=1). Replaces any
/// previous session — last writer wins.
pub fn save_session(conn: &Connection, session: &UserSession) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO session (id, name, location, role, logged_in_at)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
         name = ?1, location = ?2, role = ?3, logged_in_at = ?4",
        params![
            session.name,
            session.location,
            session.role.as_str(),
            session.logged_in_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// The current session, if anyone is logged in.
pub fn current_session(conn: &Connection) -> Result<Option<UserSession>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT name, location, role, logged_in_at FROM session WHERE id = 1")?;
    let result = stmt.query_row([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    });

    match result {
        Ok((name, location, role, logged_in_at)) => Ok(Some(UserSession {
            name,
            location,
            role: Role::from_str(&role)?,
            logged_in_at: DateTime::parse_from_rfc3339(&logged_in_at)
                .map_err(|e| StorageError::ConstraintViolation(e.to_string()))?
                .with_timezone(&Utc),
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StorageError::from(e)),
    }
}

pub fn clear_session(conn: &Connection) -> Result<(), StorageError> {
    conn.execute("DELETE FROM session WHERE id = 1", [])?;
    Ok(())
}
