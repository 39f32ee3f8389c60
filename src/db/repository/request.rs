use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::StorageError;
use crate::models::enums::RequestStatus;
use crate::models::MedicineRequest;

pub fn insert_request(conn: &Connection, req: &MedicineRequest) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO requests (id, medicine, quantity, requester, location, status, requested_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            req.id.to_string(),
            req.medicine,
            req.quantity,
            req.requester,
            req.location,
            req.status.as_str(),
            req.requested_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_requests(conn: &Connection) -> Result<Vec<MedicineRequest>, StorageError> {
    query_requests(
        conn,
        "SELECT id, medicine, quantity, requester, location, status, requested_at
         FROM requests ORDER BY requested_at",
        [],
    )
}

/// Requests the matcher joins against: still open.
pub fn list_open(conn: &Connection) -> Result<Vec<MedicineRequest>, StorageError> {
    query_requests(
        conn,
        "SELECT id, medicine, quantity, requester, location, status, requested_at
         FROM requests WHERE status = 'open' ORDER BY requested_at",
        [],
    )
}

/// Flat lifetime count of requests for an exact medicine name. The
/// demand forecast is a step function over this count.
pub fn count_for_medicine(conn: &Connection, medicine: &str) -> Result<i64, StorageError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM requests WHERE medicine = ?1",
        [medicine],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Transition Open → Fulfilled. A second transition is a constraint
/// violation; the request entity never reopens.
pub fn mark_fulfilled(conn: &Connection, id: &Uuid) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE requests SET status = 'fulfilled' WHERE id = ?1 AND status = 'open'",
        params![id.to_string()],
    )?;
    if changed == 0 {
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM requests WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StorageError::NotFound {
                entity_type: "MedicineRequest".into(),
                id: id.to_string(),
            });
        }
        return Err(StorageError::ConstraintViolation(format!(
            "request {id} is already fulfilled"
        )));
    }
    Ok(())
}

fn query_requests(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<MedicineRequest>, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut requests = Vec::new();
    for row in rows {
        let (id, medicine, quantity, requester, location, status, requested_at) = row?;
        requests.push(MedicineRequest {
            id: Uuid::parse_str(&id)
                .map_err(|e| StorageError::ConstraintViolation(e.to_string()))?,
            medicine,
            quantity,
            requester,
            location,
            status: RequestStatus::from_str(&status)?,
            requested_at: DateTime::parse_from_rfc3339(&requested_at)
                .map_err(|e| StorageError::ConstraintViolation(e.to_string()))?
                .with_timezone(&Utc),
        });
    }
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn insulin_request() -> MedicineRequest {
        MedicineRequest::new("Insulin", 5, "Asha Clinic", "Sector 21")
    }

    #[test]
    fn insert_and_list_round_trip() {
        let conn = open_memory_database().unwrap();
        let req = insulin_request();
        insert_request(&conn, &req).unwrap();

        let all = list_requests(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].medicine, "Insulin");
        assert_eq!(all[0].status, RequestStatus::Open);
    }

    #[test]
    fn count_is_exact_name_match() {
        let conn = open_memory_database().unwrap();
        insert_request(&conn, &insulin_request()).unwrap();
        insert_request(&conn, &MedicineRequest::new("Insulin (Human)", 2, "B", "X")).unwrap();

        assert_eq!(count_for_medicine(&conn, "Insulin").unwrap(), 1);
        assert_eq!(count_for_medicine(&conn, "Insulin (Human)").unwrap(), 1);
        assert_eq!(count_for_medicine(&conn, "insulin").unwrap(), 0);
    }

    #[test]
    fn fulfilled_requests_leave_the_open_pool() {
        let conn = open_memory_database().unwrap();
        let req = insulin_request();
        insert_request(&conn, &req).unwrap();

        mark_fulfilled(&conn, &req.id).unwrap();
        assert!(list_open(&conn).unwrap().is_empty());
        assert_eq!(list_requests(&conn).unwrap().len(), 1);
    }

    #[test]
    fn fulfilling_twice_is_a_constraint_violation() {
        let conn = open_memory_database().unwrap();
        let req = insulin_request();
        insert_request(&conn, &req).unwrap();

        mark_fulfilled(&conn, &req.id).unwrap();
        let err = mark_fulfilled(&conn, &req.id).unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }

    #[test]
    fn fulfilling_unknown_request_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = mark_fulfilled(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
