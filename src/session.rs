//! Login and role gating.
//!
//! The prototype-era role flag becomes a persisted singleton session;
//! the page-redirect "protection" becomes a typed check callers run
//! before role-restricted operations.

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, StorageError};
use crate::models::enums::Role;
use crate::models::UserSession;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Requires {required} role, logged in as {actual}")]
    Forbidden { required: &'static str, actual: &'static str },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Log in. All fields are required; a new login replaces any
/// existing session.
pub fn login(
    conn: &Connection,
    name: &str,
    location: &str,
    role: Role,
) -> Result<UserSession, SessionError> {
    if name.trim().is_empty() {
        return Err(SessionError::MissingField("name"));
    }
    if location.trim().is_empty() {
        return Err(SessionError::MissingField("location"));
    }

    let session = UserSession {
        name: name.trim().to_string(),
        location: location.trim().to_string(),
        role,
        logged_in_at: Utc::now(),
    };
    db::save_session(conn, &session)?;
    tracing::info!(name = %session.name, role = role.as_str(), "logged in");
    Ok(session)
}

pub fn current(conn: &Connection) -> Result<Option<UserSession>, SessionError> {
    Ok(db::current_session(conn)?)
}

pub fn logout(conn: &Connection) -> Result<(), SessionError> {
    db::clear_session(conn)?;
    Ok(())
}

/// Gate for role-restricted operations: the session must exist and
/// carry exactly `required`.
pub fn require_role(conn: &Connection, required: Role) -> Result<UserSession, SessionError> {
    let session = db::current_session(conn)?.ok_or(SessionError::NotLoggedIn)?;
    if session.role != required {
        return Err(SessionError::Forbidden {
            required: required.as_str(),
            actual: session.role.as_str(),
        });
    }
    Ok(session)
}
