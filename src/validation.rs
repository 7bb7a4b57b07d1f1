//! Field validators guarding writes to the store.
//!
//! Each validator checks one field and returns the value to persist, or the
//! first rule it violates. Referential and uniqueness checks query the
//! connection they are handed, so they see exactly the rows the following
//! write will see.

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

/// A rejected write. The message is what API clients see.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Scientists must have a name")]
    MissingScientistName,

    #[error("Name must be unique")]
    DuplicateScientistName,

    #[error("Scientists must have a field_of_study")]
    MissingFieldOfStudy,

    #[error("Missions must have a name")]
    MissingMissionName,

    #[error("Missions must have a scientist_id")]
    MissingScientistId,

    #[error("Scientist must exist.")]
    UnknownScientist,

    #[error("Missions must have a planet_id")]
    MissingPlanetId,

    #[error("planet must exist.")]
    UnknownPlanet,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{0} must be an integer")]
    NotAnInteger(&'static str),
}

/// Failure while validating: either a broken rule or a failed lookup.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type CheckResult<T> = std::result::Result<T, CheckError>;

fn non_empty(value: Option<String>, missing: ValidationError) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing),
    }
}

fn non_zero(value: Option<i64>, missing: ValidationError) -> Result<i64, ValidationError> {
    match value {
        Some(id) if id != 0 => Ok(id),
        _ => Err(missing),
    }
}

/// Scientist names must be present and not used by any other scientist.
///
/// `current_id` is the scientist being updated, if any; its own row does not
/// count as a duplicate. The comparison is case-sensitive.
pub fn scientist_name(
    conn: &Connection,
    name: Option<String>,
    current_id: Option<i64>,
) -> CheckResult<String> {
    let name = non_empty(name, ValidationError::MissingScientistName)?;

    let taken: Option<i64> = conn
        .query_row(
            "SELECT id FROM scientists WHERE name = ?1 AND id IS NOT ?2 LIMIT 1",
            (&name, current_id),
            |row| row.get(0),
        )
        .optional()?;

    if taken.is_some() {
        return Err(ValidationError::DuplicateScientistName.into());
    }
    Ok(name)
}

pub fn field_of_study(value: Option<String>) -> Result<String, ValidationError> {
    non_empty(value, ValidationError::MissingFieldOfStudy)
}

pub fn mission_name(value: Option<String>) -> Result<String, ValidationError> {
    non_empty(value, ValidationError::MissingMissionName)
}

/// A mission's scientist must be given and must exist right now.
pub fn scientist_id(conn: &Connection, id: Option<i64>) -> CheckResult<i64> {
    let id = non_zero(id, ValidationError::MissingScientistId)?;
    if !row_exists(conn, "scientists", id)? {
        return Err(ValidationError::UnknownScientist.into());
    }
    Ok(id)
}

/// A mission's planet must be given and must exist right now.
pub fn planet_id(conn: &Connection, id: Option<i64>) -> CheckResult<i64> {
    let id = non_zero(id, ValidationError::MissingPlanetId)?;
    if !row_exists(conn, "planets", id)? {
        return Err(ValidationError::UnknownPlanet.into());
    }
    Ok(id)
}

fn row_exists(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
    // Table names come from the fixed callers above, never from input.
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        [id],
        |row| row.get(0),
    )
}
