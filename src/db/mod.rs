pub(crate) mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{types::Type, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::models::*;
use crate::validation::{self, CheckError, ValidationError};

/// Errors surfaced by store operations.
///
/// `Validation` means a write was refused before reaching the database.
/// `Sqlite` is anything the database itself rejected or failed on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl From<CheckError> for StoreError {
    fn from(e: CheckError) -> Self {
        match e {
            CheckError::Invalid(v) => Self::Validation(v),
            CheckError::Sqlite(s) => Self::Sqlite(s),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

const SCIENTIST_COLUMNS: &str = "id, name, field_of_study, avatar, created_at, updated_at";
const PLANET_COLUMNS: &str =
    "id, name, distance_from_earth, nearest_star, image, created_at, updated_at";
const MISSION_COLUMNS: &str = "id, name, scientist_id, planet_id, created_at, updated_at";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Scientist operations
    // ============================================================

    pub fn get_all_scientists(&self) -> StoreResult<Vec<Scientist>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {SCIENTIST_COLUMNS} FROM scientists ORDER BY id"
        ))?;

        let scientists = stmt
            .query_map([], |row| scientist_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(scientists)
    }

    pub fn get_scientist(&self, id: i64) -> StoreResult<Option<Scientist>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        Ok(find_scientist(&conn, id)?)
    }

    pub fn get_scientist_with_missions(&self, id: i64) -> StoreResult<Option<ScientistWithMissions>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(scientist) = find_scientist(&conn, id)? else {
            return Ok(None);
        };

        let mut missions = Vec::new();
        for mission in find_missions_by(&conn, "scientist_id", id)? {
            match find_planet(&conn, mission.planet_id)? {
                Some(planet) => missions.push(MissionWithPlanet { mission, planet }),
                None => tracing::warn!(id = mission.id, "mission references a missing planet"),
            }
        }

        Ok(Some(ScientistWithMissions {
            scientist,
            missions,
        }))
    }

    /// Validate and insert a scientist. Nothing is written if any field fails.
    pub fn create_scientist(&self, input: CreateScientistInput) -> StoreResult<Scientist> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let name = validation::scientist_name(&conn, input.name, None)?;
        let field_of_study = validation::field_of_study(input.field_of_study)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO scientists (name, field_of_study, avatar, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                &name,
                &field_of_study,
                &input.avatar,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, %name, "created scientist");

        Ok(Scientist {
            id,
            name,
            field_of_study,
            avatar: input.avatar,
            created_at: now,
            updated_at: now,
        })
    }

    /// Assign each field in order, validating as it goes.
    ///
    /// Fields not listed keep their stored values and are not re-validated.
    /// Returns `None` if the scientist does not exist.
    pub fn update_scientist(
        &self,
        id: i64,
        fields: Vec<ScientistField>,
    ) -> StoreResult<Option<Scientist>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(mut scientist) = find_scientist(&conn, id)? else {
            return Ok(None);
        };

        for field in fields {
            match field {
                ScientistField::Name(name) => {
                    scientist.name = validation::scientist_name(&conn, Some(name), Some(id))?;
                }
                ScientistField::FieldOfStudy(value) => {
                    scientist.field_of_study = validation::field_of_study(Some(value))?;
                }
                ScientistField::Avatar(avatar) => scientist.avatar = Some(avatar),
            }
        }

        scientist.updated_at = Utc::now();
        conn.execute(
            "UPDATE scientists SET name = ?, field_of_study = ?, avatar = ?, updated_at = ? WHERE id = ?",
            (
                &scientist.name,
                &scientist.field_of_study,
                &scientist.avatar,
                scientist.updated_at.to_rfc3339(),
                id,
            ),
        )?;

        Ok(Some(scientist))
    }

    /// Delete a scientist and all of their missions in one transaction.
    pub fn delete_scientist(&self, id: i64) -> StoreResult<bool> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let missions = tx.execute("DELETE FROM missions WHERE scientist_id = ?", [id])?;
        let rows = tx.execute("DELETE FROM scientists WHERE id = ?", [id])?;
        if rows == 0 {
            return Ok(false);
        }
        tx.commit()?;

        tracing::debug!(id, missions, "deleted scientist");
        Ok(true)
    }

    // ============================================================
    // Planet operations
    // ============================================================

    pub fn get_all_planets(&self) -> StoreResult<Vec<Planet>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!("SELECT {PLANET_COLUMNS} FROM planets ORDER BY id"))?;

        let planets = stmt
            .query_map([], |row| planet_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(planets)
    }

    pub fn get_planet(&self, id: i64) -> StoreResult<Option<Planet>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        Ok(find_planet(&conn, id)?)
    }

    pub fn get_planet_with_missions(&self, id: i64) -> StoreResult<Option<PlanetWithMissions>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(planet) = find_planet(&conn, id)? else {
            return Ok(None);
        };

        let mut missions = Vec::new();
        for mission in find_missions_by(&conn, "planet_id", id)? {
            match find_scientist(&conn, mission.scientist_id)? {
                Some(scientist) => missions.push(MissionWithScientist { mission, scientist }),
                None => tracing::warn!(id = mission.id, "mission references a missing scientist"),
            }
        }

        Ok(Some(PlanetWithMissions { planet, missions }))
    }

    pub fn create_planet(&self, input: CreatePlanetInput) -> StoreResult<Planet> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "INSERT INTO planets (name, distance_from_earth, nearest_star, image, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                &input.name,
                &input.distance_from_earth,
                &input.nearest_star,
                &input.image,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, "created planet");

        Ok(Planet {
            id,
            name: input.name,
            distance_from_earth: input.distance_from_earth,
            nearest_star: input.nearest_star,
            image: input.image,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_planet(&self, id: i64, fields: Vec<PlanetField>) -> StoreResult<Option<Planet>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(mut planet) = find_planet(&conn, id)? else {
            return Ok(None);
        };

        for field in fields {
            match field {
                PlanetField::Name(v) => planet.name = Some(v),
                PlanetField::DistanceFromEarth(v) => planet.distance_from_earth = Some(v),
                PlanetField::NearestStar(v) => planet.nearest_star = Some(v),
                PlanetField::Image(v) => planet.image = Some(v),
            }
        }

        planet.updated_at = Utc::now();
        conn.execute(
            "UPDATE planets SET name = ?, distance_from_earth = ?, nearest_star = ?, image = ?, updated_at = ?
             WHERE id = ?",
            (
                &planet.name,
                &planet.distance_from_earth,
                &planet.nearest_star,
                &planet.image,
                planet.updated_at.to_rfc3339(),
                id,
            ),
        )?;

        Ok(Some(planet))
    }

    /// Delete a planet and every mission bound for it in one transaction.
    pub fn delete_planet(&self, id: i64) -> StoreResult<bool> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let missions = tx.execute("DELETE FROM missions WHERE planet_id = ?", [id])?;
        let rows = tx.execute("DELETE FROM planets WHERE id = ?", [id])?;
        if rows == 0 {
            return Ok(false);
        }
        tx.commit()?;

        tracing::debug!(id, missions, "deleted planet");
        Ok(true)
    }

    // ============================================================
    // Mission operations
    // ============================================================

    pub fn get_all_missions(&self) -> StoreResult<Vec<Mission>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare(&format!("SELECT {MISSION_COLUMNS} FROM missions ORDER BY id"))?;

        let missions = stmt
            .query_map([], |row| mission_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(missions)
    }

    pub fn get_missions_by_scientist(&self, scientist_id: i64) -> StoreResult<Vec<Mission>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        Ok(find_missions_by(&conn, "scientist_id", scientist_id)?)
    }

    pub fn get_missions_by_planet(&self, planet_id: i64) -> StoreResult<Vec<Mission>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        Ok(find_missions_by(&conn, "planet_id", planet_id)?)
    }

    pub fn get_mission(&self, id: i64) -> StoreResult<Option<Mission>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        Ok(find_mission(&conn, id)?)
    }

    pub fn get_mission_with_relations(&self, id: i64) -> StoreResult<Option<MissionWithRelations>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(mission) = find_mission(&conn, id)? else {
            return Ok(None);
        };

        // Owners can only be missing if rows were removed outside the cascade path
        let (Some(scientist), Some(planet)) = (
            find_scientist(&conn, mission.scientist_id)?,
            find_planet(&conn, mission.planet_id)?,
        ) else {
            tracing::warn!(id, "mission references a missing scientist or planet");
            return Ok(None);
        };

        Ok(Some(MissionWithRelations {
            mission,
            scientist,
            planet,
        }))
    }

    /// Validate and insert a mission.
    ///
    /// Fields are checked in the order name, scientist_id, planet_id and the
    /// first failure is returned.
    pub fn create_mission(&self, input: CreateMissionInput) -> StoreResult<Mission> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let name = validation::mission_name(input.name)?;
        let scientist_id = validation::scientist_id(&conn, input.scientist_id)?;
        let planet_id = validation::planet_id(&conn, input.planet_id)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO missions (name, scientist_id, planet_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                &name,
                scientist_id,
                planet_id,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, scientist_id, planet_id, "created mission");

        Ok(Mission {
            id,
            name,
            scientist_id,
            planet_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_mission(&self, id: i64, fields: Vec<MissionField>) -> StoreResult<Option<Mission>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(mut mission) = find_mission(&conn, id)? else {
            return Ok(None);
        };

        for field in fields {
            match field {
                MissionField::Name(name) => mission.name = validation::mission_name(Some(name))?,
                MissionField::ScientistId(sid) => {
                    mission.scientist_id = validation::scientist_id(&conn, sid)?;
                }
                MissionField::PlanetId(pid) => {
                    mission.planet_id = validation::planet_id(&conn, pid)?;
                }
            }
        }

        mission.updated_at = Utc::now();
        conn.execute(
            "UPDATE missions SET name = ?, scientist_id = ?, planet_id = ?, updated_at = ? WHERE id = ?",
            (
                &mission.name,
                mission.scientist_id,
                mission.planet_id,
                mission.updated_at.to_rfc3339(),
                id,
            ),
        )?;

        Ok(Some(mission))
    }

    pub fn delete_mission(&self, id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM missions WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `<data dir>/space-missions.db` for the current platform.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "space-missions")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("space-missions.db"))
}

fn find_scientist(conn: &Connection, id: i64) -> rusqlite::Result<Option<Scientist>> {
    conn.query_row(
        &format!("SELECT {SCIENTIST_COLUMNS} FROM scientists WHERE id = ?"),
        [id],
        |row| scientist_from_row(row, 0),
    )
    .optional()
}

fn find_planet(conn: &Connection, id: i64) -> rusqlite::Result<Option<Planet>> {
    conn.query_row(
        &format!("SELECT {PLANET_COLUMNS} FROM planets WHERE id = ?"),
        [id],
        |row| planet_from_row(row, 0),
    )
    .optional()
}

fn find_mission(conn: &Connection, id: i64) -> rusqlite::Result<Option<Mission>> {
    conn.query_row(
        &format!("SELECT {MISSION_COLUMNS} FROM missions WHERE id = ?"),
        [id],
        |row| mission_from_row(row, 0),
    )
    .optional()
}

/// Missions whose `owner` column (`scientist_id` or `planet_id`) equals `id`.
fn find_missions_by(conn: &Connection, owner: &'static str, id: i64) -> rusqlite::Result<Vec<Mission>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MISSION_COLUMNS} FROM missions WHERE {owner} = ? ORDER BY id"
    ))?;
    let missions = stmt
        .query_map([id], |row| mission_from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(missions)
}

// Row mappers read columns starting at `at`, so joined rows can be split.

fn scientist_from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Scientist> {
    Ok(Scientist {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        field_of_study: row.get(at + 2)?,
        avatar: row.get(at + 3)?,
        created_at: datetime_at(row, at + 4)?,
        updated_at: datetime_at(row, at + 5)?,
    })
}

fn planet_from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Planet> {
    Ok(Planet {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        distance_from_earth: row.get(at + 2)?,
        nearest_star: row.get(at + 3)?,
        image: row.get(at + 4)?,
        created_at: datetime_at(row, at + 5)?,
        updated_at: datetime_at(row, at + 6)?,
    })
}

fn mission_from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Mission> {
    Ok(Mission {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        scientist_id: row.get(at + 2)?,
        planet_id: row.get(at + 3)?,
        created_at: datetime_at(row, at + 4)?,
        updated_at: datetime_at(row, at + 5)?,
    })
}

/// A stored RFC 3339 timestamp. A malformed value is a conversion error on
/// that column.
fn datetime_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
