use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::planet::Planet;
use super::scientist::Scientist;
use crate::validation::ValidationError;

/// A scientist assigned to a planet.
///
/// Missions are the join between scientists and planets. Nothing prevents the
/// same scientist/planet pair from appearing more than once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mission {
    pub id: i64,
    pub name: String,
    pub scientist_id: i64,
    pub planet_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields returned by `GET /missions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionSummary {
    pub id: i64,
    pub name: String,
    pub scientist_id: i64,
    pub planet_id: i64,
}

impl From<Mission> for MissionSummary {
    fn from(m: Mission) -> Self {
        Self {
            id: m.id,
            name: m.name,
            scientist_id: m.scientist_id,
            planet_id: m.planet_id,
        }
    }
}

/// A mission nested under its scientist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionWithPlanet {
    #[serde(flatten)]
    pub mission: Mission,
    pub planet: Planet,
}

/// A mission nested under its planet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionWithScientist {
    #[serde(flatten)]
    pub mission: Mission,
    pub scientist: Scientist,
}

/// A mission with both ends of the relation expanded one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionWithRelations {
    #[serde(flatten)]
    pub mission: Mission,
    pub scientist: Scientist,
    pub planet: Planet,
}

/// Input for creating a new mission.
///
/// `None` and `Some(0)` ids are both treated as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMissionInput {
    pub name: Option<String>,
    pub scientist_id: Option<i64>,
    pub planet_id: Option<i64>,
}

/// Allow-list of assignable mission attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissionField {
    Name(String),
    ScientistId(Option<i64>),
    PlanetId(Option<i64>),
}

impl MissionField {
    pub fn parse(key: &str, value: String) -> Result<Self, ValidationError> {
        match key {
            "name" => Ok(Self::Name(value)),
            "scientist_id" => parse_id("scientist_id", &value).map(Self::ScientistId),
            "planet_id" => parse_id("planet_id", &value).map(Self::PlanetId),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// Parse a submitted foreign key. Blank input is treated as absent so the
/// referential validators can report it as missing.
pub fn parse_id(field: &'static str, value: &str) -> Result<Option<i64>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ValidationError::NotAnInteger(field))
}
