use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mission::MissionWithPlanet;
use crate::validation::ValidationError;

/// A scientist who can be assigned to missions.
///
/// Names are unique across all scientists. Deleting a scientist deletes
/// every mission assigned to them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scientist {
    pub id: i64,
    pub name: String,
    pub field_of_study: String,
    /// URL of the scientist's portrait.
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields returned by `GET /scientists`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScientistSummary {
    pub id: i64,
    pub name: String,
    pub field_of_study: String,
    pub avatar: Option<String>,
}

impl From<Scientist> for ScientistSummary {
    fn from(s: Scientist) -> Self {
        Self {
            id: s.id,
            name: s.name,
            field_of_study: s.field_of_study,
            avatar: s.avatar,
        }
    }
}

/// A scientist with their missions. Each mission carries its planet but
/// not the scientist again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScientistWithMissions {
    #[serde(flatten)]
    pub scientist: Scientist,
    pub missions: Vec<MissionWithPlanet>,
}

/// Input for creating a new scientist.
///
/// Required fields are optional here so that a missing value reaches the
/// validators and is reported with the same message as an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateScientistInput {
    pub name: Option<String>,
    pub field_of_study: Option<String>,
    pub avatar: Option<String>,
}

/// One assignable scientist attribute. This is the full allow-list for
/// partial updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScientistField {
    Name(String),
    FieldOfStudy(String),
    Avatar(String),
}

impl ScientistField {
    /// Map a submitted `key=value` pair onto an allowed field.
    pub fn parse(key: &str, value: String) -> Result<Self, ValidationError> {
        match key {
            "name" => Ok(Self::Name(value)),
            "field_of_study" => Ok(Self::FieldOfStudy(value)),
            "avatar" => Ok(Self::Avatar(value)),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }

    /// Parse every pair in submission order, stopping at the first unknown key.
    pub fn parse_all(
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Vec<Self>, ValidationError> {
        pairs
            .into_iter()
            .map(|(key, value)| Self::parse(&key, value))
            .collect()
    }
}
