use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mission::MissionWithScientist;
use crate::validation::ValidationError;

/// A planet that missions can be sent to.
///
/// Every descriptive field is optional and no validators run on planet
/// writes. Deleting a planet deletes every mission bound for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Planet {
    pub id: i64,
    pub name: Option<String>,
    /// Free-form distance, e.g. `"4.2 light years"`.
    pub distance_from_earth: Option<String>,
    pub nearest_star: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields returned by `GET /planets` and by a successful `POST /missions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanetSummary {
    pub id: i64,
    pub name: Option<String>,
    pub distance_from_earth: Option<String>,
    pub nearest_star: Option<String>,
    pub image: Option<String>,
}

impl From<Planet> for PlanetSummary {
    fn from(p: Planet) -> Self {
        Self {
            id: p.id,
            name: p.name,
            distance_from_earth: p.distance_from_earth,
            nearest_star: p.nearest_star,
            image: p.image,
        }
    }
}

/// A planet with its missions. Each mission carries its scientist but not
/// the planet again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetWithMissions {
    #[serde(flatten)]
    pub planet: Planet,
    pub missions: Vec<MissionWithScientist>,
}

/// Input for creating a new planet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlanetInput {
    pub name: Option<String>,
    pub distance_from_earth: Option<String>,
    pub nearest_star: Option<String>,
    pub image: Option<String>,
}

/// Allow-list of assignable planet attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanetField {
    Name(String),
    DistanceFromEarth(String),
    NearestStar(String),
    Image(String),
}

impl PlanetField {
    pub fn parse(key: &str, value: String) -> Result<Self, ValidationError> {
        match key {
            "name" => Ok(Self::Name(value)),
            "distance_from_earth" => Ok(Self::DistanceFromEarth(value)),
            "nearest_star" => Ok(Self::NearestStar(value)),
            "image" => Ok(Self::Image(value)),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}
