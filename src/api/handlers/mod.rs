use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::extract::{FormFields, ScientistId};
use crate::db::{Database, StoreError};
use crate::models::*;
use crate::validation::ValidationError;

// ============================================================
// Error Handling
// ============================================================

/// Every failure a handler can return.
///
/// Store failures of any kind become `Unprocessable`: a rejected write is the
/// client's to fix, and anything the database refused is reported with its own
/// message rather than as an opaque server error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Unprocessable(String),
}

impl ApiError {
    pub const SCIENTIST_NOT_FOUND: Self = Self::NotFound("Scientist not found");
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        tracing::warn!("Validation error: {}", e);
        Self::Unprocessable(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(v) => v.into(),
            StoreError::Sqlite(s) => {
                tracing::error!("Store error: {}", s);
                Self::Unprocessable(s.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            Self::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": [msg] })),
            )
                .into_response(),
        }
    }
}

// ============================================================
// Index
// ============================================================

pub async fn index() -> impl IntoResponse {
    Json(json!({ "message": "Hello Scientists!" }))
}

// ============================================================
// Scientists
// ============================================================

pub async fn list_scientists(
    State(db): State<Database>,
) -> Result<Json<Vec<ScientistSummary>>, ApiError> {
    let scientists = db.get_all_scientists()?;
    Ok(Json(scientists.into_iter().map(Into::into).collect()))
}

pub async fn get_scientist(
    State(db): State<Database>,
    ScientistId(id): ScientistId,
) -> Result<Json<ScientistWithMissions>, ApiError> {
    db.get_scientist_with_missions(id)?
        .map(Json)
        .ok_or(ApiError::SCIENTIST_NOT_FOUND)
}

impl From<FormFields> for CreateScientistInput {
    fn from(form: FormFields) -> Self {
        Self {
            name: form.first("name"),
            field_of_study: form.first("field_of_study"),
            avatar: form.first("avatar"),
        }
    }
}

pub async fn create_scientist(
    State(db): State<Database>,
    form: FormFields,
) -> Result<(StatusCode, Json<ScientistWithMissions>), ApiError> {
    let scientist = db.create_scientist(form.into())?;
    Ok((
        StatusCode::CREATED,
        Json(ScientistWithMissions {
            scientist,
            missions: Vec::new(),
        }),
    ))
}

/// Assign each submitted form field, in submission order.
///
/// Only allow-listed fields are accepted; an unknown key rejects the whole
/// request before anything is written. A repeated key is assigned once, with
/// its first value.
pub async fn update_scientist(
    State(db): State<Database>,
    ScientistId(id): ScientistId,
    form: FormFields,
) -> Result<(StatusCode, Json<ScientistWithMissions>), ApiError> {
    db.get_scientist(id)?.ok_or(ApiError::SCIENTIST_NOT_FOUND)?;

    let fields = ScientistField::parse_all(form.into_distinct())?;
    let scientist = db
        .update_scientist(id, fields)?
        .ok_or(ApiError::SCIENTIST_NOT_FOUND)?;

    // The update is committed; respond with it even if the row is gone by now
    let missions = db
        .get_scientist_with_missions(id)?
        .map(|s| s.missions)
        .unwrap_or_default();

    Ok((
        StatusCode::CREATED,
        Json(ScientistWithMissions {
            scientist,
            missions,
        }),
    ))
}

pub async fn delete_scientist(
    State(db): State<Database>,
    ScientistId(id): ScientistId,
) -> Result<Json<serde_json::Value>, ApiError> {
    if db.delete_scientist(id)? {
        Ok(Json(json!({ "message": "Record successfully deleted" })))
    } else {
        Err(ApiError::SCIENTIST_NOT_FOUND)
    }
}

// ============================================================
// Planets
// ============================================================

pub async fn list_planets(State(db): State<Database>) -> Result<Json<Vec<PlanetSummary>>, ApiError> {
    let planets = db.get_all_planets()?;
    Ok(Json(planets.into_iter().map(Into::into).collect()))
}

// ============================================================
// Missions
// ============================================================

pub async fn list_missions(
    State(db): State<Database>,
) -> Result<Json<Vec<MissionSummary>>, ApiError> {
    let missions = db.get_all_missions()?;
    Ok(Json(missions.into_iter().map(Into::into).collect()))
}

/// Ids arrive as text and are parsed before any validator runs.
impl TryFrom<FormFields> for CreateMissionInput {
    type Error = ValidationError;

    fn try_from(form: FormFields) -> Result<Self, Self::Error> {
        let scientist_id = match form.first("scientist_id") {
            Some(v) => parse_id("scientist_id", &v)?,
            None => None,
        };
        let planet_id = match form.first("planet_id") {
            Some(v) => parse_id("planet_id", &v)?,
            None => None,
        };
        Ok(Self {
            name: form.first("name"),
            scientist_id,
            planet_id,
        })
    }
}

/// Create a mission and respond with the planet it is bound for.
pub async fn create_mission(
    State(db): State<Database>,
    form: FormFields,
) -> Result<(StatusCode, Json<PlanetSummary>), ApiError> {
    let input = CreateMissionInput::try_from(form)?;
    let mission = db.create_mission(input)?;

    let planet = db
        .get_planet(mission.planet_id)?
        .ok_or(ValidationError::UnknownPlanet)?;
    Ok((StatusCode::CREATED, Json(planet.into())))
}
