//! Demo data for a fresh database.
//!
//! The HTTP API has no way to create planets, so a new installation needs
//! this to be useful. Everything goes through the validated store operations.

use anyhow::{Context, Result};

use crate::db::Database;
use crate::models::*;

const PLANETS: &[(&str, &str, &str)] = &[
    ("Mercury", "77 million km", "Sun"),
    ("Mars", "225 million km", "Sun"),
    ("Kepler-22b", "600 light years", "Kepler-22"),
    ("Proxima Centauri b", "4.2 light years", "Proxima Centauri"),
];

const SCIENTISTS: &[(&str, &str)] = &[
    ("Mae Jemison", "Astronautics"),
    ("Carl Sagan", "Planetary Science"),
    ("Vera Rubin", "Astronomy"),
];

// (mission name, scientist index, planet index)
const MISSIONS: &[(&str, usize, usize)] = &[
    ("Messenger Flyby", 0, 0),
    ("Red Dust Survey", 1, 1),
    ("Habitable Zone Scan", 2, 2),
    ("Nearest Neighbour", 1, 3),
];

/// Counts of inserted rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub scientists: usize,
    pub planets: usize,
    pub missions: usize,
}

/// Insert the demo data set. With `reset`, every existing scientist and
/// planet (and so every mission) is deleted first.
pub fn seed(db: &Database, reset: bool) -> Result<SeedSummary> {
    if reset {
        for scientist in db.get_all_scientists()? {
            db.delete_scientist(scientist.id)?;
        }
        for planet in db.get_all_planets()? {
            db.delete_planet(planet.id)?;
        }
        tracing::info!("Cleared existing records");
    }

    let mut planets = Vec::with_capacity(PLANETS.len());
    for (name, distance, star) in PLANETS {
        let planet = db.create_planet(CreatePlanetInput {
            name: Some(name.to_string()),
            distance_from_earth: Some(distance.to_string()),
            nearest_star: Some(star.to_string()),
            image: None,
        })?;
        planets.push(planet.id);
    }

    let mut scientists = Vec::with_capacity(SCIENTISTS.len());
    for (name, field) in SCIENTISTS {
        let scientist = db
            .create_scientist(CreateScientistInput {
                name: Some(name.to_string()),
                field_of_study: Some(field.to_string()),
                avatar: None,
            })
            .with_context(|| format!("Failed to seed scientist {name}"))?;
        scientists.push(scientist.id);
    }

    for (name, scientist, planet) in MISSIONS {
        db.create_mission(CreateMissionInput {
            name: Some(name.to_string()),
            scientist_id: Some(scientists[*scientist]),
            planet_id: Some(planets[*planet]),
        })?;
    }

    let summary = SeedSummary {
        scientists: scientists.len(),
        planets: planets.len(),
        missions: MISSIONS.len(),
    };
    tracing::info!(?summary, "Seeded database");
    Ok(summary)
}
