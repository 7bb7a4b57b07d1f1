//! Domain models for space-missions.
//!
//! # Entities
//!
//! - [`Scientist`]: a named researcher. Names are unique.
//! - [`Planet`]: a mission destination. No field is required.
//! - [`Mission`]: joins one scientist to one planet. Owned by both, so
//!   deleting either end deletes the mission.
//!
//! # Views
//!
//! Each entity has a `*Summary` with the subset of fields returned by list
//! endpoints, and nested views (`ScientistWithMissions`, `PlanetWithMissions`,
//! `MissionWithRelations`) that expand a relation exactly one level so the
//! serialized graph never cycles back to its root.
//!
//! # Writes
//!
//! `Create*Input` carries a full create. `*Field` enums are the allow-list of
//! attributes a partial update may assign.

mod mission;
mod planet;
mod scientist;

pub use mission::*;
pub use planet::*;
pub use scientist::*;
