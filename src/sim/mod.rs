//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (passed in, never created here)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod terrain;
pub mod tick;

pub use collision::{FootprintTally, sample_footprint};
pub use state::{GameEvent, GameState, Scene, StepReport, Storm};
pub use terrain::{Terrain, TerrainMap};
pub use tick::{TickInput, tick};
