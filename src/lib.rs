//! Typhoon - you are the storm
//!
//! An arcade game where the player steers a typhoon that is forced northeast
//! across a 64x64 terrain map, strengthening over ocean and weakening (while
//! racking up casualties) over land and cities.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, footprint sampling, storm state)
//! - `renderer`: CPU frame composition for the pixel playfield
//! - `audio`: Procedural Web Audio sound effects (wasm32 only)
//! - `settings` / `highscores`: LocalStorage-backed preferences and records

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (15 Hz - the game is deliberately chunky)
    pub const SIM_DT: f32 = 1.0 / 15.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Terrain map edge length in pixels (maps are square)
    pub const MAP_SIZE: i32 = 64;
    /// The display canvas shows the map scaled up by this factor
    pub const DISPLAY_SCALE: i32 = 4;

    /// Storm spawn point, just off the lower-left coast
    pub const SPAWN_X: f32 = 1.0;
    pub const SPAWN_Y: f32 = 62.0;
    /// Initial central pressure range (mb)
    pub const SPAWN_PRESSURE_MIN: f32 = 950.0;
    pub const SPAWN_PRESSURE_MAX: f32 = 990.0;

    /// Ambient pressure reference for wind/radius scaling (mb)
    pub const AMBIENT_PRESSURE: f32 = 1013.0;
    /// The storm dissipates once central pressure reaches this
    pub const DISSIPATION_PRESSURE: f32 = 1000.0;
    /// The run ends when `MAP_SIZE - x + y` drops to this diagonal margin
    pub const EXIT_MARGIN: f32 = 5.0;

    /// Gain on the drift field's radial term difference
    pub const FIELD_GAIN: f32 = 10.0;
    /// Fixed +x / -y bias that herds the storm northeast
    pub const FIELD_BIAS: f32 = 0.1;
    /// Uniform jitter amplitude added to each field term
    pub const FIELD_JITTER: f32 = 0.05;
    /// Player steering gain
    pub const STEER_GAIN: f32 = 0.2;

    /// Casualties per tick = floor(city weight * wind * this)
    pub const CASUALTY_RATE: f32 = 0.1;
    /// Scream cue may fire on every Nth phase...
    pub const SCREAM_CADENCE: u32 = 5;
    /// ...when the tick's casualty delta exceeds this
    pub const SCREAM_THRESHOLD: u64 = 2;

    /// Ticks the game-over card stays up before a new run starts (3 s)
    pub const GAME_OVER_HOLD_TICKS: u32 = 45;
}
