//! Bus Arcade - simulation engine for the two bus minigames
//!
//! Core modules:
//! - `sim`: Deterministic fixed-step simulation (physics, spawning, collisions, scoring)
//! - `settings`: Tunables and their validation into a per-session config
//! - `persistence`: Key-value storage backends
//! - `highscores`: Durable high score on top of `persistence`
//! - `platform`: Logging setup and the wall-clock tick driver

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, StoreError, TransitionError};
pub use highscores::HighScoreGateway;
pub use settings::{ArcadeConfig, GameMode, SessionConfig};
pub use sim::{Game, GameStatus, Snapshot};

/// Reference tunables (defaults for `ArcadeConfig`)
pub mod consts {
    /// Fixed simulation period in milliseconds (~33 Hz)
    pub const TICK_MS: u32 = 30;

    /// Playfield dimensions (screen-space units)
    pub const WORLD_WIDTH: f32 = 400.0;
    pub const WORLD_HEIGHT: f32 = 800.0;

    /// Score needed per speed tier
    pub const SPEED_THRESHOLD: u64 = 100;
    /// Speed added per tier
    pub const SPEED_STEP: f32 = 1.0;
    /// Power-up multiplier window
    pub const MULTIPLIER_MS: u32 = 5000;

    /// Flight mode
    pub const FLIGHT_PLAYER_X: f32 = 20.0;
    pub const FLIGHT_PLAYER_SIZE: f32 = 40.0;
    pub const FLIGHT_GRAVITY: f32 = 4.0;
    pub const FLIGHT_BOOST: f32 = 8.0;
    pub const BARRIER_WIDTH: f32 = 80.0;
    pub const GAP_SIZE: f32 = 190.0;
    pub const GAP_MIN_Y: f32 = 120.0;
    pub const GAP_MAX_Y: f32 = WORLD_HEIGHT - GAP_SIZE - 120.0;
    pub const FLIGHT_BASE_SPEED: f32 = 5.0;

    /// Runner mode
    pub const RUNNER_PLAYER_X: f32 = 20.0;
    pub const RUNNER_PLAYER_WIDTH: f32 = 120.0;
    pub const RUNNER_PLAYER_HEIGHT: f32 = 80.0;
    pub const GROUND_Y: f32 = WORLD_HEIGHT - 160.0;
    pub const JUMP_APEX: f32 = 250.0;
    /// Duration of one jump phase (ascend or descend)
    pub const JUMP_PHASE_MS: u32 = 400;
    /// Double-jump rule
    pub const MAX_JUMPS: u8 = 2;
    pub const OBSTACLE_MIN_SIZE: f32 = 30.0;
    pub const OBSTACLE_MAX_SIZE: f32 = 80.0;
    pub const RUNNER_BASE_SPEED: f32 = 10.0;
    pub const RUNNER_SPEED_JITTER: f32 = 3.0;
    pub const POWER_UP_SIZE: f32 = 40.0;

    /// Spawn timers
    pub const OBSTACLE_INTERVAL_MS: u32 = 2000;
    pub const POWER_UP_INTERVAL_MS: u32 = 10_000;
}

/// Convert a millisecond duration to whole ticks (floored, never zero)
#[inline]
pub fn ms_to_ticks(ms: u32, tick_ms: u32) -> u64 {
    (u64::from(ms) / u64::from(tick_ms.max(1))).max(1)
}
