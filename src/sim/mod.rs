//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `Game::step` = one tick)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod game;
pub mod physics;
pub mod random;
pub mod schedule;
pub mod scoring;
pub mod spawn;
pub mod state;

pub use collision::{Aabb, CollisionReport, detect};
pub use game::{Game, RestartOutcome};
pub use physics::{Motion, PhysicsConfig, PlayerPhysics};
pub use random::{RandomSource, ScriptedRandom, sample};
pub use schedule::{Task, TaskHandle, TaskRegistry};
pub use scoring::{ScoreController, ScoringRules};
pub use spawn::{GapBounds, SpawnConfig, SpawnGenerator, SpawnLayout};
pub use state::{
    GameEvent, GameOverCause, GameSession, GameStatus, GapWindow, Obstacle, ObstacleView,
    Player, PlayerBox, PowerUp, PowerUpView, Snapshot, Variant,
};
