//! Error types

use thiserror::Error;

use crate::sim::GameStatus;

/// A setting that cannot produce a valid session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} range is inverted ({min} > {max})")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("gap window [{min_y}, {max_y} + {size}] does not fit a world of height {height}")]
    GapOutOfWorld {
        min_y: f32,
        max_y: f32,
        size: f32,
        height: f32,
    },
    #[error("gap size {gap} leaves no room for a player of height {player}")]
    GapTooSmall { gap: f32, player: f32 },
    #[error("{field} must be at least one tick ({tick_ms} ms), got {value} ms")]
    ShorterThanTick {
        field: &'static str,
        value: u32,
        tick_ms: u32,
    },
    #[error("tick period must be at least 1 ms")]
    ZeroTick,
    #[error("speed threshold must be at least 2, got {0}")]
    ThresholdTooSmall(u64),
    #[error("max concurrent jumps must be at least 1")]
    NoJumps,
    #[error("player does not fit the world ({what})")]
    PlayerOutOfWorld { what: &'static str },
    #[error("invalid config file: {0}")]
    Parse(String),
    #[error("config I/O failed: {0}")]
    Io(String),
}

/// Storage backend failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage data is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Session control requested from the wrong state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {from:?}")]
pub struct TransitionError {
    pub action: &'static str,
    pub from: GameStatus,
}
