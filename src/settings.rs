//! Game tunables
//!
//! `ArcadeConfig` is the user-facing, serializable form. Every field has a
//! reference default. A `Game` is only ever built from a validated
//! `SessionConfig`, so malformed bounds fail here rather than mid-session.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::ms_to_ticks;
use crate::sim::physics::PhysicsConfig;
use crate::sim::spawn::{GapBounds, SpawnConfig, SpawnLayout};
use crate::sim::scoring::ScoringRules;
use crate::sim::state::PlayerBox;

/// Which minigame a session plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Vertical avoidance through gap pairs
    #[default]
    Flight,
    /// Ground runner with jumps and power-ups
    Runner,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Flight => "flight",
            GameMode::Runner => "runner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flight" | "flappy" => Some(GameMode::Flight),
            "runner" | "run" => Some(GameMode::Runner),
            _ => None,
        }
    }
}

/// Inclusive float range used for random draws
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score per speed tier
    pub speed_threshold: u64,
    /// Speed added per tier
    pub speed_step: f32,
    /// Power-up multiplier window
    pub multiplier_ms: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            speed_threshold: SPEED_THRESHOLD,
            speed_step: SPEED_STEP,
            multiplier_ms: MULTIPLIER_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub player_x: f32,
    pub player_size: f32,
    /// Downward movement per tick while not pressing
    pub gravity: f32,
    /// Upward movement per tick while pressing
    pub boost: f32,
    pub barrier_width: f32,
    pub gap_size: f32,
    /// Range of the gap's top edge
    pub gap_start: Bounds,
    pub obstacle_interval_ms: u32,
    pub base_speed: f32,
    /// Added to the difficulty speed of each new barrier pair
    pub speed_jitter: Bounds,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            player_x: FLIGHT_PLAYER_X,
            player_size: FLIGHT_PLAYER_SIZE,
            gravity: FLIGHT_GRAVITY,
            boost: FLIGHT_BOOST,
            barrier_width: BARRIER_WIDTH,
            gap_size: GAP_SIZE,
            gap_start: Bounds::new(GAP_MIN_Y, GAP_MAX_Y),
            obstacle_interval_ms: OBSTACLE_INTERVAL_MS,
            base_speed: FLIGHT_BASE_SPEED,
            speed_jitter: Bounds::new(0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Screen-space y of the ground line
    pub ground_y: f32,
    pub jump_apex: f32,
    pub jump_phase_ms: u32,
    pub max_jumps: u8,
    pub obstacle_interval_ms: u32,
    pub obstacle_size: Bounds,
    pub base_speed: f32,
    pub speed_jitter: Bounds,
    pub power_up_interval_ms: u32,
    pub power_up_size: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            player_x: RUNNER_PLAYER_X,
            player_width: RUNNER_PLAYER_WIDTH,
            player_height: RUNNER_PLAYER_HEIGHT,
            ground_y: GROUND_Y,
            jump_apex: JUMP_APEX,
            jump_phase_ms: JUMP_PHASE_MS,
            max_jumps: MAX_JUMPS,
            obstacle_interval_ms: OBSTACLE_INTERVAL_MS,
            obstacle_size: Bounds::new(OBSTACLE_MIN_SIZE, OBSTACLE_MAX_SIZE),
            base_speed: RUNNER_BASE_SPEED,
            speed_jitter: Bounds::new(0.0, RUNNER_SPEED_JITTER),
            power_up_interval_ms: POWER_UP_INTERVAL_MS,
            power_up_size: POWER_UP_SIZE,
        }
    }
}

/// All tunables for both minigames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub tick_ms: u32,
    pub world: WorldConfig,
    pub scoring: ScoringConfig,
    pub flight: FlightConfig,
    pub runner: RunnerConfig,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            world: WorldConfig::default(),
            scoring: ScoringConfig::default(),
            flight: FlightConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

/// Validated, tick-based parameters for one game mode
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub tick_ms: u32,
    pub world: WorldConfig,
    pub player: PlayerBox,
    pub physics: PhysicsConfig,
    pub spawn: SpawnConfig,
    pub scoring: ScoringRules,
}

impl ArcadeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load tunables from a JSON file; missing fields take their defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_json(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_json(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Validate the tunables for `mode` and convert durations to ticks
    pub fn session(&self, mode: GameMode) -> Result<SessionConfig, ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;

        let scoring = &self.scoring;
        if scoring.speed_threshold < 2 {
            return Err(ConfigError::ThresholdTooSmall(scoring.speed_threshold));
        }
        non_negative("scoring.speed_step", scoring.speed_step)?;
        let multiplier_ticks = self.ticks("scoring.multiplier_ms", scoring.multiplier_ms)?;

        match mode {
            GameMode::Flight => self.flight_session(multiplier_ticks),
            GameMode::Runner => self.runner_session(multiplier_ticks),
        }
    }

    fn flight_session(&self, multiplier_ticks: u64) -> Result<SessionConfig, ConfigError> {
        let f = &self.flight;
        let world = self.world;
        non_negative("flight.player_x", f.player_x)?;
        positive("flight.player_size", f.player_size)?;
        positive("flight.gravity", f.gravity)?;
        positive("flight.boost", f.boost)?;
        positive("flight.barrier_width", f.barrier_width)?;
        positive("flight.gap_size", f.gap_size)?;
        positive("flight.base_speed", f.base_speed)?;
        range("flight.gap_start", f.gap_start)?;
        range("flight.speed_jitter", f.speed_jitter)?;
        non_negative("flight.speed_jitter.min", f.speed_jitter.min)?;

        if f.player_size >= world.height {
            return Err(ConfigError::PlayerOutOfWorld { what: "height" });
        }
        if f.gap_size <= f.player_size {
            return Err(ConfigError::GapTooSmall {
                gap: f.gap_size,
                player: f.player_size,
            });
        }
        if f.gap_start.min < 0.0 || f.gap_start.max + f.gap_size > world.height {
            return Err(ConfigError::GapOutOfWorld {
                min_y: f.gap_start.min,
                max_y: f.gap_start.max,
                size: f.gap_size,
                height: world.height,
            });
        }

        let floor_y = world.height - f.player_size;
        Ok(SessionConfig {
            mode: GameMode::Flight,
            tick_ms: self.tick_ms,
            world,
            player: PlayerBox {
                x: f.player_x,
                width: f.player_size,
                height: f.player_size,
            },
            physics: PhysicsConfig::Flight {
                gravity: f.gravity,
                boost: f.boost,
                start_y: (world.height / 2.0).min(floor_y),
                floor_y,
            },
            spawn: SpawnConfig {
                spawn_x: world.width,
                obstacle_interval_ticks: self
                    .ticks("flight.obstacle_interval_ms", f.obstacle_interval_ms)?,
                speed_jitter: f.speed_jitter,
                layout: SpawnLayout::GapPairs {
                    barrier_width: f.barrier_width,
                    gap: GapBounds {
                        min_y: f.gap_start.min,
                        max_y: f.gap_start.max,
                        size: f.gap_size,
                    },
                    world_height: world.height,
                },
            },
            scoring: ScoringRules {
                threshold: self.scoring.speed_threshold,
                step: self.scoring.speed_step,
                base_speed: f.base_speed,
                multiplier_ticks,
            },
        })
    }

    fn runner_session(&self, multiplier_ticks: u64) -> Result<SessionConfig, ConfigError> {
        let r = &self.runner;
        let world = self.world;
        non_negative("runner.player_x", r.player_x)?;
        positive("runner.player_width", r.player_width)?;
        positive("runner.player_height", r.player_height)?;
        positive("runner.ground_y", r.ground_y)?;
        positive("runner.jump_apex", r.jump_apex)?;
        positive("runner.base_speed", r.base_speed)?;
        positive("runner.power_up_size", r.power_up_size)?;
        positive("runner.obstacle_size.min", r.obstacle_size.min)?;
        range("runner.obstacle_size", r.obstacle_size)?;
        range("runner.speed_jitter", r.speed_jitter)?;
        non_negative("runner.speed_jitter.min", r.speed_jitter.min)?;
        if r.max_jumps == 0 {
            return Err(ConfigError::NoJumps);
        }

        if r.ground_y > world.height {
            return Err(ConfigError::PlayerOutOfWorld { what: "ground line" });
        }
        let baseline_y = r.ground_y - r.player_height;
        if baseline_y - r.jump_apex < 0.0 {
            return Err(ConfigError::PlayerOutOfWorld { what: "jump apex" });
        }
        if r.obstacle_size.max > r.ground_y || r.power_up_size > r.ground_y {
            return Err(ConfigError::PlayerOutOfWorld {
                what: "spawn size above ground line",
            });
        }

        Ok(SessionConfig {
            mode: GameMode::Runner,
            tick_ms: self.tick_ms,
            world,
            player: PlayerBox {
                x: r.player_x,
                width: r.player_width,
                height: r.player_height,
            },
            physics: PhysicsConfig::Runner {
                baseline_y,
                apex: r.jump_apex,
                phase_ticks: self.ticks("runner.jump_phase_ms", r.jump_phase_ms)?,
                max_jumps: r.max_jumps,
            },
            spawn: SpawnConfig {
                spawn_x: world.width,
                obstacle_interval_ticks: self
                    .ticks("runner.obstacle_interval_ms", r.obstacle_interval_ms)?,
                speed_jitter: r.speed_jitter,
                layout: SpawnLayout::Ground {
                    ground_y: r.ground_y,
                    size: r.obstacle_size,
                    power_up_interval_ticks: self
                        .ticks("runner.power_up_interval_ms", r.power_up_interval_ms)?,
                    power_up_size: r.power_up_size,
                },
            },
            scoring: ScoringRules {
                threshold: self.scoring.speed_threshold,
                step: self.scoring.speed_step,
                base_speed: r.base_speed,
                multiplier_ticks,
            },
        })
    }

    fn ticks(&self, field: &'static str, ms: u32) -> Result<u64, ConfigError> {
        if ms < self.tick_ms {
            return Err(ConfigError::ShorterThanTick {
                field,
                value: ms,
                tick_ms: self.tick_ms,
            });
        }
        Ok(ms_to_ticks(ms, self.tick_ms))
    }
}

fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if finite(field, value)? > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if finite(field, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn range(field: &'static str, bounds: Bounds) -> Result<Bounds, ConfigError> {
    finite(field, bounds.min)?;
    finite(field, bounds.max)?;
    if bounds.min > bounds.max {
        return Err(ConfigError::InvertedRange {
            field,
            min: bounds.min,
            max: bounds.max,
        });
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate_for_both_modes() {
        let config = ArcadeConfig::default();
        let flight = config.session(GameMode::Flight).unwrap();
        let runner = config.session(GameMode::Runner).unwrap();
        assert_eq!(flight.scoring.multiplier_ticks, 166);
        assert_eq!(flight.spawn.obstacle_interval_ticks, 66);
        match runner.physics {
            PhysicsConfig::Runner { phase_ticks, baseline_y, .. } => {
                assert_eq!(phase_ticks, 13);
                assert_eq!(baseline_y, GROUND_Y - RUNNER_PLAYER_HEIGHT);
            }
            _ => panic!("runner mode must use the runner model"),
        }
    }

    #[test]
    fn test_inverted_size_range_rejected() {
        let mut config = ArcadeConfig::default();
        config.runner.obstacle_size = Bounds::new(80.0, 30.0);
        assert!(matches!(
            config.session(GameMode::Runner),
            Err(ConfigError::InvertedRange { .. })
        ));
        // Flight does not read runner tunables
        assert!(config.session(GameMode::Flight).is_ok());
    }

    #[test]
    fn test_gap_must_fit_world() {
        let mut config = ArcadeConfig::default();
        config.flight.gap_start = Bounds::new(120.0, 700.0);
        assert!(matches!(
            config.session(GameMode::Flight),
            Err(ConfigError::GapOutOfWorld { .. })
        ));

        let mut config = ArcadeConfig::default();
        config.flight.gap_size = 30.0;
        assert!(matches!(
            config.session(GameMode::Flight),
            Err(ConfigError::GapTooSmall { .. })
        ));
    }

    #[test]
    fn test_nan_and_degenerate_values_rejected() {
        let mut config = ArcadeConfig::default();
        config.flight.gravity = f32::NAN;
        assert!(matches!(
            config.session(GameMode::Flight),
            Err(ConfigError::NotFinite { .. })
        ));

        let mut config = ArcadeConfig::default();
        config.runner.obstacle_size = Bounds::new(0.0, 10.0);
        assert!(config.session(GameMode::Runner).is_err());

        let mut config = ArcadeConfig::default();
        config.scoring.speed_threshold = 1;
        assert_eq!(
            config.session(GameMode::Runner),
            Err(ConfigError::ThresholdTooSmall(1))
        );

        let mut config = ArcadeConfig::default();
        config.tick_ms = 0;
        assert_eq!(config.session(GameMode::Flight), Err(ConfigError::ZeroTick));
    }

    #[test]
    fn test_interval_shorter_than_tick_rejected() {
        let mut config = ArcadeConfig::default();
        config.runner.power_up_interval_ms = 10;
        assert!(matches!(
            config.session(GameMode::Runner),
            Err(ConfigError::ShorterThanTick { .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ArcadeConfig::from_json_str(r#"{ "tick_ms": 20, "runner": { "jump_apex": 200.0 } }"#)
            .unwrap();
        assert_eq!(config.tick_ms, 20);
        assert_eq!(config.runner.jump_apex, 200.0);
        assert_eq!(config.runner.max_jumps, MAX_JUMPS);
        assert_eq!(config.flight, FlightConfig::default());

        let json = config.to_json_string().unwrap();
        assert_eq!(ArcadeConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(GameMode::from_str("Runner"), Some(GameMode::Runner));
        assert_eq!(GameMode::from_str("flappy"), Some(GameMode::Flight));
        assert_eq!(GameMode::from_str("chess"), None);
    }
}
