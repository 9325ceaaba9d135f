//! Simulation data model
//!
//! Entities, the per-session counters, the read-only snapshot handed to
//! renderers, and the event stream.

use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::schedule::TaskHandle;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameStatus {
    /// Before the first session
    #[default]
    Idle,
    /// Ticks and timers are live
    Running,
    /// Session ended; waiting for restart
    GameOver,
}

/// Player footprint (x is fixed for the whole session)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBox {
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

/// The player. `y` is the top edge in screen space (grows downward).
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub y: f32,
    pub bounds: PlayerBox,
}

impl Player {
    pub fn new(bounds: PlayerBox, y: f32) -> Self {
        Self { y, bounds }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_rect(self.bounds.x, self.y, self.bounds.width, self.bounds.height)
    }
}

/// Visual variant of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Tree,
    Pedestrian,
    Cone,
    /// Upper half of a gap pair
    BarrierTop,
    /// Lower half of a gap pair
    BarrierBottom,
}

impl Variant {
    /// Ground obstacles a runner spawn picks from
    pub const GROUND: [Variant; 3] = [Variant::Tree, Variant::Pedestrian, Variant::Cone];
}

/// Vertical passable interval `[start, start + size)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapWindow {
    pub start: f32,
    pub size: f32,
}

impl GapWindow {
    #[inline]
    pub fn end(&self) -> f32 {
        self.start + self.size
    }
}

/// A moving obstacle. Barriers of one gap pair share `gap` and `speed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Horizontal movement per tick, fixed at spawn
    pub speed: f32,
    pub variant: Variant,
    /// Tick the obstacle was created on (ordering only)
    pub spawned_tick: u64,
    /// Set for flight barriers
    pub gap: Option<GapWindow>,
}

impl Obstacle {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_rect(self.x, self.y, self.width, self.height)
    }

    /// Trailing edge has crossed the leading screen boundary
    #[inline]
    pub fn is_off_screen(&self) -> bool {
        self.x + self.width <= 0.0
    }
}

/// Runner-mode pickup that doubles score accrual for a while
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub spawned_tick: u64,
}

impl PowerUp {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_rect(self.x, self.y, self.width, self.height)
    }

    #[inline]
    pub fn is_off_screen(&self) -> bool {
        self.x + self.width <= 0.0
    }
}

/// Active score multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplier {
    /// Tick on which the expiry task fires
    pub expires_at: u64,
    pub handle: TaskHandle,
}

/// Counters for one session
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub score: u64,
    pub difficulty_speed: f32,
    pub multiplier: Option<Multiplier>,
    pub status: GameStatus,
}

impl GameSession {
    /// A session that has not started yet
    pub fn idle(base_speed: f32) -> Self {
        Self {
            score: 0,
            difficulty_speed: base_speed,
            multiplier: None,
            status: GameStatus::Idle,
        }
    }

    pub fn running(base_speed: f32) -> Self {
        Self {
            status: GameStatus::Running,
            ..Self::idle(base_speed)
        }
    }

    #[inline]
    pub fn multiplier_active(&self) -> bool {
        self.multiplier.is_some()
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameOverCause {
    Collision { obstacle_id: u32 },
    OutOfBounds,
}

/// Notable things that happened during a step, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    SessionStarted,
    ObstacleSpawned { id: u32 },
    PowerUpSpawned { id: u32 },
    PowerUpCollected { id: u32, expires_at: u64 },
    MultiplierExpired,
    JumpStarted { jump_id: u32 },
    JumpLanded { jump_id: u32 },
    SpeedRaised { speed: f32 },
    GameOver { cause: GameOverCause, score: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub variant: Variant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUpView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Read-only view of the simulation, refreshed once per step
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Snapshot {
    pub tick: u64,
    pub player_y: f32,
    pub obstacles: Vec<ObstacleView>,
    pub power_ups: Vec<PowerUpView>,
    pub score: u64,
    pub high_score: u64,
    pub multiplier_active: bool,
    pub difficulty_speed: f32,
    pub jumps_in_flight: u8,
    pub status: GameStatus,
}

impl From<&Obstacle> for ObstacleView {
    fn from(o: &Obstacle) -> Self {
        Self {
            id: o.id,
            x: o.x,
            y: o.y,
            width: o.width,
            height: o.height,
            variant: o.variant,
        }
    }
}

impl From<&PowerUp> for PowerUpView {
    fn from(p: &PowerUp) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
            width: p.width,
            height: p.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_window_end() {
        let gap = GapWindow {
            start: 200.0,
            size: 190.0,
        };
        assert_eq!(gap.end(), 390.0);
    }

    #[test]
    fn test_off_screen_at_zero_trailing_edge() {
        let mut obstacle = Obstacle {
            id: 1,
            x: -49.0,
            y: 0.0,
            width: 50.0,
            height: 50.0,
            speed: 10.0,
            variant: Variant::Cone,
            spawned_tick: 0,
            gap: None,
        };
        assert!(!obstacle.is_off_screen());
        obstacle.x = -50.0;
        assert!(obstacle.is_off_screen());
    }
}
