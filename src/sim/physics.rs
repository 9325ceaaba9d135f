//! Player motion models
//!
//! Flight: level-triggered boost against constant gravity, clamped to the
//! screen. Runner: discrete jump arcs on a fixed timeline, at most
//! `max_jumps` in flight. Both only ever write `Player::y`.

use super::state::Player;

/// Validated parameters of the motion model for one mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsConfig {
    Flight {
        gravity: f32,
        boost: f32,
        start_y: f32,
        /// Largest allowed top edge
        floor_y: f32,
    },
    Runner {
        /// Top edge while standing on the ground
        baseline_y: f32,
        apex: f32,
        /// Ticks spent ascending (and again descending)
        phase_ticks: u64,
        max_jumps: u8,
    },
}

/// Result of one physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    InBounds,
    /// Player touched the top or bottom limit (flight only)
    OutOfBounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightModel {
    gravity: f32,
    boost: f32,
    start_y: f32,
    floor_y: f32,
    pressing: bool,
}

impl FlightModel {
    fn step(&mut self, player: &mut Player) -> Motion {
        if self.pressing {
            player.y -= self.boost;
        } else {
            player.y += self.gravity;
        }

        if player.y <= 0.0 {
            player.y = 0.0;
            Motion::OutOfBounds
        } else if player.y >= self.floor_y {
            player.y = self.floor_y;
            Motion::OutOfBounds
        } else {
            Motion::InBounds
        }
    }
}

/// One jump arc in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub id: u32,
    /// First tick the arc applies to
    pub started_at: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerModel {
    baseline_y: f32,
    apex: f32,
    phase_ticks: u64,
    max_jumps: u8,
    jumps: Vec<Jump>,
    next_jump_id: u32,
}

impl RunnerModel {
    /// Ticks from activation until the jump lands
    pub fn jump_ticks(&self) -> u64 {
        self.phase_ticks * 2
    }

    pub fn in_flight(&self) -> u8 {
        self.jumps.len() as u8
    }

    /// Start a jump unless the double-jump limit is reached
    fn try_jump(&mut self, now: u64) -> Option<Jump> {
        if self.jumps.len() >= usize::from(self.max_jumps) {
            return None;
        }
        let jump = Jump {
            id: self.next_jump_id,
            started_at: now,
        };
        self.next_jump_id = self.next_jump_id.wrapping_add(1);
        self.jumps.push(jump);
        Some(jump)
    }

    fn land(&mut self, jump_id: u32) -> bool {
        let before = self.jumps.len();
        self.jumps.retain(|j| j.id != jump_id);
        self.jumps.len() != before
    }

    /// Height of one arc after `elapsed` ticks
    fn arc_height(&self, elapsed: u64) -> f32 {
        let phase = self.phase_ticks as f32;
        let e = elapsed as f32;
        if elapsed <= self.phase_ticks {
            self.apex * e / phase
        } else if elapsed <= self.jump_ticks() {
            self.apex * (2.0 * phase - e) / phase
        } else {
            0.0
        }
    }

    /// Height above baseline on `tick`; overlapping arcs take the higher one
    pub fn height_at(&self, tick: u64) -> f32 {
        self.jumps
            .iter()
            .map(|j| self.arc_height((tick + 1).saturating_sub(j.started_at)))
            .fold(0.0, f32::max)
    }

    fn step(&mut self, player: &mut Player, tick: u64) -> Motion {
        player.y = self.baseline_y - self.height_at(tick);
        Motion::InBounds
    }
}

/// Motion model selected by game mode
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerPhysics {
    Flight(FlightModel),
    Runner(RunnerModel),
}

impl PlayerPhysics {
    pub fn new(config: &PhysicsConfig) -> Self {
        match *config {
            PhysicsConfig::Flight {
                gravity,
                boost,
                start_y,
                floor_y,
            } => PlayerPhysics::Flight(FlightModel {
                gravity,
                boost,
                start_y,
                floor_y,
                pressing: false,
            }),
            PhysicsConfig::Runner {
                baseline_y,
                apex,
                phase_ticks,
                max_jumps,
            } => PlayerPhysics::Runner(RunnerModel {
                baseline_y,
                apex,
                phase_ticks: phase_ticks.max(1),
                max_jumps,
                jumps: Vec::new(),
                next_jump_id: 1,
            }),
        }
    }

    /// Vertical position at session start
    pub fn start_y(&self) -> f32 {
        match self {
            PlayerPhysics::Flight(m) => m.start_y,
            PlayerPhysics::Runner(m) => m.baseline_y,
        }
    }

    /// Drop all motion state (input level, jumps in flight)
    pub fn reset(&mut self) {
        match self {
            PlayerPhysics::Flight(m) => m.pressing = false,
            PlayerPhysics::Runner(m) => m.jumps.clear(),
        }
    }

    /// Advance the player by one tick
    pub fn step(&mut self, player: &mut Player, tick: u64) -> Motion {
        match self {
            PlayerPhysics::Flight(m) => m.step(player),
            PlayerPhysics::Runner(m) => m.step(player, tick),
        }
    }

    /// Level-triggered ascend input; ignored by the runner model
    pub fn set_pressing(&mut self, pressing: bool) {
        if let PlayerPhysics::Flight(m) = self {
            m.pressing = pressing;
        }
    }

    /// Edge-triggered jump; `None` in flight mode or when no jump slot is free
    pub fn activate_jump(&mut self, now: u64) -> Option<Jump> {
        match self {
            PlayerPhysics::Runner(m) => m.try_jump(now),
            PlayerPhysics::Flight(_) => None,
        }
    }

    /// Release the slot of a finished jump
    pub fn land(&mut self, jump_id: u32) -> bool {
        match self {
            PlayerPhysics::Runner(m) => m.land(jump_id),
            PlayerPhysics::Flight(_) => false,
        }
    }

    /// Ticks from activation to landing (runner only)
    pub fn jump_ticks(&self) -> Option<u64> {
        match self {
            PlayerPhysics::Runner(m) => Some(m.jump_ticks()),
            PlayerPhysics::Flight(_) => None,
        }
    }

    pub fn jumps_in_flight(&self) -> u8 {
        match self {
            PlayerPhysics::Runner(m) => m.in_flight(),
            PlayerPhysics::Flight(_) => 0,
        }
    }
}
