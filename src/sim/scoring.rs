//! Score accrual and speed tiers
//!
//! Difficulty is a pure function of score, so pausing has no effect on it and
//! obstacles already on screen keep the speed they spawned with.

use super::state::GameSession;

/// Validated scoring parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRules {
    /// Score per speed tier
    pub threshold: u64,
    /// Speed added per tier
    pub step: f32,
    /// Difficulty speed at score 0
    pub base_speed: f32,
    /// Ticks a power-up doubles scoring for
    pub multiplier_ticks: u64,
}

impl ScoringRules {
    #[inline]
    pub fn tier(&self, score: u64) -> u64 {
        score / self.threshold
    }

    pub fn difficulty_speed(&self, score: u64) -> f32 {
        self.base_speed + self.step * self.tier(score) as f32
    }
}

/// What one scoring step did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStep {
    pub gained: u64,
    /// New difficulty speed if a tier was crossed
    pub speed_raised: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreController {
    rules: ScoringRules,
}

impl ScoreController {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    /// Award one tick of score: 2 while the multiplier is active, else 1
    pub fn advance(&self, session: &mut GameSession) -> ScoreStep {
        let gained = if session.multiplier_active() { 2 } else { 1 };
        let before = self.rules.tier(session.score);
        session.score += gained;

        let speed_raised = if self.rules.tier(session.score) > before {
            session.difficulty_speed = self.rules.difficulty_speed(session.score);
            Some(session.difficulty_speed)
        } else {
            None
        };

        ScoreStep {
            gained,
            speed_raised,
        }
    }
}
