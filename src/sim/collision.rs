//! Axis-aligned collision detection
//!
//! Overlap uses strict inequalities with no inset: boxes that only share an
//! edge do not collide. The same tolerance applies to both modes.

use glam::Vec2;

use super::state::{Obstacle, PowerUp, Variant};

/// Axis-aligned bounding box in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x
    }

    #[inline]
    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        self.min.y < other.max.y && other.min.y < self.max.y
    }

    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }
}

/// Does the player hit this obstacle?
///
/// Gap barriers collide when the player overlaps the barrier column and pokes
/// out of the gap window on that barrier's side, so across a pair this is
/// "not entirely inside the gap". Ground obstacles use plain AABB overlap
/// against their height above the ground line.
pub fn obstacle_hit(player: &Aabb, obstacle: &Obstacle) -> bool {
    let body = obstacle.aabb();
    match obstacle.gap {
        Some(gap) if player.overlaps_x(&body) => match obstacle.variant {
            Variant::BarrierTop => player.min.y < gap.start,
            _ => player.max.y > gap.end(),
        },
        Some(_) => false,
        None => player.overlaps(&body),
    }
}

pub fn power_up_hit(player: &Aabb, power_up: &PowerUp) -> bool {
    player.overlaps(&power_up.aabb())
}

/// Everything the player touched this tick, in entity order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub obstacles: Vec<u32>,
    pub power_ups: Vec<u32>,
}

impl CollisionReport {
    /// Any obstacle hit ends the session
    pub fn is_terminal(&self) -> bool {
        !self.obstacles.is_empty()
    }

    /// First obstacle detected; the one credited with the game over
    pub fn first_obstacle(&self) -> Option<u32> {
        self.obstacles.first().copied()
    }
}

pub fn detect(player: &Aabb, obstacles: &[Obstacle], power_ups: &[PowerUp]) -> CollisionReport {
    CollisionReport {
        obstacles: obstacles
            .iter()
            .filter(|o| obstacle_hit(player, o))
            .map(|o| o.id)
            .collect(),
        power_ups: power_ups
            .iter()
            .filter(|p| power_up_hit(player, p))
            .map(|p| p.id)
            .collect(),
    }
}
