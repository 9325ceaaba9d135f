//! Obstacle and power-up generation
//!
//! The generator is the only owner of the entity collections. Spawns happen
//! when the matching timer task fires; movement and pruning happen once per
//! tick. Every entity moves by the speed it was given at spawn.

use super::random::{RandomSource, pick, sample};
use super::state::{GapWindow, Obstacle, PowerUp, Variant};
use crate::settings::Bounds;

/// Range of the gap's top edge, plus the constant gap size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapBounds {
    pub min_y: f32,
    pub max_y: f32,
    pub size: f32,
}

/// Mode-specific shape of what gets spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnLayout {
    /// Flight: top + bottom barrier around a gap window
    GapPairs {
        barrier_width: f32,
        gap: GapBounds,
        world_height: f32,
    },
    /// Runner: single obstacles standing on the ground line, plus power-ups
    Ground {
        ground_y: f32,
        size: Bounds,
        power_up_interval_ticks: u64,
        power_up_size: f32,
    },
}

/// Validated spawn parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnConfig {
    /// Trailing screen edge where entities appear
    pub spawn_x: f32,
    pub obstacle_interval_ticks: u64,
    /// Added to the difficulty speed of each obstacle
    pub speed_jitter: Bounds,
    pub layout: SpawnLayout,
}

impl SpawnConfig {
    /// Power-up timer period, if this mode has power-ups
    pub fn power_up_interval_ticks(&self) -> Option<u64> {
        match self.layout {
            SpawnLayout::Ground {
                power_up_interval_ticks,
                ..
            } => Some(power_up_interval_ticks),
            SpawnLayout::GapPairs { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpawnGenerator {
    config: SpawnConfig,
    obstacles: Vec<Obstacle>,
    power_ups: Vec<PowerUp>,
    next_id: u32,
}

impl SpawnGenerator {
    pub fn new(config: SpawnConfig) -> Self {
        Self {
            config,
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    /// Remove every entity. Ids keep counting so they stay unique across sessions.
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.power_ups.clear();
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Spawn one obstacle set at the trailing edge; returns the new ids
    pub fn spawn_obstacle<R: RandomSource + ?Sized>(
        &mut self,
        difficulty_speed: f32,
        tick: u64,
        rng: &mut R,
    ) -> Vec<u32> {
        let x = self.config.spawn_x;
        match self.config.layout {
            SpawnLayout::GapPairs { gap, .. } => {
                let gap_start = sample(gap.min_y, gap.max_y, rng);
                let speed = difficulty_speed + self.jitter(rng);
                self.spawn_gap_pair_at(x, gap_start, speed, tick)
                    .map(|ids| ids.to_vec())
                    .unwrap_or_default()
            }
            SpawnLayout::Ground { size, .. } => {
                let variant = pick(&Variant::GROUND, rng);
                let size = sample(size.min, size.max, rng);
                let speed = difficulty_speed + self.jitter(rng);
                self.spawn_ground_obstacle_at(x, size, speed, variant, tick)
                    .into_iter()
                    .collect()
            }
        }
    }

    fn jitter<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f32 {
        sample(self.config.speed_jitter.min, self.config.speed_jitter.max, rng)
    }

    /// Place a barrier pair whose gap starts at `gap_start`
    ///
    /// `gap_start` is clamped so the whole window stays on screen. `None` in
    /// the ground layout.
    pub fn spawn_gap_pair_at(
        &mut self,
        x: f32,
        gap_start: f32,
        speed: f32,
        tick: u64,
    ) -> Option<[u32; 2]> {
        let SpawnLayout::GapPairs {
            barrier_width,
            gap: bounds,
            world_height,
        } = self.config.layout
        else {
            return None;
        };
        let gap = GapWindow {
            start: gap_start.clamp(0.0, (world_height - bounds.size).max(0.0)),
            size: bounds.size,
        };

        let top = self.next_entity_id();
        let bottom = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id: top,
            x,
            y: 0.0,
            width: barrier_width,
            height: gap.start,
            speed,
            variant: Variant::BarrierTop,
            spawned_tick: tick,
            gap: Some(gap),
        });
        self.obstacles.push(Obstacle {
            id: bottom,
            x,
            y: gap.end(),
            width: barrier_width,
            height: world_height - gap.end(),
            speed,
            variant: Variant::BarrierBottom,
            spawned_tick: tick,
            gap: Some(gap),
        });
        log::debug!(
            "Spawned gap pair {}/{} gap={:.0}..{:.0}",
            top,
            bottom,
            gap.start,
            gap.end()
        );
        Some([top, bottom])
    }

    /// Place a square obstacle standing on the ground line
    pub fn spawn_ground_obstacle_at(
        &mut self,
        x: f32,
        size: f32,
        speed: f32,
        variant: Variant,
        tick: u64,
    ) -> Option<u32> {
        let SpawnLayout::Ground { ground_y, .. } = self.config.layout else {
            return None;
        };
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            x,
            y: ground_y - size,
            width: size,
            height: size,
            speed,
            variant,
            spawned_tick: tick,
            gap: None,
        });
        log::debug!("Spawned {:?} #{} size={:.0} speed={:.1}", variant, id, size, speed);
        Some(id)
    }

    /// Spawn a power-up at the trailing edge; `None` in modes without power-ups
    pub fn spawn_power_up(&mut self, difficulty_speed: f32, tick: u64) -> Option<u32> {
        let x = self.config.spawn_x;
        self.spawn_power_up_at(x, difficulty_speed, tick)
    }

    pub fn spawn_power_up_at(&mut self, x: f32, speed: f32, tick: u64) -> Option<u32> {
        let SpawnLayout::Ground {
            ground_y,
            power_up_size,
            ..
        } = self.config.layout
        else {
            return None;
        };
        let id = self.next_entity_id();
        self.power_ups.push(PowerUp {
            id,
            x,
            y: ground_y - power_up_size,
            width: power_up_size,
            height: power_up_size,
            speed,
            spawned_tick: tick,
        });
        log::debug!("Spawned power-up #{}", id);
        Some(id)
    }

    /// Move every entity by its own speed and drop those fully off screen.
    /// Returns how many were pruned.
    pub fn advance(&mut self) -> usize {
        let before = self.obstacles.len() + self.power_ups.len();
        for obstacle in &mut self.obstacles {
            obstacle.x -= obstacle.speed;
        }
        for power_up in &mut self.power_ups {
            power_up.x -= power_up.speed;
        }
        self.obstacles.retain(|o| !o.is_off_screen());
        self.power_ups.retain(|p| !p.is_off_screen());
        before - (self.obstacles.len() + self.power_ups.len())
    }

    /// Remove a power-up the player collected
    pub fn take_power_up(&mut self, id: u32) -> Option<PowerUp> {
        let index = self.power_ups.iter().position(|p| p.id == id)?;
        Some(self.power_ups.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::ScriptedRandom;

    fn ground_config() -> SpawnConfig {
        SpawnConfig {
            spawn_x: 400.0,
            obstacle_interval_ticks: 66,
            speed_jitter: Bounds::new(0.0, 3.0),
            layout: SpawnLayout::Ground {
                ground_y: 640.0,
                size: Bounds::new(30.0, 80.0),
                power_up_interval_ticks: 333,
                power_up_size: 40.0,
            },
        }
    }

    fn gap_config() -> SpawnConfig {
        SpawnConfig {
            spawn_x: 400.0,
            obstacle_interval_ticks: 66,
            speed_jitter: Bounds::new(0.0, 0.0),
            layout: SpawnLayout::GapPairs {
                barrier_width: 80.0,
                gap: GapBounds {
                    min_y: 120.0,
                    max_y: 490.0,
                    size: 190.0,
                },
                world_height: 800.0,
            },
        }
    }

    #[test]
    fn test_ground_spawn_uses_bounded_random_attributes() {
        let mut spawner = SpawnGenerator::new(ground_config());
        // variant, size, jitter
        let mut rng = ScriptedRandom::new([0.5, 0.5, 0.5]);
        let ids = spawner.spawn_obstacle(10.0, 7, &mut rng);
        assert_eq!(ids.len(), 1);

        let o = &spawner.obstacles()[0];
        assert_eq!(o.variant, Variant::Pedestrian);
        assert_eq!(o.width, 55.0);
        assert_eq!(o.height, 55.0);
        assert_eq!(o.y, 640.0 - 55.0);
        assert_eq!(o.speed, 11.5);
        assert_eq!(o.x, 400.0);
        assert_eq!(o.spawned_tick, 7);
        assert!(o.gap.is_none());
    }

    #[test]
    fn test_gap_pair_spans_world() {
        let mut spawner = SpawnGenerator::new(gap_config());
        let mut rng = ScriptedRandom::new([0.0]);
        let ids = spawner.spawn_obstacle(5.0, 0, &mut rng);
        assert_eq!(ids.len(), 2);

        let [top, bottom] = [&spawner.obstacles()[0], &spawner.obstacles()[1]];
        assert_eq!(top.variant, Variant::BarrierTop);
        assert_eq!(top.y, 0.0);
        assert_eq!(top.height, 120.0);
        assert_eq!(bottom.y, 310.0);
        assert_eq!(bottom.y + bottom.height, 800.0);
        assert_eq!(top.speed, bottom.speed);
        assert_eq!(top.gap, bottom.gap);
    }

    #[test]
    fn test_layout_specific_placement() {
        let mut spawner = SpawnGenerator::new(gap_config());
        assert_eq!(spawner.config().power_up_interval_ticks(), None);
        assert_eq!(spawner.spawn_power_up(5.0, 0), None);
        assert_eq!(
            spawner.spawn_ground_obstacle_at(400.0, 40.0, 5.0, Variant::Cone, 0),
            None
        );
        assert!(spawner.power_ups().is_empty());
        assert!(spawner.obstacles().is_empty());

        let mut spawner = SpawnGenerator::new(ground_config());
        assert_eq!(spawner.spawn_gap_pair_at(400.0, 200.0, 5.0, 0), None);
        assert_eq!(spawner.config().power_up_interval_ticks(), Some(333));
    }

    #[test]
    fn test_gap_start_clamped_on_screen() {
        let mut spawner = SpawnGenerator::new(gap_config());
        spawner.spawn_gap_pair_at(400.0, 900.0, 5.0, 0).unwrap();
        let bottom = &spawner.obstacles()[1];
        assert_eq!(bottom.gap.unwrap().start, 610.0);
        assert_eq!(bottom.height, 0.0);
    }

    #[test]
    fn test_advance_uses_per_entity_speed_and_prunes() {
        let mut spawner = SpawnGenerator::new(ground_config());
        let slow = spawner
            .spawn_ground_obstacle_at(25.0, 30.0, 10.0, Variant::Cone, 0)
            .unwrap();
        let fast = spawner
            .spawn_ground_obstacle_at(25.0, 30.0, 20.0, Variant::Tree, 0)
            .unwrap();
        let pickup = spawner.spawn_power_up_at(30.0, 10.0, 0).unwrap();

        assert_eq!(spawner.advance(), 0);
        assert_eq!(spawner.obstacles()[0].x, 15.0);
        assert_eq!(spawner.obstacles()[1].x, 5.0);

        // fast at -15, trailing edge still at 15
        assert_eq!(spawner.advance(), 0);
        // fast at -35, trailing edge at -5: pruned. slow and pickup remain.
        assert_eq!(spawner.advance(), 1);
        let ids: Vec<u32> = spawner.obstacles().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![slow]);
        assert!(!ids.contains(&fast));
        assert_eq!(spawner.power_ups()[0].id, pickup);
    }

    #[test]
    fn test_take_power_up_removes_once() {
        let mut spawner = SpawnGenerator::new(ground_config());
        let id = spawner.spawn_power_up(10.0, 0).unwrap();
        assert!(spawner.take_power_up(id).is_some());
        assert!(spawner.take_power_up(id).is_none());
    }

    #[test]
    fn test_ids_unique_across_clear() {
        let mut spawner = SpawnGenerator::new(ground_config());
        let a = spawner.spawn_power_up(10.0, 0).unwrap();
        spawner.clear();
        let b = spawner.spawn_power_up(10.0, 0).unwrap();
        assert_ne!(a, b);
    }
}
