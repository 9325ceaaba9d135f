//! Session state machine and the fixed-step tick chain
//!
//! `Game` owns every component and every scheduled task. The host calls
//! `step()` once per tick period; a step fires the timers due at the current
//! tick and then runs physics, movement, collision and scoring, in that
//! order. Leaving `Running` cancels all tasks in the same call.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision;
use super::physics::{Motion, PlayerPhysics};
use super::random::RandomSource;
use super::schedule::{Task, TaskRegistry};
use super::scoring::ScoreController;
use super::spawn::SpawnGenerator;
use super::state::{
    GameEvent, GameOverCause, GameSession, GameStatus, Multiplier, ObstacleView, Player,
    PowerUpView, Snapshot,
};
use crate::error::{StoreError, TransitionError};
use crate::highscores::HighScoreGateway;
use crate::persistence::Storage;
use crate::settings::{GameMode, SessionConfig};

/// Result of a restart
#[derive(Debug)]
pub struct RestartOutcome {
    /// Score of the session that just ended
    pub final_score: u64,
    /// High score after the comparison (in memory)
    pub high_score: u64,
    pub new_record: bool,
    /// Set if the improved high score could not be written
    pub persist_error: Option<StoreError>,
}

pub struct Game<S: Storage, R: RandomSource = Pcg32> {
    config: SessionConfig,
    gateway: HighScoreGateway<S>,
    high_score: u64,
    rng: R,
    session: GameSession,
    player: Player,
    physics: PlayerPhysics,
    spawner: SpawnGenerator,
    scoring: ScoreController,
    tasks: TaskRegistry,
    events: Vec<GameEvent>,
    snapshot: Snapshot,
}

impl<S: Storage> Game<S, Pcg32> {
    /// Create an idle game with a seeded RNG
    pub fn new(config: SessionConfig, storage: S, seed: u64) -> Self {
        Self::with_rng(config, storage, Pcg32::seed_from_u64(seed))
    }
}

impl<S: Storage, R: RandomSource> Game<S, R> {
    pub fn with_rng(config: SessionConfig, storage: S, rng: R) -> Self {
        let gateway = HighScoreGateway::new(storage);
        let high_score = gateway.get_high_score();
        let physics = PlayerPhysics::new(&config.physics);
        let player = Player::new(config.player, physics.start_y());
        let mut game = Self {
            gateway,
            high_score,
            rng,
            session: GameSession::idle(config.scoring.base_speed),
            player,
            physics,
            spawner: SpawnGenerator::new(config.spawn),
            scoring: ScoreController::new(config.scoring),
            tasks: TaskRegistry::new(),
            events: Vec::new(),
            snapshot: Snapshot::default(),
            config,
        };
        game.refresh_snapshot();
        game
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.session.status
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    /// In-memory high score (includes improvements whose write failed)
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Ticks processed in the current session
    pub fn tick_count(&self) -> u64 {
        self.tasks.now()
    }

    /// Live scheduled tasks (0 whenever not running)
    pub fn scheduled_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn jumps_in_flight(&self) -> u8 {
        self.physics.jumps_in_flight()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn gateway(&self) -> &HighScoreGateway<S> {
        &self.gateway
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Idle -> Running
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.session.status != GameStatus::Idle {
            return Err(TransitionError {
                action: "start",
                from: self.session.status,
            });
        }
        self.begin_session();
        Ok(())
    }

    /// GameOver -> Running, persisting an improved high score first
    ///
    /// The final score is compared with the larger of the stored value and
    /// the in-memory one, so a record whose write failed still counts.
    pub fn restart(&mut self) -> Result<RestartOutcome, TransitionError> {
        if self.session.status != GameStatus::GameOver {
            return Err(TransitionError {
                action: "restart",
                from: self.session.status,
            });
        }

        // The store may have been raised by another game since we last read it
        let best = self.gateway.get_high_score().max(self.high_score);
        self.high_score = best;

        let final_score = self.session.score;
        let new_record = final_score > best;
        let mut persist_error = None;
        if new_record {
            log::info!("New high score: {} (was {})", final_score, best);
            self.high_score = final_score;
            if let Err(e) = self.gateway.set_high_score(final_score) {
                log::warn!("Failed to persist high score {}: {}", final_score, e);
                persist_error = Some(e);
            }
        }

        self.begin_session();
        Ok(RestartOutcome {
            final_score,
            high_score: self.high_score,
            new_record,
            persist_error,
        })
    }

    /// Overwrite the stored high score with 0
    pub fn reset_high_score(&mut self) -> Result<(), StoreError> {
        self.high_score = 0;
        let result = self.gateway.reset();
        self.refresh_snapshot();
        result
    }

    /// Level-triggered ascend input (flight)
    pub fn set_pressing(&mut self, pressing: bool) {
        self.physics.set_pressing(pressing);
    }

    /// Edge-triggered jump (runner). Returns false when ignored.
    pub fn activate_jump(&mut self) -> bool {
        if self.session.status != GameStatus::Running {
            return false;
        }
        let Some(jump_ticks) = self.physics.jump_ticks() else {
            return false;
        };
        let Some(jump) = self.physics.activate_jump(self.tasks.now()) else {
            return false;
        };
        self.tasks.once(Task::JumpLanded { jump_id: jump.id }, jump_ticks);
        self.events.push(GameEvent::JumpStarted { jump_id: jump.id });
        true
    }

    /// Advance by one tick period. Does nothing unless running.
    pub fn step(&mut self) -> GameStatus {
        if self.session.status != GameStatus::Running {
            return self.session.status;
        }

        for (_, task) in self.tasks.take_due() {
            if self.session.status != GameStatus::Running {
                break;
            }
            self.run_task(task);
        }

        if self.session.status == GameStatus::Running {
            self.tasks.advance();
        }
        self.refresh_snapshot();
        self.session.status
    }

    fn run_task(&mut self, task: Task) {
        let now = self.tasks.now();
        match task {
            Task::SpawnObstacle => {
                let ids =
                    self.spawner
                        .spawn_obstacle(self.session.difficulty_speed, now, &mut self.rng);
                self.events
                    .extend(ids.into_iter().map(|id| GameEvent::ObstacleSpawned { id }));
            }
            Task::SpawnPowerUp => {
                if let Some(id) = self
                    .spawner
                    .spawn_power_up(self.session.difficulty_speed, now)
                {
                    self.events.push(GameEvent::PowerUpSpawned { id });
                }
            }
            Task::JumpLanded { jump_id } => {
                if self.physics.land(jump_id) {
                    self.events.push(GameEvent::JumpLanded { jump_id });
                }
            }
            Task::MultiplierExpired => {
                if self.session.multiplier.take().is_some() {
                    log::debug!("Multiplier expired at tick {}", now);
                    self.events.push(GameEvent::MultiplierExpired);
                }
            }
            Task::Tick => self.tick(now),
        }
    }

    /// Physics -> movement/prune -> collision -> scoring
    fn tick(&mut self, now: u64) {
        let motion = self.physics.step(&mut self.player, now);
        self.spawner.advance();

        if motion == Motion::OutOfBounds {
            self.end_session(GameOverCause::OutOfBounds);
            return;
        }

        let report = collision::detect(
            &self.player.aabb(),
            self.spawner.obstacles(),
            self.spawner.power_ups(),
        );
        if let Some(obstacle_id) = report.first_obstacle() {
            self.end_session(GameOverCause::Collision { obstacle_id });
            return;
        }
        for id in report.power_ups {
            if self.spawner.take_power_up(id).is_some() {
                self.activate_multiplier(id, now);
            }
        }

        let step = self.scoring.advance(&mut self.session);
        if let Some(speed) = step.speed_raised {
            log::debug!("Speed tier raised to {:.1} at score {}", speed, self.session.score);
            self.events.push(GameEvent::SpeedRaised { speed });
        }
    }

    /// Start or extend the multiplier window
    fn activate_multiplier(&mut self, power_up_id: u32, now: u64) {
        if let Some(previous) = self.session.multiplier.take() {
            self.tasks.cancel(previous.handle);
        }
        let window = self.config.scoring.multiplier_ticks;
        let handle = self.tasks.once(Task::MultiplierExpired, window);
        let expires_at = now + window;
        self.session.multiplier = Some(Multiplier { expires_at, handle });
        log::debug!("Power-up #{} collected, multiplier until tick {}", power_up_id, expires_at);
        self.events.push(GameEvent::PowerUpCollected {
            id: power_up_id,
            expires_at,
        });
    }

    /// Running -> GameOver. Idempotent: later calls in the same tick are ignored.
    fn end_session(&mut self, cause: GameOverCause) {
        if self.session.status != GameStatus::Running {
            return;
        }
        self.session.status = GameStatus::GameOver;
        self.session.multiplier = None;
        let cancelled = self.tasks.cancel_all();
        log::info!(
            "Game over ({:?}) score={} tick={} cancelled_tasks={}",
            cause,
            self.session.score,
            self.tasks.now(),
            cancelled
        );
        self.events.push(GameEvent::GameOver {
            cause,
            score: self.session.score,
        });
    }

    /// Fresh session state and a fresh task group
    fn begin_session(&mut self) {
        self.session = GameSession::running(self.config.scoring.base_speed);
        self.spawner.clear();
        self.physics.reset();
        self.player.y = self.physics.start_y();

        self.tasks.reset();
        self.tasks.every_from(Task::Tick, 1, 0);
        self.tasks
            .every(Task::SpawnObstacle, self.config.spawn.obstacle_interval_ticks);
        if let Some(period) = self.config.spawn.power_up_interval_ticks() {
            self.tasks.every(Task::SpawnPowerUp, period);
        }

        log::info!(
            "{} session started (high score {})",
            self.config.mode.as_str(),
            self.high_score
        );
        self.events.push(GameEvent::SessionStarted);
        self.refresh_snapshot();
    }

    fn refresh_snapshot(&mut self) {
        let snapshot = &mut self.snapshot;
        snapshot.tick = self.tasks.now();
        snapshot.player_y = self.player.y;
        snapshot.obstacles.clear();
        snapshot
            .obstacles
            .extend(self.spawner.obstacles().iter().map(ObstacleView::from));
        snapshot.power_ups.clear();
        snapshot
            .power_ups
            .extend(self.spawner.power_ups().iter().map(PowerUpView::from));
        snapshot.score = self.session.score;
        snapshot.high_score = self.high_score;
        snapshot.multiplier_active = self.session.multiplier_active();
        snapshot.difficulty_speed = self.session.difficulty_speed;
        snapshot.jumps_in_flight = self.physics.jumps_in_flight();
        snapshot.status = self.session.status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::settings::{ArcadeConfig, Bounds};
    use crate::sim::random::ScriptedRandom;
    use crate::sim::state::Variant;

    fn flight_game() -> Game<MemoryStorage> {
        let config = ArcadeConfig::default().session(GameMode::Flight).unwrap();
        Game::new(config, MemoryStorage::new(), 1)
    }

    fn runner_game() -> Game<MemoryStorage> {
        let config = ArcadeConfig::default().session(GameMode::Runner).unwrap();
        Game::new(config, MemoryStorage::new(), 1)
    }

    /// Spawn timers pushed far beyond any test length
    fn quiet(mode: GameMode) -> Game<MemoryStorage> {
        let mut config = ArcadeConfig::default();
        config.flight.obstacle_interval_ms = 600_000;
        config.runner.obstacle_interval_ms = 600_000;
        config.runner.power_up_interval_ms = 600_000;
        Game::new(config.session(mode).unwrap(), MemoryStorage::new(), 1)
    }

    fn game_overs(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count()
    }

    #[test]
    fn test_idle_until_started() {
        let mut game = flight_game();
        assert_eq!(game.status(), GameStatus::Idle);
        assert_eq!(game.step(), GameStatus::Idle);
        assert_eq!(game.tick_count(), 0);
        assert_eq!(game.scheduled_tasks(), 0);

        game.start().unwrap();
        assert_eq!(game.status(), GameStatus::Running);
        assert_eq!(game.snapshot().status, GameStatus::Running);
        // tick + obstacle timer
        assert_eq!(game.scheduled_tasks(), 2);
        assert!(game.start().is_err());
        assert!(game.restart().is_err());
    }

    #[test]
    fn test_runner_schedules_power_up_timer() {
        let mut game = runner_game();
        game.start().unwrap();
        assert_eq!(game.scheduled_tasks(), 3);
    }

    #[test]
    fn test_gravity_only_fall_ends_at_floor() {
        let mut game = quiet(GameMode::Flight);
        game.start().unwrap();
        game.player.y = 100.0;
        for _ in 0..10 {
            assert_eq!(game.step(), GameStatus::Running);
        }
        assert_eq!(game.snapshot().player_y, 140.0);
        assert_eq!(game.score(), 10);

        // 760 is the floor for a 40-unit player in an 800-unit world
        let mut ticks = 0;
        while game.step() == GameStatus::Running {
            ticks += 1;
        }
        assert_eq!(game.player().y, 760.0);
        assert_eq!(ticks, 154);
        assert_eq!(game.status(), GameStatus::GameOver);
        assert_eq!(game.scheduled_tasks(), 0);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::GameOver {
            cause: GameOverCause::OutOfBounds,
            score: 164,
        }));
    }

    #[test]
    fn test_gap_pass_and_gap_miss() {
        let mut game = flight_game();
        game.start().unwrap();
        game.player.y = 220.0;
        // Pair already overlapping the player column, moving slowly
        game.spawner.spawn_gap_pair_at(30.0, 200.0, 0.0, 0).unwrap();
        game.set_pressing(true);
        game.step();
        // 220 - 8 = 212, still inside [200, 390)
        assert_eq!(game.status(), GameStatus::Running);

        game.player.y = 188.0;
        game.step();
        // 180 pokes above the gap
        assert_eq!(game.status(), GameStatus::GameOver);
        let events = game.drain_events();
        assert_eq!(game_overs(&events), 1);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::GameOver {
                cause: GameOverCause::Collision { .. },
                ..
            }
        )));
    }

    #[test]
    fn test_simultaneous_collisions_end_once() {
        let mut game = runner_game();
        game.start().unwrap();
        let a = game
            .spawner
            .spawn_ground_obstacle_at(30.0, 50.0, 0.0, Variant::Cone, 0)
            .unwrap();
        game.spawner
            .spawn_ground_obstacle_at(60.0, 60.0, 0.0, Variant::Tree, 0)
            .unwrap();

        assert_eq!(game.step(), GameStatus::GameOver);
        assert_eq!(game.step(), GameStatus::GameOver);
        let events = game.drain_events();
        assert_eq!(game_overs(&events), 1);
        assert!(events.contains(&GameEvent::GameOver {
            cause: GameOverCause::Collision { obstacle_id: a },
            score: 0,
        }));
    }

    #[test]
    fn test_multiplier_window_counts_ticks() {
        let mut game = quiet(GameMode::Runner);
        game.start().unwrap();
        game.spawner.spawn_power_up_at(30.0, 0.0, 0).unwrap();

        let mut gains = Vec::new();
        for _ in 0..200 {
            let before = game.score();
            game.step();
            gains.push(game.score() - before);
        }
        assert!(gains[..166].iter().all(|&g| g == 2));
        assert!(gains[166..].iter().all(|&g| g == 1));
        assert!(!game.snapshot().multiplier_active);
        assert!(game.snapshot().power_ups.is_empty());
    }

    #[test]
    fn test_second_power_up_extends_window() {
        let mut game = runner_game();
        game.start().unwrap();
        game.spawner.spawn_power_up_at(30.0, 0.0, 0).unwrap();
        game.step();
        let first = game.session().multiplier.unwrap();
        for _ in 0..49 {
            game.step();
        }
        game.spawner.spawn_power_up_at(30.0, 0.0, 50).unwrap();
        game.step();
        let second = game.session().multiplier.unwrap();
        assert_eq!(first.expires_at, 166);
        assert_eq!(second.expires_at, 50 + 166);
        assert_eq!(
            game.tasks.count(|t| matches!(t, Task::MultiplierExpired)),
            1
        );
    }

    #[test]
    fn test_double_jump_rule_through_game() {
        let mut game = runner_game();
        game.start().unwrap();
        assert!(game.activate_jump());
        game.step();
        assert!(game.activate_jump());
        let before = game.player().clone();
        assert!(!game.activate_jump());
        assert_eq!(game.player(), &before);
        assert_eq!(game.jumps_in_flight(), 2);

        // Both jumps land 26 ticks after they started
        for _ in 0..30 {
            game.step();
        }
        assert_eq!(game.jumps_in_flight(), 0);
        assert_eq!(game.player().y, 560.0);
        let landed = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::JumpLanded { .. }))
            .count();
        assert_eq!(landed, 2);
    }

    #[test]
    fn test_jump_clears_obstacle() {
        let mut game = runner_game();
        game.start().unwrap();
        // 40 tall obstacle reaching the player's front edge (x=140) on tick 6
        game.spawner
            .spawn_ground_obstacle_at(200.0, 40.0, 10.0, Variant::Cone, 0)
            .unwrap();
        assert!(game.activate_jump());
        for _ in 0..26 {
            game.step();
        }
        assert_eq!(game.status(), GameStatus::Running);
    }

    #[test]
    fn test_flight_ignores_jump_and_runner_ignores_press() {
        let mut flight = flight_game();
        flight.start().unwrap();
        assert!(!flight.activate_jump());

        let mut runner = runner_game();
        runner.start().unwrap();
        runner.set_pressing(true);
        runner.step();
        assert_eq!(runner.player().y, 560.0);
    }

    #[test]
    fn test_obstacle_timer_spawns_every_interval() {
        let config = ArcadeConfig::default().session(GameMode::Runner).unwrap();
        let mut game = Game::with_rng(config, MemoryStorage::new(), ScriptedRandom::new([0.0]));
        game.start().unwrap();
        for _ in 0..66 {
            game.step();
        }
        assert!(game.snapshot().obstacles.is_empty());
        game.step();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.obstacles.len(), 1);
        assert_eq!(snapshot.obstacles[0].variant, Variant::Tree);
        // Spawned at 400 with speed 10, moved once in the same tick
        assert_eq!(snapshot.obstacles[0].x, 390.0);
        assert_eq!(snapshot.obstacles[0].width, 30.0);
    }

    #[test]
    fn test_speed_only_affects_new_obstacles() {
        let mut game = runner_game();
        game.start().unwrap();
        game.spawner
            .spawn_ground_obstacle_at(400.0, 30.0, 10.0, Variant::Cone, 0)
            .unwrap();
        game.session.score = 99;
        game.step();
        assert_eq!(game.session().difficulty_speed, 11.0);
        assert_eq!(game.spawner.obstacles()[0].speed, 10.0);
        assert!(game.drain_events().contains(&GameEvent::SpeedRaised { speed: 11.0 }));
    }

    #[test]
    fn test_restart_persists_improvement_and_resets() {
        let mut game = flight_game();
        game.start().unwrap();
        game.session.score = 250;
        game.gateway.set_high_score(100).unwrap();
        game.high_score = 100;
        game.player.y = 1.0;
        game.set_pressing(true);
        game.step();
        assert_eq!(game.status(), GameStatus::GameOver);

        let outcome = game.restart().unwrap();
        assert!(outcome.new_record);
        assert!(outcome.persist_error.is_none());
        assert_eq!(outcome.final_score, 250);
        assert_eq!(game.gateway().get_high_score(), 250);
        assert_eq!(game.score(), 0);
        assert_eq!(game.tick_count(), 0);
        assert_eq!(game.status(), GameStatus::Running);
        assert_eq!(game.player().y, 400.0);
        assert!(game.snapshot().obstacles.is_empty());
        assert_eq!(game.snapshot().high_score, 250);
    }

    #[test]
    fn test_restart_keeps_higher_stored_score() {
        let mut storage = MemoryStorage::new();
        storage.set_item("highScore", "900").unwrap();
        let config = ArcadeConfig::default().session(GameMode::Flight).unwrap();
        let mut game = Game::new(config, storage, 3);
        assert_eq!(game.high_score(), 900);

        game.start().unwrap();
        while game.step() == GameStatus::Running {}
        let outcome = game.restart().unwrap();
        assert!(!outcome.new_record);
        assert_eq!(game.gateway().get_high_score(), 900);
    }

    #[test]
    fn test_restart_counts_unsaved_in_memory_record() {
        let mut game = flight_game();
        game.start().unwrap();
        // An earlier record that never reached the store
        game.high_score = 300;
        game.session.score = 250;
        game.player.y = 1.0;
        game.set_pressing(true);
        game.step();

        let outcome = game.restart().unwrap();
        assert!(!outcome.new_record);
        assert_eq!(outcome.high_score, 300);
        assert_eq!(game.gateway().get_high_score(), 0);
    }

    #[test]
    fn test_no_stale_tasks_after_restart() {
        let mut game = quiet(GameMode::Runner);
        game.start().unwrap();
        game.spawner.spawn_power_up_at(30.0, 0.0, 0).unwrap();
        game.step();
        assert!(game.activate_jump());
        game.spawner
            .spawn_ground_obstacle_at(100.0, 80.0, 0.0, Variant::Tree, 0)
            .unwrap();
        while game.step() == GameStatus::Running {}
        assert_eq!(game.scheduled_tasks(), 0);

        game.restart().unwrap();
        assert_eq!(game.scheduled_tasks(), 3);
        assert_eq!(game.jumps_in_flight(), 0);
        assert!(!game.session().multiplier_active());
        game.drain_events();
        for _ in 0..300 {
            game.step();
        }
        let events = game.drain_events();
        assert!(!events.iter().any(|e| matches!(
            e,
            GameEvent::MultiplierExpired | GameEvent::JumpLanded { .. }
        )));
    }

    #[test]
    fn test_reset_high_score() {
        let mut game = flight_game();
        game.gateway.set_high_score(40).unwrap();
        game.high_score = 40;
        game.reset_high_score().unwrap();
        assert_eq!(game.high_score(), 0);
        assert_eq!(game.gateway().get_high_score(), 0);
        assert_eq!(game.snapshot().high_score, 0);
    }

    #[test]
    fn test_seeded_games_are_deterministic() {
        let mut config = ArcadeConfig::default();
        config.runner.obstacle_size = Bounds::new(30.0, 80.0);
        let session = config.session(GameMode::Runner).unwrap();
        let mut a = Game::new(session.clone(), MemoryStorage::new(), 42);
        let mut b = Game::new(session, MemoryStorage::new(), 42);
        a.start().unwrap();
        b.start().unwrap();
        for i in 0..400 {
            if i % 37 == 0 {
                a.activate_jump();
                b.activate_jump();
            }
            a.step();
            b.step();
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }
}
