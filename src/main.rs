//! Bus Arcade entry point
//!
//! Runs headless sessions of either minigame with a simple autopilot and
//! prints one JSON summary per session. Useful for balancing tunables and for
//! checking that a seed replays identically.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;
    use std::thread;
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result, anyhow};
    use clap::Parser;
    use serde::Serialize;

    use bus_arcade::persistence::{FileStorage, MemoryStorage, Storage};
    use bus_arcade::platform::{self, TickClock};
    use bus_arcade::sim::{GameEvent, GameOverCause, Snapshot, Variant};
    use bus_arcade::{ArcadeConfig, Game, GameMode, GameStatus};

    #[derive(Parser, Debug)]
    #[command(about = "Run headless bus minigame sessions", version)]
    struct Args {
        /// flight or runner
        #[arg(long, default_value = "flight", value_parser = parse_mode)]
        mode: GameMode,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Sessions to play back to back (restart between them)
        #[arg(long, default_value_t = 3)]
        sessions: u32,
        /// Give up on a session after this many ticks
        #[arg(long, default_value_t = 20_000)]
        max_ticks: u64,
        /// JSON file holding the high score (in-memory if omitted)
        #[arg(long)]
        store: Option<PathBuf>,
        /// JSON tunables; missing fields take their defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Pace ticks at wall-clock speed instead of as fast as possible
        #[arg(long)]
        realtime: bool,
    }

    fn parse_mode(s: &str) -> Result<GameMode, String> {
        GameMode::from_str(s).ok_or_else(|| format!("unknown mode '{s}' (expected flight or runner)"))
    }

    #[derive(Serialize, Debug, Default)]
    struct SessionSummary {
        session: u32,
        mode: &'static str,
        seed: u64,
        ticks: u64,
        score: u64,
        high_score: u64,
        new_record: bool,
        cause: Option<GameOverCause>,
        obstacles_spawned: u32,
        power_ups_collected: u32,
        jumps: u32,
    }

    impl SessionSummary {
        fn record(&mut self, events: &[GameEvent]) {
            for event in events {
                match event {
                    GameEvent::ObstacleSpawned { .. } => self.obstacles_spawned += 1,
                    GameEvent::PowerUpCollected { .. } => self.power_ups_collected += 1,
                    GameEvent::JumpStarted { .. } => self.jumps += 1,
                    GameEvent::GameOver { cause, .. } => self.cause = Some(*cause),
                    _ => {}
                }
            }
        }
    }

    /// Press while below the centre of the next gap
    fn flight_input(snapshot: &Snapshot, player_x: f32, player_h: f32, world_h: f32) -> bool {
        let ahead = |variant: Variant| {
            snapshot
                .obstacles
                .iter()
                .filter(|o| o.variant == variant && o.x + o.width > player_x)
                .min_by(|a, b| a.x.total_cmp(&b.x))
        };
        let target = match (ahead(Variant::BarrierTop), ahead(Variant::BarrierBottom)) {
            (Some(top), Some(bottom)) => (top.y + top.height + bottom.y) / 2.0,
            _ => world_h / 2.0,
        };
        snapshot.player_y + player_h / 2.0 > target
    }

    /// Jump when something is about to reach the front edge
    fn runner_input(snapshot: &Snapshot, front: f32) -> bool {
        snapshot.jumps_in_flight == 0
            && snapshot
                .obstacles
                .iter()
                .any(|o| (0.0..=60.0).contains(&(o.x - front)))
    }

    pub fn run() -> Result<()> {
        platform::init_logging();
        let args = Args::parse();

        let tunables = match &args.config {
            Some(path) => ArcadeConfig::load_json(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ArcadeConfig::default(),
        };
        let config = tunables.session(args.mode)?;
        let storage: Box<dyn Storage> = match &args.store {
            Some(path) => Box::new(FileStorage::new(path)),
            None => Box::new(MemoryStorage::new()),
        };

        let player = config.player;
        let world_h = config.world.height;
        let tick_ms = config.tick_ms;
        let mut game = Game::new(config, storage, args.seed);
        log::info!(
            "Bus Arcade: mode={} seed={} high score={}",
            args.mode.as_str(),
            args.seed,
            game.high_score()
        );

        let origin = Instant::now();
        let mut clock = TickClock::new(tick_ms);
        for session in 0..args.sessions {
            let mut summary = SessionSummary {
                session,
                mode: args.mode.as_str(),
                seed: args.seed,
                ..Default::default()
            };
            if session == 0 {
                game.start()?;
            } else {
                let outcome = game.restart()?;
                if let Some(e) = outcome.persist_error {
                    log::warn!("High score not saved: {}", e);
                }
            }
            clock.reset();

            while game.status() == GameStatus::Running && game.tick_count() < args.max_ticks {
                if args.realtime {
                    let now = origin.elapsed().as_secs_f64() * 1000.0;
                    if !clock.poll(now) {
                        let wait = clock.until_next(now).max(1.0);
                        thread::sleep(Duration::from_secs_f64(wait / 1000.0));
                        continue;
                    }
                }
                match args.mode {
                    GameMode::Flight => {
                        let pressing = flight_input(game.snapshot(), player.x, player.height, world_h);
                        game.set_pressing(pressing);
                    }
                    GameMode::Runner => {
                        if runner_input(game.snapshot(), player.x + player.width) {
                            game.activate_jump();
                        }
                    }
                }
                game.step();
                summary.record(&game.drain_events());
            }

            summary.ticks = game.tick_count();
            summary.score = game.score();
            summary.new_record = summary.score > game.high_score();
            summary.high_score = game.high_score().max(summary.score);
            println!("{}", serde_json::to_string(&summary)?);

            if game.status() == GameStatus::Running {
                log::warn!(
                    "Session {} still running after {} ticks, stopping",
                    session,
                    args.max_ticks
                );
                return Ok(());
            }
        }

        // Restart commits the last score; the fresh session is discarded
        if game.status() == GameStatus::GameOver {
            let outcome = game
                .restart()
                .map_err(|e| anyhow!("final restart: {e}"))?;
            if let Some(e) = outcome.persist_error {
                return Err(e).context("saving high score");
            }
        }
        log::info!("Done, high score {}", game.high_score());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `bus_arcade::Game` directly
}
