mod pilot;

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use skyhop_core::game_trait::{Services, Simulation};
use skyhop_core::services::{EffectError, EffectSink, MemoryStore, ScoreStore, TomlFileStore};
use skyhop_core::time::{Clock, ManualClock, Millis};
use skyhop_jumper::JumpRun;
use skyhop_jumper::config::JumperConfig;
use skyhop_jumper::events::{Cue, RunEvent};

use pilot::Pilot;

const TICKS_ENV: &str = "SKYHOP_TICKS";
const SEED_ENV: &str = "SKYHOP_SEED";
const STORE_ENV: &str = "SKYHOP_STORE";

const DEFAULT_TICKS: u64 = 60 * 60 * 5;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_STORE: &str = "skyhop-scores.toml";

/// Sink that logs cues instead of playing them.
struct TracingSink;

impl EffectSink<Cue> for TracingSink {
    fn emit(&mut self, cue: &Cue) -> Result<(), EffectError> {
        tracing::trace!(?cue, "cue");
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            default
        }),
        Err(_) => default,
    }
}

fn open_store() -> Box<dyn ScoreStore> {
    let path = std::env::var(STORE_ENV).unwrap_or_else(|_| DEFAULT_STORE.to_string());
    match TomlFileStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Score store unavailable, keeping scores in memory");
            Box::new(MemoryStore::new())
        },
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ticks: u64 = env_or(TICKS_ENV, DEFAULT_TICKS);
    let seed: u64 = env_or(SEED_ENV, DEFAULT_SEED);
    let config = JumperConfig::load();
    let mut run = JumpRun::new(config, seed);
    let step_ms = (1000.0 / run.tick_rate()).round() as Millis;
    let dt = step_ms as f32 / 1000.0;

    let mut store = open_store();
    let mut sink = TracingSink;
    let mut services = Services::new(&mut sink, store.as_mut());
    let mut clock = ManualClock::starting_at(0);
    let mut pilot = Pilot::new();

    tracing::info!(ticks, seed, step_ms, "Skyhop headless run starting");
    run.start(clock.now_ms(), &mut services);

    let mut kills = 0u32;
    let mut pickups = 0u32;
    for tick in 0..ticks {
        let input = pilot.next_input(run.state());
        let now = clock.advance(step_ms);
        for event in run.update(dt, now, &input, &mut services) {
            match event {
                RunEvent::EnemyDefeated { .. } => kills += 1,
                RunEvent::PowerupCollected { kind, .. } => {
                    pickups += 1;
                    tracing::debug!(tick, ?kind, "Power-up collected");
                },
                RunEvent::GameOver(summary) => {
                    tracing::info!(tick, ?summary, "Game over");
                },
                _ => {},
            }
        }
        if run.is_over() {
            break;
        }
    }

    let hud = run.hud();
    tracing::info!(
        score = hud.score,
        height = run.state().run.highest_height,
        best = hud.best_score,
        kills,
        pickups,
        over = run.is_over(),
        "Skyhop headless run finished"
    );
}
