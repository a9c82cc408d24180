pub mod camera;
pub mod collision;
pub mod config;
pub mod entities;
pub mod events;
pub mod physics;
pub mod player;
pub mod powerups;
pub mod run;
pub mod scoring;
pub mod world_gen;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use skyhop_core::game_trait::{GameMetadata, Services, Simulation};
use skyhop_core::services::{EffectSink, ScoreStore};
use skyhop_core::simulation_boilerplate;
use skyhop_core::time::Millis;
use skyhop_core::timers::TimerQueue;

use camera::Camera;
use collision::CollisionScene;
use config::JumperConfig;
use entities::{PlatformKind, World};
use events::{Cue, Deferred, EndCause, GameOverSummary, Loop, RunEvent};
use player::{JumperInput, Overlay, PlayerState, Pose};
use powerups::{PowerupKind, PowerupState, PowerupTimers};
use run::RunState;
use world_gen::{GenerationView, WorldGenerator};

/// Store key for the best score.
pub const HIGH_SCORE_KEY: &str = "skyhop.high_score";
/// Store key for the height reached in the best-scoring run.
pub const HIGH_HEIGHT_KEY: &str = "skyhop.high_height";

const DEFAULT_SEED: u64 = 42;

/// Everything the HUD draws, refreshed once per tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub height: i64,
    pub best_score: u64,
    pub combo_count: u32,
    pub combo_multiplier: f32,
    pub combo_visible: bool,
    pub powerup_status: Vec<String>,
    pub pose: Pose,
    pub overlay: Overlay,
    /// Player tint while any power-up is active.
    pub glow: bool,
}

/// Serializable run state for a presentation bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumperState {
    pub run: RunState,
    pub player: PlayerState,
    pub powerups: PowerupTimers,
    pub world: World,
    pub camera: Camera,
    pub hud: HudSnapshot,
}

impl JumperState {
    pub fn is_over(&self) -> bool {
        self.run.is_over()
    }
}

/// One single-player run of the vertical jumper.
pub struct JumpRun {
    config: JumperConfig,
    state: JumperState,
    generator: WorldGenerator,
    timers: TimerQueue<Deferred>,
    paused: bool,
    /// Fire control state on the previous tick, for edge detection.
    prev_shoot: bool,
    /// Cue names already reported as unavailable.
    missing_cues: HashSet<&'static str>,
}

impl JumpRun {
    /// Lay out the start platform and the first platforms above it, with
    /// the player standing over the start platform.
    pub fn new(config: JumperConfig, seed: u64) -> Self {
        let mut generator = WorldGenerator::new(seed, &config);
        let mut world = World::new(config.projectile.pool_capacity);
        generator.seed_initial_layout(&mut world, &config);

        let player = PlayerState::new(config.screen.width / 2.0, config.initial_player_y());
        let state = JumperState {
            run: RunState::default(),
            player,
            powerups: PowerupTimers::new(&config.powerup),
            world,
            camera: Camera::new(&config.screen),
            hud: HudSnapshot::default(),
        };
        Self {
            config,
            state,
            generator,
            timers: TimerQueue::new(),
            paused: false,
            prev_shoot: false,
            missing_cues: HashSet::new(),
        }
    }

    pub fn state(&self) -> &JumperState {
        &self.state
    }

    pub fn hud(&self) -> &HudSnapshot {
        &self.state.hud
    }

    pub fn config(&self) -> &JumperConfig {
        &self.config
    }

    /// Direct access to the entity collections, for custom layouts.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.state.world
    }

    /// Names of cues the effect sink refused so far, sorted.
    pub fn unavailable_cues(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.missing_cues.iter().copied().collect();
        names.sort_unstable();
        names
    }

    fn fire_due_timers(&mut self, now: Millis, events: &mut Vec<RunEvent>, outbox: &mut Vec<Cue>) {
        for action in self.timers.drain_due(now) {
            match action {
                Deferred::BreakPlatform(id) => {
                    if let Some(platform) = self.state.world.platform_mut(id) {
                        platform.destroyed = true;
                        outbox.push(Cue::PlatformBreak {
                            x: platform.x,
                            y: platform.y,
                        });
                        events.push(RunEvent::PlatformBroken { platform: id });
                    }
                },
                Deferred::ReleaseSpring(id) => {
                    if let Some(platform) = self.state.world.platform_mut(id)
                        && let PlatformKind::Spring { compressed } = &mut platform.kind
                    {
                        *compressed = false;
                        outbox.push(Cue::SpringReleased { platform: id });
                    }
                },
                Deferred::EndShootPose => self.state.player.shooting = false,
                Deferred::ExpireProjectile(id) => {
                    if self.state.world.recycle_projectile(id).is_some() {
                        tracing::trace!(id, "Projectile lifetime ended");
                    }
                },
            }
        }
    }

    fn tick_powerups(&mut self, now: Millis, events: &mut Vec<RunEvent>, outbox: &mut Vec<Cue>) {
        let tick = self.state.powerups.tick(now);
        for kind in &tick.expired {
            match kind {
                PowerupKind::Jetpack => {
                    self.state
                        .player
                        .loops
                        .set(Loop::JetpackThrust, false, outbox)
                },
                PowerupKind::PropellerHat => {
                    self.state
                        .player
                        .loops
                        .set(Loop::PropellerSpin, false, outbox)
                },
                PowerupKind::SpringShoes => {},
            }
        }
        if let Some(change) = tick.transition {
            events.push(RunEvent::PowerupChanged {
                from: change.from,
                to: change.to,
            });
        }
    }

    /// Fire on the rising edge of the fire control, subject to cooldown.
    fn handle_shooting(
        &mut self,
        now: Millis,
        input: &JumperInput,
        events: &mut Vec<RunEvent>,
        outbox: &mut Vec<Cue>,
    ) {
        let held = input.shoot_held();
        let pressed = held && !self.prev_shoot;
        self.prev_shoot = held;

        let cfg = &self.config;
        let player = &mut self.state.player;
        if !pressed || !player.can_shoot(now, cfg.player.shoot_cooldown_ms) {
            return;
        }
        player.last_shot_ms = Some(now);
        player.shooting = true;
        let id = self.state.world.issue_projectile(
            player.x,
            player.y - cfg.projectile.spawn_offset_y,
            -cfg.projectile.speed,
        );
        self.timers
            .schedule(now + cfg.player.shoot_pose_ms, Deferred::EndShootPose);
        self.timers.schedule(
            now + cfg.projectile.lifetime_ms,
            Deferred::ExpireProjectile(id),
        );
        outbox.push(Cue::Shoot);
        events.push(RunEvent::ProjectileFired { projectile: id });
    }

    fn move_player(&mut self, now: Millis, input: &JumperInput, outbox: &mut Vec<Cue>) {
        let cfg = &self.config;
        let state = &mut self.state;
        state.player.steer(input, cfg.player.move_speed);
        let thrust = state
            .player
            .drive_vertical(&state.powerups, input, now, cfg);
        state.player.loops.set(Loop::JetpackThrust, thrust, outbox);
        let spinning = state.powerups.current() == PowerupState::PropellerHat;
        state
            .player
            .loops
            .set(Loop::PropellerSpin, spinning, outbox);
    }

    fn recycle_offscreen_projectiles(&mut self) {
        let cfg = &self.config.projectile;
        let top = self.state.camera.top() - cfg.recycle_above;
        let bottom = self.state.camera.bottom() + cfg.recycle_below;
        let gone: Vec<_> = self
            .state
            .world
            .projectiles
            .iter()
            .filter(|p| p.y < top || p.y > bottom)
            .map(|p| p.id)
            .collect();
        for id in gone {
            self.state.world.recycle_projectile(id);
        }
    }

    fn generate(&mut self) {
        let state = &mut self.state;
        let view = GenerationView {
            camera_top: state.camera.top(),
            camera_bottom: state.camera.bottom(),
            player_y: state.player.y,
            player_vy: state.player.vy,
            highest_height: state.run.highest_height,
        };
        self.generator.advance(&view, &mut state.world, &self.config);
        let removed = world_gen::cleanup(&mut state.world, state.camera.bottom(), &self.config);
        if removed.platforms + removed.enemies + removed.powerups > 0 {
            tracing::trace!(
                platforms = removed.platforms,
                enemies = removed.enemies,
                powerups = removed.powerups,
                "Cleaned up entities below camera"
            );
        }
    }

    /// Track height, award new-best height points, and end the run when
    /// the player falls below the start platform. Returns whether it ended.
    fn update_height(&mut self, events: &mut Vec<RunEvent>) -> bool {
        let cfg = &self.config;
        let run = &mut self.state.run;
        let player = &self.state.player;
        let height = RunState::height_at(cfg.initial_player_y(), player.y, cfg.scoring.height_unit);

        let below_start = player.y > cfg.starting_platform_y() + cfg.scoring.game_over_buffer;
        if below_start && player.vy > 0.0 {
            run.current_height = height;
            return run.end(EndCause::FellBelowStart);
        }
        if run.record_height(height) {
            run.add_points(cfg.scoring.height_score);
            events.push(RunEvent::NewHeight { height });
        }
        false
    }

    /// Terminal bookkeeping: stop the player, persist a new best score and
    /// drop every entity.
    fn finish_run(
        &mut self,
        store: &mut dyn ScoreStore,
        events: &mut Vec<RunEvent>,
        outbox: &mut Vec<Cue>,
    ) {
        let state = &mut self.state;
        state.player.die(outbox);
        if let Some(change) = state.powerups.clear() {
            events.push(RunEvent::PowerupChanged {
                from: change.from,
                to: change.to,
            });
        }

        let score = state.run.score;
        let previous_best = stored_best(store);
        let new_best = score > previous_best;
        if new_best {
            let saved = store
                .set_number(HIGH_SCORE_KEY, score as f64)
                .and_then(|()| {
                    store.set_number(HIGH_HEIGHT_KEY, state.run.highest_height as f64)
                });
            if let Err(e) = saved {
                tracing::warn!(error = %e, "Failed to persist high score");
            }
        }
        let best_score = score.max(previous_best);
        state.hud.best_score = best_score;

        let cause = state.run.end_cause.unwrap_or(EndCause::FellBelowStart);
        events.push(RunEvent::GameOver(GameOverSummary {
            score,
            highest_height: state.run.highest_height,
            best_score,
            new_best,
            cause,
        }));
        outbox.push(Cue::GameOver);

        state.world.clear();
        self.timers.clear();
        tracing::info!(
            score,
            highest_height = state.run.highest_height,
            new_best,
            ?cause,
            "Run over"
        );
    }

    fn refresh_hud(&mut self) {
        let cfg = &self.config.scoring;
        let state = &mut self.state;
        let combo = &state.run.combo;
        let best_score = state.hud.best_score.max(state.run.score);
        state.hud = HudSnapshot {
            score: state.run.score,
            height: state.run.display_height(),
            best_score,
            combo_count: combo.count,
            combo_multiplier: combo.multiplier(cfg),
            combo_visible: combo.is_visible(),
            powerup_status: state.powerups.status_lines(),
            pose: state.player.pose,
            overlay: Overlay::from(state.powerups.current()),
            glow: state.powerups.any_active(),
        };
    }

    /// Hand buffered cues to the sink. A cue the sink cannot play is
    /// reported once per cue name and otherwise ignored.
    fn flush_cues(&mut self, outbox: Vec<Cue>, effects: &mut dyn EffectSink<Cue>) {
        for cue in outbox {
            if let Err(e) = effects.emit(&cue)
                && self.missing_cues.insert(cue.name())
            {
                tracing::warn!(cue = cue.name(), error = %e, "Effect unavailable");
            }
        }
    }

    /// One tick of gameplay, stopping early once the run ends.
    fn advance(
        &mut self,
        dt: f32,
        now: Millis,
        input: &JumperInput,
        store: &mut dyn ScoreStore,
        events: &mut Vec<RunEvent>,
        outbox: &mut Vec<Cue>,
    ) {
        self.fire_due_timers(now, events, outbox);
        self.tick_powerups(now, events, outbox);
        self.handle_shooting(now, input, events, outbox);
        self.move_player(now, input, outbox);

        let current = self.state.powerups.current();
        if let Some((from, to)) = self.state.player.sync_pose(current) {
            events.push(RunEvent::PoseChanged { from, to });
        }

        let cfg = &self.config;
        let state = &mut self.state;
        physics::integrate_player(&mut state.player, cfg.player.gravity, dt);
        physics::step_world(&mut state.world, cfg, dt);
        state
            .player
            .clamp_to_screen(cfg.screen.width, cfg.player_half_width());

        let overlaps = physics::detect_overlaps(&state.player, &state.world, cfg);
        CollisionScene {
            now,
            config: cfg,
            player: &mut state.player,
            powerups: &mut state.powerups,
            world: &mut state.world,
            run: &mut state.run,
            timers: &mut self.timers,
            outbox: &mut *outbox,
            events: &mut *events,
        }
        .resolve(&overlaps);
        if state.run.is_over() {
            self.finish_run(store, events, outbox);
            return;
        }

        self.recycle_offscreen_projectiles();
        let state = &mut self.state;
        state
            .camera
            .follow(state.player.y, state.player.vy, &self.config.camera);
        self.generate();

        if self.update_height(events) {
            self.finish_run(store, events, outbox);
            return;
        }

        if self.state.run.combo.decay(now, &self.config.scoring) {
            events.push(RunEvent::ComboEnded);
        }
        self.state.world.prune();
    }
}

impl Default for JumpRun {
    fn default() -> Self {
        Self::new(JumperConfig::default(), DEFAULT_SEED)
    }
}

fn stored_best(store: &dyn ScoreStore) -> u64 {
    store
        .get_number(HIGH_SCORE_KEY)
        .filter(|v| v.is_finite() && *v > 0.0)
        .map_or(0, |v| v as u64)
}

impl Simulation for JumpRun {
    type Input = JumperInput;
    type Cue = Cue;
    type Event = RunEvent;

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Skyhop".to_string(),
            description: "Bounce up an endless tower of platforms".to_string(),
        }
    }

    fn start(&mut self, now_ms: Millis, services: &mut Services<'_, Cue>) {
        if !self.state.run.start() {
            tracing::debug!("Run already started");
            return;
        }
        self.state.hud.best_score = stored_best(&*services.store);

        let mut outbox = vec![Cue::Music];
        let state = &mut self.state;
        state
            .player
            .jump(None, &state.powerups, &self.config, &mut outbox);
        self.refresh_hud();
        self.flush_cues(outbox, &mut *services.effects);
        tracing::info!(
            now_ms,
            best_score = self.state.hud.best_score,
            platforms = self.state.world.platforms.len(),
            "Run started"
        );
    }

    fn update(
        &mut self,
        dt: f32,
        now_ms: Millis,
        input: &JumperInput,
        services: &mut Services<'_, Cue>,
    ) -> Vec<RunEvent> {
        if self.paused || !self.state.run.is_running() {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut outbox = Vec::new();
        self.advance(
            dt,
            now_ms,
            input,
            &mut *services.store,
            &mut events,
            &mut outbox,
        );
        self.refresh_hud();
        self.flush_cues(outbox, &mut *services.effects);
        events
    }

    simulation_boilerplate!();
}
