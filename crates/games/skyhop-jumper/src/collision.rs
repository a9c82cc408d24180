use skyhop_core::time::Millis;
use skyhop_core::timers::TimerQueue;

use crate::config::JumperConfig;
use crate::entities::{EntityId, PlatformKind, World};
use crate::events::{Cue, DefeatCause, Deferred, EndCause, Loop, RunEvent};
use crate::player::PlayerState;
use crate::powerups::{PowerupKind, PowerupTimers};
use crate::run::RunState;

const STOMP_PARTICLES: u32 = 0xff0000;
const SHOT_PARTICLES: u32 = 0xff6600;
const STOMP_SHAKE: f32 = 100.0;
const SHOT_SHAKE: f32 = 50.0;

/// A pairwise overlap reported by the physics pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    PlayerPlatform(EntityId),
    PlayerEnemy(EntityId),
    PlayerPowerup(EntityId),
    ProjectileEnemy {
        projectile: EntityId,
        enemy: EntityId,
    },
}

/// Everything a collision handler may touch during one tick.
pub struct CollisionScene<'a> {
    pub now: Millis,
    pub config: &'a JumperConfig,
    pub player: &'a mut PlayerState,
    pub powerups: &'a mut PowerupTimers,
    pub world: &'a mut World,
    pub run: &'a mut RunState,
    pub timers: &'a mut TimerQueue<Deferred>,
    pub outbox: &'a mut Vec<Cue>,
    pub events: &'a mut Vec<RunEvent>,
}

impl CollisionScene<'_> {
    /// Turn overlaps into gameplay outcomes, in order. Overlaps that refer
    /// to something already gone are skipped.
    pub fn resolve(&mut self, overlaps: &[Overlap]) {
        for overlap in overlaps {
            match *overlap {
                Overlap::PlayerPlatform(id) => self.player_platform(id),
                Overlap::PlayerEnemy(id) => self.player_enemy(id),
                Overlap::PlayerPowerup(id) => self.player_powerup(id),
                Overlap::ProjectileEnemy { projectile, enemy } => {
                    self.projectile_enemy(projectile, enemy)
                },
            }
        }
    }

    fn player_in_play(&self) -> bool {
        self.run.is_running() && self.player.alive
    }

    /// Descending onto something whose anchor is below the feet.
    fn descending_onto(&self, y: f32) -> bool {
        self.player.vy > 0.0 && self.player.y < y
    }

    fn player_platform(&mut self, id: EntityId) {
        if !self.player_in_play() {
            return;
        }
        let (player_vy, player_y) = (self.player.vy, self.player.y);
        let Some(platform) = self.world.platform_mut(id) else {
            tracing::trace!(id, "Overlap with removed platform");
            return;
        };
        if !(player_vy > 0.0 && player_y < platform.y) {
            return;
        }

        let cfg = self.config;
        let kind = platform.kind.platform_type();
        match &mut platform.kind {
            PlatformKind::Normal | PlatformKind::Moving { .. } => {
                self.player.jump(None, self.powerups, cfg, self.outbox);
            },
            PlatformKind::Breaking { has_been_stepped } => {
                if *has_been_stepped {
                    return;
                }
                *has_been_stepped = true;
                self.player.jump(None, self.powerups, cfg, self.outbox);
                self.timers.schedule(
                    self.now + cfg.platform.break_delay_ms,
                    Deferred::BreakPlatform(id),
                );
            },
            PlatformKind::Spring { compressed } => {
                *compressed = true;
                self.player.spring_jump(self.powerups, cfg, self.outbox);
                self.outbox.push(Cue::SpringCompressed { platform: id });
                self.timers.schedule(
                    self.now + cfg.platform.spring_compress_ms,
                    Deferred::ReleaseSpring(id),
                );
            },
        }
        self.events.push(RunEvent::Landed { platform: id, kind });
    }

    fn player_enemy(&mut self, id: EntityId) {
        if !self.player_in_play() {
            return;
        }
        let Some(enemy_y) = self.world.enemy_mut(id).map(|e| e.y) else {
            tracing::trace!(id, "Overlap with defeated enemy");
            return;
        };

        if self.descending_onto(enemy_y) {
            self.player.jump(None, self.powerups, self.config, self.outbox);
            self.defeat_enemy(id, DefeatCause::Stomp);
        } else if self.run.end(EndCause::EnemyContact) {
            tracing::info!(enemy = id, "Lethal enemy contact");
        }
    }

    fn player_powerup(&mut self, id: EntityId) {
        if !self.player_in_play() {
            return;
        }
        let Some(pickup) = self.world.powerup_mut(id) else {
            return;
        };
        pickup.collected = true;
        let (kind, x, y) = (pickup.kind, pickup.x, pickup.y);
        let cfg = self.config;

        if let Some(change) = self.powerups.collect(kind, self.now, &cfg.powerup) {
            self.events.push(RunEvent::PowerupChanged {
                from: change.from,
                to: change.to,
            });
        }
        if kind == PowerupKind::Jetpack {
            self.player.vy = -cfg.powerup.jetpack_power;
            self.player.loops.set(Loop::JetpackThrust, true, self.outbox);
        }

        let points = cfg.scoring.powerup_points;
        self.run.add_points(points);
        self.outbox.push(Cue::PowerupCollect);
        self.outbox.push(Cue::PowerupBurst { x, y, kind });
        self.events.push(RunEvent::PowerupCollected { kind, points });
    }

    fn projectile_enemy(&mut self, projectile: EntityId, enemy: EntityId) {
        if !self.run.is_running()
            || self.world.projectile(projectile).is_none()
            || self.world.enemy_mut(enemy).is_none()
        {
            tracing::trace!(projectile, enemy, "Stale projectile hit");
            return;
        }
        self.world.recycle_projectile(projectile);
        self.defeat_enemy(enemy, DefeatCause::Projectile);
    }

    /// Shared stomp/shot path: mark dead, extend the combo, award points.
    fn defeat_enemy(&mut self, id: EntityId, cause: DefeatCause) {
        let Some(enemy) = self.world.enemy_mut(id) else {
            return;
        };
        enemy.dead = true;
        let (x, y) = (enemy.x, enemy.y);

        let scoring = &self.config.scoring;
        self.run.combo.register_kill(self.now, scoring);
        let base = match cause {
            DefeatCause::Stomp => scoring.stomp_points,
            DefeatCause::Projectile => scoring.bullet_points,
        };
        let points = self.run.combo.award(base, scoring);
        self.run.add_points(points);

        let (color, shake) = match cause {
            DefeatCause::Stomp => (STOMP_PARTICLES, STOMP_SHAKE),
            DefeatCause::Projectile => (SHOT_PARTICLES, SHOT_SHAKE),
        };
        self.outbox.push(Cue::EnemyDefeat { x, y, cause });
        self.outbox.push(Cue::Particles { x, y, color });
        self.outbox.push(Cue::ScreenShake { intensity: shake });
        self.events.push(RunEvent::EnemyDefeated {
            enemy: id,
            cause,
            points,
        });
    }
}
