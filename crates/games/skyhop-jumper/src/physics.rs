use serde::{Deserialize, Serialize};

use crate::collision::Overlap;
use crate::config::JumperConfig;
use crate::entities::{Projectile, World};
use crate::player::PlayerState;

/// Axis-aligned box in screen space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x - width / 2.0,
            top: y - height / 2.0,
            right: x + width / 2.0,
            bottom: y + height / 2.0,
        }
    }

    /// Box standing on (x, y), as for sprites with a feet origin.
    pub fn from_bottom_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x - width / 2.0,
            top: y - height,
            right: x + width / 2.0,
            bottom: y,
        }
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Arcade integration: gravity into velocity, then velocity into position.
pub fn integrate_player(player: &mut PlayerState, gravity: f32, dt: f32) {
    if !player.alive {
        return;
    }
    player.vy += gravity * dt;
    player.x += player.vx * dt;
    player.y += player.vy * dt;
}

pub fn integrate_projectile(projectile: &mut Projectile, gravity: f32, dt: f32) {
    if !projectile.active {
        return;
    }
    projectile.vy += gravity * dt;
    projectile.x += projectile.vx * dt;
    projectile.y += projectile.vy * dt;
}

/// Move everything in the world that moves on its own.
pub fn step_world(world: &mut World, cfg: &JumperConfig, dt: f32) {
    for platform in &mut world.platforms {
        platform.advance(dt);
    }
    for projectile in &mut world.projectiles {
        integrate_projectile(projectile, cfg.projectile.gravity, dt);
    }
}

pub fn player_bounds(player: &PlayerState, cfg: &JumperConfig) -> Aabb {
    Aabb::from_bottom_center(
        player.x,
        player.y,
        cfg.player.body_width,
        cfg.player.body_height,
    )
}

/// Collect every overlap pair for this tick, in a stable order: platforms,
/// enemies, pickups, then projectile hits.
pub fn detect_overlaps(player: &PlayerState, world: &World, cfg: &JumperConfig) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    if player.alive {
        let body = player_bounds(player, cfg);
        overlaps.extend(
            world
                .platforms
                .iter()
                .filter(|p| p.is_live() && body.overlaps(&p.bounds(&cfg.platform)))
                .map(|p| Overlap::PlayerPlatform(p.id)),
        );
        overlaps.extend(
            world
                .enemies
                .iter()
                .filter(|e| {
                    e.is_live()
                        && body.overlaps(&Aabb::from_bottom_center(
                            e.x,
                            e.y,
                            cfg.enemy.width,
                            cfg.enemy.height,
                        ))
                })
                .map(|e| Overlap::PlayerEnemy(e.id)),
        );
        overlaps.extend(
            world
                .powerups
                .iter()
                .filter(|p| {
                    p.is_live()
                        && body.overlaps(&Aabb::from_center(
                            p.x,
                            p.y,
                            cfg.powerup.size,
                            cfg.powerup.size,
                        ))
                })
                .map(|p| Overlap::PlayerPowerup(p.id)),
        );
    }

    for projectile in world.projectiles.iter().filter(|p| p.active) {
        let shot = Aabb::from_center(
            projectile.x,
            projectile.y,
            cfg.projectile.size,
            cfg.projectile.size,
        );
        for enemy in world.enemies.iter().filter(|e| e.is_live()) {
            let target =
                Aabb::from_bottom_center(enemy.x, enemy.y, cfg.enemy.width, cfg.enemy.height);
            if shot.overlaps(&target) {
                overlaps.push(Overlap::ProjectileEnemy {
                    projectile: projectile.id,
                    enemy: enemy.id,
                });
            }
        }
    }

    overlaps
}
