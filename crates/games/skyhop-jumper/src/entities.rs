use serde::{Deserialize, Serialize};

use skyhop_core::pool::{EntityPool, Poolable, Release};
use skyhop_core::random::WeightedTable;

use crate::config::{JumperConfig, PlatformConfig};
use crate::physics::Aabb;
use crate::powerups::PowerupKind;

/// Identifier for every spawned platform, enemy, pickup and projectile.
pub type EntityId = u64;

/// Platform type without its per-kind state; used for rolls and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformType {
    Normal,
    Breaking,
    Moving,
    Spring,
}

impl PlatformType {
    /// Normal, breaking and moving by weight; spring takes the remainder.
    pub fn spawn_table(cfg: &PlatformConfig) -> WeightedTable<PlatformType> {
        WeightedTable::new(
            vec![
                (PlatformType::Normal, cfg.normal_chance),
                (PlatformType::Breaking, cfg.breaking_chance),
                (PlatformType::Moving, cfg.moving_chance),
            ],
            Some(PlatformType::Spring),
        )
    }
}

/// Platform kind with its mutable per-kind state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    Normal,
    Breaking {
        has_been_stepped: bool,
    },
    Moving {
        direction: f32,
        speed: f32,
        min_x: f32,
        max_x: f32,
    },
    Spring {
        compressed: bool,
    },
}

impl PlatformKind {
    /// Fresh state for `ty`. `direction` only matters for moving platforms.
    pub fn new(ty: PlatformType, direction: f32, cfg: &JumperConfig) -> Self {
        match ty {
            PlatformType::Normal => PlatformKind::Normal,
            PlatformType::Breaking => PlatformKind::Breaking {
                has_been_stepped: false,
            },
            PlatformType::Moving => {
                let half = cfg.platform.width / 2.0;
                PlatformKind::Moving {
                    direction,
                    speed: cfg.platform.moving_speed,
                    min_x: half + cfg.platform.moving_edge_padding,
                    max_x: cfg.screen.width - half - cfg.platform.moving_edge_padding,
                }
            },
            PlatformType::Spring => PlatformKind::Spring { compressed: false },
        }
    }

    pub fn platform_type(&self) -> PlatformType {
        match self {
            PlatformKind::Normal => PlatformType::Normal,
            PlatformKind::Breaking { .. } => PlatformType::Breaking,
            PlatformKind::Moving { .. } => PlatformType::Moving,
            PlatformKind::Spring { .. } => PlatformType::Spring,
        }
    }
}

/// A platform, centered on (x, y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub kind: PlatformKind,
    pub destroyed: bool,
}

impl Platform {
    pub fn is_live(&self) -> bool {
        !self.destroyed
    }

    /// Horizontal oscillation for moving platforms, reversing at each bound.
    pub fn advance(&mut self, dt: f32) {
        if self.destroyed {
            return;
        }
        if let PlatformKind::Moving {
            direction,
            speed,
            min_x,
            max_x,
        } = &mut self.kind
        {
            self.x += *direction * *speed * dt;
            if self.x <= *min_x {
                self.x = *min_x;
                *direction = 1.0;
            } else if self.x >= *max_x {
                self.x = *max_x;
                *direction = -1.0;
            }
        }
    }

    pub fn bounds(&self, cfg: &PlatformConfig) -> Aabb {
        Aabb::from_center(self.x, self.y, cfg.width, cfg.height)
    }
}

/// A stationary enemy, anchored at its feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub direction: f32,
    pub dead: bool,
}

impl Enemy {
    pub fn is_live(&self) -> bool {
        !self.dead
    }
}

/// A pickup floating above a platform, centered on (x, y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnedPowerup {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub kind: PowerupKind,
    pub collected: bool,
}

impl SpawnedPowerup {
    pub fn is_live(&self) -> bool {
        !self.collected
    }
}

/// A player bullet, centered on (x, y).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub active: bool,
}

impl Poolable for Projectile {
    fn deactivate(&mut self) {
        self.active = false;
        self.vx = 0.0;
        self.vy = 0.0;
    }
}

/// Every entity collection of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub powerups: Vec<SpawnedPowerup>,
    pub projectiles: Vec<Projectile>,
    pub projectile_pool: EntityPool<Projectile>,
    next_id: EntityId,
}

impl World {
    pub fn new(pool_capacity: usize) -> Self {
        Self {
            platforms: Vec::new(),
            enemies: Vec::new(),
            powerups: Vec::new(),
            projectiles: Vec::new(),
            projectile_pool: EntityPool::with_capacity(pool_capacity),
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_platform(&mut self, x: f32, y: f32, kind: PlatformKind) -> EntityId {
        let id = self.alloc_id();
        self.platforms.push(Platform {
            id,
            x,
            y,
            kind,
            destroyed: false,
        });
        id
    }

    pub fn spawn_enemy(&mut self, x: f32, y: f32, direction: f32) -> EntityId {
        let id = self.alloc_id();
        self.enemies.push(Enemy {
            id,
            x,
            y,
            direction,
            dead: false,
        });
        id
    }

    pub fn spawn_powerup(&mut self, x: f32, y: f32, kind: PowerupKind) -> EntityId {
        let id = self.alloc_id();
        self.powerups.push(SpawnedPowerup {
            id,
            x,
            y,
            kind,
            collected: false,
        });
        id
    }

    /// Issue a projectile, reusing a pooled instance when one is parked.
    /// Every issuance gets a fresh id.
    pub fn issue_projectile(&mut self, x: f32, y: f32, vy: f32) -> EntityId {
        let id = self.alloc_id();
        let mut projectile = self.projectile_pool.acquire().unwrap_or_default();
        projectile.id = id;
        projectile.x = x;
        projectile.y = y;
        projectile.vx = 0.0;
        projectile.vy = vy;
        projectile.active = true;
        self.projectiles.push(projectile);
        id
    }

    /// Take an in-flight projectile out of play and hand it back to the pool.
    pub fn recycle_projectile(&mut self, id: EntityId) -> Option<Release> {
        let idx = self.projectiles.iter().position(|p| p.id == id && p.active)?;
        let projectile = self.projectiles.swap_remove(idx);
        Some(self.projectile_pool.release(projectile))
    }

    pub fn platform_mut(&mut self, id: EntityId) -> Option<&mut Platform> {
        self.platforms.iter_mut().find(|p| p.id == id && p.is_live())
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id && e.is_live())
    }

    pub fn powerup_mut(&mut self, id: EntityId) -> Option<&mut SpawnedPowerup> {
        self.powerups.iter_mut().find(|p| p.id == id && p.is_live())
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id && p.active)
    }

    pub fn live_platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(|p| p.is_live())
    }

    /// Drop entities that were destroyed, defeated or collected.
    pub fn prune(&mut self) {
        self.platforms.retain(Platform::is_live);
        self.enemies.retain(Enemy::is_live);
        self.powerups.retain(SpawnedPowerup::is_live);
    }

    /// Remove everything, including parked projectiles.
    pub fn clear(&mut self) {
        self.platforms.clear();
        self.enemies.clear();
        self.powerups.clear();
        self.projectiles.clear();
        self.projectile_pool.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(cfg: &JumperConfig, direction: f32) -> PlatformKind {
        PlatformKind::new(PlatformType::Moving, direction, cfg)
    }

    #[test]
    fn moving_platform_reverses_at_bounds() {
        let cfg = JumperConfig::default();
        let mut world = World::new(4);
        let id = world.spawn_platform(75.0, 300.0, moving(&cfg, -1.0));
        let platform = world.platform_mut(id).unwrap();
        platform.advance(0.1);
        assert_eq!(platform.x, 70.0);
        assert!(matches!(platform.kind, PlatformKind::Moving { direction, .. } if direction == 1.0));
        platform.advance(0.1);
        assert!((platform.x - 78.0).abs() < 1e-4);
    }

    #[test]
    fn moving_platform_stays_within_screen() {
        let cfg = JumperConfig::default();
        let mut world = World::new(4);
        let id = world.spawn_platform(240.0, 300.0, moving(&cfg, 1.0));
        let platform = world.platform_mut(id).unwrap();
        for _ in 0..2_000 {
            platform.advance(1.0 / 60.0);
            assert!(platform.x >= 70.0 && platform.x <= 410.0);
        }
    }

    #[test]
    fn spawn_table_has_spring_remainder() {
        let table = PlatformType::spawn_table(&PlatformConfig::default());
        assert_eq!(table.pick_with_roll(60), Some(PlatformType::Normal));
        assert_eq!(table.pick_with_roll(75), Some(PlatformType::Breaking));
        assert_eq!(table.pick_with_roll(90), Some(PlatformType::Moving));
        assert_eq!(table.pick_with_roll(91), Some(PlatformType::Spring));
    }

    #[test]
    fn recycled_projectile_is_reissued_with_new_id() {
        let mut world = World::new(2);
        let first = world.issue_projectile(10.0, 20.0, -400.0);
        assert_eq!(world.recycle_projectile(first), Some(Release::Pooled));
        assert!(world.projectile(first).is_none());
        assert_eq!(world.projectile_pool.len(), 1);

        let second = world.issue_projectile(30.0, 40.0, -400.0);
        assert_ne!(first, second);
        assert!(world.projectile_pool.is_empty());
        let p = world.projectile(second).unwrap();
        assert_eq!((p.x, p.y, p.vy), (30.0, 40.0, -400.0));

        // A stale handle to the first issuance never touches the reissued one.
        assert_eq!(world.recycle_projectile(first), None);
        assert!(world.projectile(second).is_some());
    }

    #[test]
    fn full_pool_discards_returned_projectile() {
        let mut world = World::new(1);
        let a = world.issue_projectile(0.0, 0.0, -400.0);
        let b = world.issue_projectile(0.0, 0.0, -400.0);
        assert_eq!(world.recycle_projectile(a), Some(Release::Pooled));
        assert_eq!(world.recycle_projectile(b), Some(Release::Discarded));
        assert_eq!(world.projectile_pool.len(), 1);
        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn lookups_skip_dead_entities() {
        let mut world = World::new(1);
        let e = world.spawn_enemy(10.0, 10.0, 1.0);
        world.enemy_mut(e).unwrap().dead = true;
        assert!(world.enemy_mut(e).is_none());
        world.prune();
        assert!(world.enemies.is_empty());
    }
}
