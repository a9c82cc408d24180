use rand::rngs::StdRng;
use rand::SeedableRng;

use skyhop_core::random::{WeightedTable, random_sign, range_f32, roll_percent};

use crate::config::JumperConfig;
use crate::entities::{EntityId, PlatformKind, PlatformType, World};
use crate::powerups::PowerupKind;

/// What the generator sees of the run each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationView {
    pub camera_top: f32,
    pub camera_bottom: f32,
    pub player_y: f32,
    pub player_vy: f32,
    pub highest_height: i64,
}

/// Height-scaled generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub multiplier: f32,
    /// Enemy spawn chance in percent.
    pub enemy_chance: f32,
    pub platform_spacing: f32,
}

impl Difficulty {
    pub fn at_height(highest_height: i64, cfg: &JumperConfig) -> Self {
        let gen_cfg = &cfg.generation;
        let height = highest_height.max(0) as f32;
        let multiplier = (1.0 + height / gen_cfg.difficulty_height).min(gen_cfg.max_difficulty);
        Self {
            multiplier,
            enemy_chance: (cfg.enemy.spawn_chance * multiplier).min(cfg.enemy.spawn_chance_cap),
            platform_spacing: (gen_cfg.platform_spacing - height / gen_cfg.spacing_height_divisor)
                .max(gen_cfg.min_platform_spacing),
        }
    }
}

/// Outcome of one upward placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Placed(EntityId),
    /// Every attempt collided with an existing platform; nothing was placed.
    Exhausted,
}

/// Counters for one generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub placed: u32,
    pub exhausted: u32,
    pub rescues: u32,
    pub enemies: u32,
    pub powerups: u32,
}

/// Counters for one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub platforms: usize,
    pub enemies: usize,
    pub powerups: usize,
}

/// Endless procedural placement of platforms, enemies and pickups.
pub struct WorldGenerator {
    rng: StdRng,
    platform_table: WeightedTable<PlatformType>,
    powerup_table: WeightedTable<PowerupKind>,
    /// y of the most recent upward placement attempt.
    cursor_y: f32,
    /// y of the most recent platform placed under a falling player.
    last_rescue_y: Option<f32>,
}

impl WorldGenerator {
    pub fn new(seed: u64, cfg: &JumperConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            platform_table: PlatformType::spawn_table(&cfg.platform),
            powerup_table: PowerupKind::spawn_table(&cfg.powerup),
            cursor_y: cfg.starting_platform_y(),
            last_rescue_y: None,
        }
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    /// Move the upward cursor, e.g. after laying out a custom world.
    pub fn set_cursor_y(&mut self, y: f32) {
        self.cursor_y = y;
    }

    /// Start platform under the spawn point plus a few random platforms above
    /// it. Returns the start platform id.
    pub fn seed_initial_layout(&mut self, world: &mut World, cfg: &JumperConfig) -> EntityId {
        let start_y = cfg.starting_platform_y();
        let start = world.spawn_platform(cfg.screen.width / 2.0, start_y, PlatformKind::Normal);
        self.cursor_y = start_y;

        let margin = cfg.platform.initial_edge_margin;
        for i in 1..=cfg.platform.initial_count {
            let x = range_f32(&mut self.rng, margin, cfg.screen.width - margin);
            let y = start_y - i as f32 * cfg.generation.platform_spacing;
            let kind = self.roll_platform_kind(cfg);
            world.spawn_platform(x, y, kind);
            self.cursor_y = y;
        }
        start
    }

    /// One generation pass: rescue platform for a falling player, then fill
    /// upward until the frontier above the camera is covered.
    pub fn advance(
        &mut self,
        view: &GenerationView,
        world: &mut World,
        cfg: &JumperConfig,
    ) -> GenerationReport {
        let difficulty = Difficulty::at_height(view.highest_height, cfg);
        let mut report = GenerationReport::default();

        if self.place_rescue(view, &difficulty, world, cfg).is_some() {
            report.rescues += 1;
        }

        let frontier = view.camera_top - cfg.generation.frontier_margin;
        let mut passes = 0;
        while self.cursor_y > frontier && passes < cfg.generation.max_placements_per_pass {
            passes += 1;
            let before = (world.enemies.len(), world.powerups.len());
            match self.try_place_upward(&difficulty, world, cfg) {
                Placement::Placed(_) => report.placed += 1,
                Placement::Exhausted => report.exhausted += 1,
            }
            report.enemies += (world.enemies.len() - before.0) as u32;
            report.powerups += (world.powerups.len() - before.1) as u32;
        }

        if report != GenerationReport::default() {
            tracing::debug!(
                placed = report.placed,
                exhausted = report.exhausted,
                rescues = report.rescues,
                cursor_y = self.cursor_y,
                spacing = difficulty.platform_spacing,
                "Generation pass"
            );
        }
        report
    }

    /// Step the cursor up by the spacing and look for a spot clear of every
    /// live platform, up to `placement_attempts` times. On success also roll
    /// an enemy and a pickup above the new platform.
    pub fn try_place_upward(
        &mut self,
        difficulty: &Difficulty,
        world: &mut World,
        cfg: &JumperConfig,
    ) -> Placement {
        let gen_cfg = &cfg.generation;
        let (lo, hi) = (gen_cfg.edge_margin, cfg.screen.width - gen_cfg.edge_margin);

        let mut spot = None;
        for _ in 0..gen_cfg.placement_attempts {
            self.cursor_y -= difficulty.platform_spacing;
            let x = range_f32(&mut self.rng, lo, hi);
            if is_clear(world, x, self.cursor_y, gen_cfg.min_platform_distance) {
                spot = Some((x, self.cursor_y));
                break;
            }
        }
        let Some((x, y)) = spot else {
            tracing::trace!(cursor_y = self.cursor_y, "No clear spot for platform");
            return Placement::Exhausted;
        };

        let kind = self.roll_platform_kind(cfg);
        let id = world.spawn_platform(x, y, kind);

        if roll_percent(&mut self.rng, difficulty.enemy_chance) {
            let ex = range_f32(&mut self.rng, lo, hi);
            let direction = random_sign(&mut self.rng);
            world.spawn_enemy(ex, y - cfg.enemy.spawn_offset_y, direction);
        }
        if let Some(kind) = self.powerup_table.pick(&mut self.rng) {
            let px = range_f32(&mut self.rng, lo, hi);
            world.spawn_powerup(px, y - cfg.powerup.spawn_offset_y, kind);
        }
        Placement::Placed(id)
    }

    /// Drop a platform just below the camera for a player falling near its
    /// bottom edge, unless one was already placed within a spacing of that
    /// depth. The spot must keep the minimum distance to live platforms.
    fn place_rescue(
        &mut self,
        view: &GenerationView,
        difficulty: &Difficulty,
        world: &mut World,
        cfg: &JumperConfig,
    ) -> Option<EntityId> {
        let gen_cfg = &cfg.generation;
        let falling_low =
            view.player_vy > 0.0 && view.player_y > view.camera_bottom - gen_cfg.rescue_trigger_margin;
        if !falling_low {
            return None;
        }
        let y = view.camera_bottom + gen_cfg.rescue_offset;
        if self
            .last_rescue_y
            .is_some_and(|last| (last - y).abs() < difficulty.platform_spacing)
        {
            return None;
        }

        let (lo, hi) = (gen_cfg.edge_margin, cfg.screen.width - gen_cfg.edge_margin);
        let x = (0..gen_cfg.placement_attempts)
            .map(|_| range_f32(&mut self.rng, lo, hi))
            .find(|&x| is_clear(world, x, y, gen_cfg.min_platform_distance));
        let Some(x) = x else {
            // Something already sits at that depth.
            tracing::trace!(y, "No clear spot for rescue platform");
            return None;
        };
        let kind = self.roll_platform_kind(cfg);
        let id = world.spawn_platform(x, y, kind);
        self.last_rescue_y = Some(y);
        tracing::debug!(x, y, "Placed rescue platform");
        Some(id)
    }

    fn roll_platform_kind(&mut self, cfg: &JumperConfig) -> PlatformKind {
        let ty = self
            .platform_table
            .pick(&mut self.rng)
            .unwrap_or(PlatformType::Normal);
        let direction = random_sign(&mut self.rng);
        PlatformKind::new(ty, direction, cfg)
    }
}

fn is_clear(world: &World, x: f32, y: f32, min_distance: f32) -> bool {
    world.live_platforms().all(|p| {
        let (dx, dy) = (p.x - x, p.y - y);
        (dx * dx + dy * dy).sqrt() >= min_distance
    })
}

/// Remove entities that fell far below the camera. Anything above the
/// camera bottom is kept regardless of the player's position.
pub fn cleanup(world: &mut World, camera_bottom: f32, cfg: &JumperConfig) -> CleanupReport {
    let before = (
        world.platforms.len(),
        world.enemies.len(),
        world.powerups.len(),
    );
    let platform_limit = camera_bottom + cfg.platform.cleanup_distance;
    let enemy_limit = camera_bottom + cfg.enemy.cleanup_distance;
    let powerup_limit = camera_bottom + cfg.powerup.cleanup_distance;
    world.platforms.retain(|p| p.y <= platform_limit);
    world.enemies.retain(|e| e.y <= enemy_limit);
    world.powerups.retain(|p| p.y <= powerup_limit);

    let report = CleanupReport {
        platforms: before.0 - world.platforms.len(),
        enemies: before.1 - world.enemies.len(),
        powerups: before.2 - world.powerups.len(),
    };
    if report != CleanupReport::default() {
        tracing::debug!(
            platforms = report.platforms,
            enemies = report.enemies,
            powerups = report.powerups,
            "Cleaned up entities below camera"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(camera_top: f32) -> GenerationView {
        GenerationView {
            camera_top,
            camera_bottom: camera_top + 800.0,
            player_y: camera_top + 300.0,
            player_vy: -100.0,
            highest_height: 0,
        }
    }

    fn min_pairwise_distance(world: &World) -> f32 {
        let live: Vec<_> = world.live_platforms().collect();
        let mut min = f32::INFINITY;
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                min = min.min(d);
            }
        }
        min
    }

    #[test]
    fn difficulty_scales_and_caps() {
        let cfg = JumperConfig::default();
        let base = Difficulty::at_height(0, &cfg);
        assert_eq!(base.multiplier, 1.0);
        assert_eq!(base.enemy_chance, 5.0);
        assert_eq!(base.platform_spacing, 100.0);

        let mid = Difficulty::at_height(500, &cfg);
        assert_eq!(mid.multiplier, 1.5);
        assert_eq!(mid.enemy_chance, 7.5);
        assert_eq!(mid.platform_spacing, 90.0);

        let high = Difficulty::at_height(100_000, &cfg);
        assert_eq!(high.multiplier, 2.0);
        assert_eq!(high.enemy_chance, 10.0);
        assert_eq!(high.platform_spacing, 50.0);
    }

    #[test]
    fn enemy_chance_respects_cap() {
        let mut cfg = JumperConfig::default();
        cfg.enemy.spawn_chance = 15.0;
        assert_eq!(Difficulty::at_height(2_000, &cfg).enemy_chance, 20.0);
    }

    #[test]
    fn initial_layout_stacks_platforms_above_start() {
        let cfg = JumperConfig::default();
        let mut world = World::new(cfg.projectile.pool_capacity);
        let mut generator = WorldGenerator::new(7, &cfg);
        let start = generator.seed_initial_layout(&mut world, &cfg);

        assert_eq!(world.platforms.len(), 6);
        let first = &world.platforms[0];
        assert_eq!(first.id, start);
        assert_eq!((first.x, first.y), (240.0, 750.0));
        assert_eq!(first.kind, PlatformKind::Normal);
        for (i, p) in world.platforms.iter().enumerate().skip(1) {
            assert_eq!(p.y, 750.0 - i as f32 * 100.0);
            assert!(p.x >= 60.0 && p.x <= 420.0);
        }
        assert_eq!(generator.cursor_y(), 250.0);
    }

    #[test]
    fn advance_fills_up_to_frontier() {
        let cfg = JumperConfig::default();
        let mut world = World::new(cfg.projectile.pool_capacity);
        let mut generator = WorldGenerator::new(11, &cfg);
        generator.seed_initial_layout(&mut world, &cfg);

        let report = generator.advance(&view(-1_000.0), &mut world, &cfg);
        assert!(report.placed > 0);
        assert!(generator.cursor_y() <= -1_200.0);
        assert!(world.platforms.iter().any(|p| p.y < -1_000.0));
    }

    #[test]
    fn ten_placements_keep_minimum_distance() {
        let cfg = JumperConfig::default();
        for seed in 0..20 {
            let mut world = World::new(cfg.projectile.pool_capacity);
            let mut generator = WorldGenerator::new(seed, &cfg);
            let difficulty = Difficulty::at_height(0, &cfg);
            generator.set_cursor_y(1_000.0);
            for _ in 0..10 {
                generator.try_place_upward(&difficulty, &mut world, &cfg);
            }
            assert!(min_pairwise_distance(&world) >= 60.0, "seed {seed}");
        }
    }

    #[test]
    fn exhausted_attempts_place_nothing() {
        let mut cfg = JumperConfig::default();
        // x is pinned to 80 and every candidate y is within reach of a blocker.
        cfg.screen.width = 160.0;
        cfg.generation.edge_margin = 80.0;
        cfg.generation.platform_spacing = 20.0;
        cfg.generation.min_platform_spacing = 20.0;

        let mut world = World::new(cfg.projectile.pool_capacity);
        world.spawn_platform(80.0, 950.0, PlatformKind::Normal);
        world.spawn_platform(80.0, 850.0, PlatformKind::Normal);
        let mut generator = WorldGenerator::new(3, &cfg);
        generator.set_cursor_y(1_000.0);

        let difficulty = Difficulty::at_height(0, &cfg);
        let outcome = generator.try_place_upward(&difficulty, &mut world, &cfg);
        assert_eq!(outcome, Placement::Exhausted);
        assert_eq!(world.platforms.len(), 2);
        assert!(world.enemies.is_empty() && world.powerups.is_empty());
        assert_eq!(generator.cursor_y(), 800.0);
    }

    #[test]
    fn falling_player_gets_one_rescue_platform() {
        let cfg = JumperConfig::default();
        let mut world = World::new(cfg.projectile.pool_capacity);
        let mut generator = WorldGenerator::new(5, &cfg);
        generator.set_cursor_y(-10_000.0);

        let falling = GenerationView {
            camera_top: 0.0,
            camera_bottom: 800.0,
            player_y: 750.0,
            player_vy: 300.0,
            highest_height: 0,
        };
        let first = generator.advance(&falling, &mut world, &cfg);
        assert_eq!(first.rescues, 1);
        assert_eq!(world.platforms.len(), 1);
        assert_eq!(world.platforms[0].y, 900.0);

        let again = generator.advance(&falling, &mut world, &cfg);
        assert_eq!(again.rescues, 0);

        let deeper = GenerationView {
            camera_bottom: 1_000.0,
            player_y: 950.0,
            ..falling
        };
        assert_eq!(generator.advance(&deeper, &mut world, &cfg).rescues, 1);
    }

    #[test]
    fn later_fall_higher_up_gets_its_own_rescue() {
        let cfg = JumperConfig::default();
        let mut world = World::new(cfg.projectile.pool_capacity);
        let mut generator = WorldGenerator::new(5, &cfg);
        generator.set_cursor_y(-10_000.0);

        let early = GenerationView {
            camera_top: 0.0,
            camera_bottom: 800.0,
            player_y: 750.0,
            player_vy: 300.0,
            highest_height: 0,
        };
        assert_eq!(generator.advance(&early, &mut world, &cfg).rescues, 1);

        let high = GenerationView {
            camera_top: -3_000.0,
            camera_bottom: -2_200.0,
            player_y: -2_250.0,
            ..early
        };
        assert_eq!(generator.advance(&high, &mut world, &cfg).rescues, 1);
        assert!(world.platforms.iter().any(|p| p.y == -2_100.0));
        assert_eq!(generator.advance(&high, &mut world, &cfg).rescues, 0);
    }

    #[test]
    fn rescue_keeps_clear_of_live_platforms() {
        let cfg = JumperConfig::default();
        let falling = GenerationView {
            camera_top: 0.0,
            camera_bottom: 800.0,
            player_y: 750.0,
            player_vy: 300.0,
            highest_height: 0,
        };
        for seed in 0..20 {
            let mut world = World::new(cfg.projectile.pool_capacity);
            world.spawn_platform(240.0, 900.0, PlatformKind::Normal);
            world.spawn_platform(240.0, 860.0, PlatformKind::Normal);
            let mut generator = WorldGenerator::new(seed, &cfg);
            generator.set_cursor_y(-10_000.0);
            assert_eq!(generator.advance(&falling, &mut world, &cfg).rescues, 1);
            let rescue = world.platforms.last().unwrap();
            assert_eq!(rescue.y, 900.0);
            assert!((rescue.x - 240.0).abs() >= 60.0, "seed {seed}");
        }
    }

    #[test]
    fn occupied_rescue_depth_places_nothing() {
        let mut cfg = JumperConfig::default();
        // x is pinned to 80, right on top of the existing platform.
        cfg.screen.width = 160.0;
        cfg.generation.edge_margin = 80.0;
        let mut world = World::new(cfg.projectile.pool_capacity);
        world.spawn_platform(80.0, 900.0, PlatformKind::Normal);
        let mut generator = WorldGenerator::new(5, &cfg);
        generator.set_cursor_y(-10_000.0);

        let falling = GenerationView {
            camera_top: 0.0,
            camera_bottom: 800.0,
            player_y: 750.0,
            player_vy: 300.0,
            highest_height: 0,
        };
        assert_eq!(generator.advance(&falling, &mut world, &cfg).rescues, 0);
        assert_eq!(world.platforms.len(), 1);
    }

    #[test]
    fn rising_player_gets_no_rescue() {
        let cfg = JumperConfig::default();
        let mut world = World::new(cfg.projectile.pool_capacity);
        let mut generator = WorldGenerator::new(5, &cfg);
        generator.set_cursor_y(-10_000.0);
        let rising = GenerationView {
            camera_top: 0.0,
            camera_bottom: 800.0,
            player_y: 790.0,
            player_vy: -300.0,
            highest_height: 0,
        };
        assert_eq!(generator.advance(&rising, &mut world, &cfg).rescues, 0);
        assert!(world.platforms.is_empty());
    }

    #[test]
    fn cleanup_only_removes_far_below_camera() {
        let cfg = JumperConfig::default();
        let mut world = World::new(cfg.projectile.pool_capacity);
        world.spawn_platform(100.0, -5_000.0, PlatformKind::Normal);
        world.spawn_platform(100.0, 1_100.0, PlatformKind::Normal);
        world.spawn_platform(100.0, 1_101.0, PlatformKind::Normal);
        world.spawn_enemy(100.0, 1_000.0, 1.0);
        world.spawn_enemy(100.0, 1_001.0, 1.0);
        world.spawn_powerup(100.0, 1_200.0, PowerupKind::Jetpack);

        let report = cleanup(&mut world, 800.0, &cfg);
        assert_eq!(
            report,
            CleanupReport {
                platforms: 1,
                enemies: 1,
                powerups: 1
            }
        );
        assert_eq!(world.platforms.len(), 2);
        assert!(world.platforms.iter().any(|p| p.y == -5_000.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn upward_generation_never_crowds_platforms(
                seed in 0u64..1_000,
                climbs in prop::collection::vec(0i64..3_000, 1..8),
            ) {
                let mut cfg = JumperConfig::default();
                cfg.generation.max_placements_per_pass = 1_000;
                let mut world = World::new(cfg.projectile.pool_capacity);
                let mut generator = WorldGenerator::new(seed, &cfg);
                generator.set_cursor_y(800.0);
                let mut top = 0.0;
                let mut highest = 0;
                for climb in climbs {
                    highest += climb / 10;
                    top -= climb as f32;
                    let v = GenerationView {
                        camera_top: top,
                        camera_bottom: top + 800.0,
                        player_y: top + 300.0,
                        player_vy: -200.0,
                        highest_height: highest,
                    };
                    generator.advance(&v, &mut world, &cfg);
                    prop_assert!(min_pairwise_distance(&world) >= 60.0);
                    prop_assert!(generator.cursor_y() <= top - cfg.generation.frontier_margin);
                }
            }
        }
    }
}
