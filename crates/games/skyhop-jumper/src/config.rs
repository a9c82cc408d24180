use serde::{Deserialize, Serialize};

use skyhop_core::time::Millis;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "SKYHOP_JUMPER_CONFIG";
/// Config file read when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/jumper.toml";

/// Logical screen size in pixels. y grows downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal speed (px/s).
    pub move_speed: f32,
    /// Jump impulse magnitude (px/s).
    pub jump_power: f32,
    /// Downward acceleration (px/s^2).
    pub gravity: f32,
    pub shoot_cooldown_ms: Millis,
    /// How long the shooting pose is held after a shot.
    pub shoot_pose_ms: Millis,
    /// Jump multiplier applied by spring platforms.
    pub spring_bounce_multiplier: f32,
    /// Collision box, anchored at the feet (bottom center).
    pub body_width: f32,
    pub body_height: f32,
    /// Spawn height above the bottom edge of the screen.
    pub start_offset_y: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 300.0,
            jump_power: 600.0,
            gravity: 800.0,
            shoot_cooldown_ms: 300,
            shoot_pose_ms: 200,
            spring_bounce_multiplier: 1.8,
            body_width: 50.0,
            body_height: 52.0,
            start_offset_y: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupConfig {
    pub jetpack_duration_ms: Millis,
    pub jetpack_power: f32,
    /// Forced ascent window right after a jetpack pickup.
    pub jetpack_auto_fly_ms: Millis,
    pub jetpack_auto_fly_factor: f32,
    pub jetpack_manual_factor: f32,
    pub spring_shoes_duration_ms: Millis,
    pub spring_shoes_multiplier: f32,
    pub propeller_hat_duration_ms: Millis,
    pub propeller_hat_power: f32,
    /// Spawn chances in percent; the rest of the d100 spawns nothing.
    pub jetpack_chance: u32,
    pub spring_shoes_chance: u32,
    pub propeller_hat_chance: u32,
    /// Pickup box edge length, centered on the pickup.
    pub size: f32,
    /// Spawn height above the platform it rides on.
    pub spawn_offset_y: f32,
    /// Removal distance below the camera bottom.
    pub cleanup_distance: f32,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        Self {
            jetpack_duration_ms: 3000,
            jetpack_power: 400.0,
            jetpack_auto_fly_ms: 500,
            jetpack_auto_fly_factor: 1.5,
            jetpack_manual_factor: 1.3,
            spring_shoes_duration_ms: 10_000,
            spring_shoes_multiplier: 1.5,
            propeller_hat_duration_ms: 5000,
            propeller_hat_power: 300.0,
            jetpack_chance: 3,
            spring_shoes_chance: 4,
            propeller_hat_chance: 3,
            size: 50.0,
            spawn_offset_y: 60.0,
            cleanup_distance: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub width: f32,
    pub height: f32,
    /// Type weights in percent; spring takes whatever is left of 100.
    pub normal_chance: u32,
    pub breaking_chance: u32,
    pub moving_chance: u32,
    pub moving_speed: f32,
    /// Gap kept between a moving platform and the screen edge.
    pub moving_edge_padding: f32,
    pub break_delay_ms: Millis,
    pub spring_compress_ms: Millis,
    /// Start platform sits this far above the bottom edge.
    pub start_offset_y: f32,
    /// Random platforms placed above the start platform.
    pub initial_count: u32,
    pub initial_edge_margin: f32,
    pub cleanup_distance: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 20.0,
            normal_chance: 60,
            breaking_chance: 15,
            moving_chance: 15,
            moving_speed: 80.0,
            moving_edge_padding: 10.0,
            break_delay_ms: 100,
            spring_compress_ms: 200,
            start_offset_y: 50.0,
            initial_count: 5,
            initial_edge_margin: 60.0,
            cleanup_distance: 300.0,
        }
    }
}

/// Procedural placement tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub platform_spacing: f32,
    pub min_platform_spacing: f32,
    /// Spacing shrinks by `highest_height / spacing_height_divisor`.
    pub spacing_height_divisor: f32,
    pub min_platform_distance: f32,
    pub placement_attempts: u32,
    pub edge_margin: f32,
    /// Content must exist this far above the camera top.
    pub frontier_margin: f32,
    /// Height at which difficulty has grown by 1x.
    pub difficulty_height: f32,
    pub max_difficulty: f32,
    /// A falling player this close to the camera bottom triggers a rescue platform.
    pub rescue_trigger_margin: f32,
    /// Rescue platforms land this far below the camera bottom.
    pub rescue_offset: f32,
    /// Upper bound on upward placements in one pass.
    pub max_placements_per_pass: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            platform_spacing: 100.0,
            min_platform_spacing: 50.0,
            spacing_height_divisor: 50.0,
            min_platform_distance: 60.0,
            placement_attempts: 10,
            edge_margin: 80.0,
            frontier_margin: 200.0,
            difficulty_height: 1000.0,
            max_difficulty: 2.0,
            rescue_trigger_margin: 100.0,
            rescue_offset: 100.0,
            max_placements_per_pass: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Base spawn chance per platform, percent.
    pub spawn_chance: f32,
    /// Ceiling on the difficulty-scaled chance, percent.
    pub spawn_chance_cap: f32,
    pub spawn_offset_y: f32,
    /// Collision box, anchored at the feet.
    pub width: f32,
    pub height: f32,
    pub cleanup_distance: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            spawn_chance: 5.0,
            spawn_chance_cap: 20.0,
            spawn_offset_y: 80.0,
            width: 40.0,
            height: 50.0,
            cleanup_distance: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub pool_capacity: usize,
    pub speed: f32,
    pub gravity: f32,
    pub lifetime_ms: Millis,
    /// Spawn point above the player's feet.
    pub spawn_offset_y: f32,
    pub size: f32,
    /// Projectiles this far above the camera top are recycled.
    pub recycle_above: f32,
    /// Projectiles this far below the camera bottom are recycled.
    pub recycle_below: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 20,
            speed: 400.0,
            gravity: 200.0,
            lifetime_ms: 2000,
            spawn_offset_y: 35.0,
            size: 6.0,
            recycle_above: 100.0,
            recycle_below: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub lerp: f32,
    /// Camera centers this far below the player, keeping the player high on screen.
    pub follow_offset: f32,
    pub deadzone: f32,
    /// Fraction of the screen below which a falling player forces catch-up.
    pub fall_catchup_threshold: f32,
    pub fall_catchup_lerp: f32,
    /// Screen fraction the player is pulled back to during catch-up.
    pub fall_target_ratio: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            lerp: 0.15,
            follow_offset: 150.0,
            deadzone: 50.0,
            fall_catchup_threshold: 0.6,
            fall_catchup_lerp: 0.4,
            fall_target_ratio: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub combo_window_ms: Millis,
    /// Multiplier gained per combo step, in percent.
    pub combo_step_percent: u64,
    pub combo_cap_percent: u64,
    pub stomp_points: u64,
    pub bullet_points: u64,
    pub powerup_points: u64,
    /// Awarded on every tick that raises the highest height.
    pub height_score: u64,
    /// Pixels per height unit.
    pub height_unit: f32,
    /// Fall distance below the start platform that ends the run.
    pub game_over_buffer: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            combo_window_ms: 2000,
            combo_step_percent: 20,
            combo_cap_percent: 300,
            stomp_points: 100,
            bullet_points: 150,
            powerup_points: 200,
            height_score: 10,
            height_unit: 10.0,
            game_over_buffer: 40.0,
        }
    }
}

/// Top-level jumper configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumperConfig {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub powerup: PowerupConfig,
    pub platform: PlatformConfig,
    pub generation: GenerationConfig,
    pub enemy: EnemyConfig,
    pub projectile: ProjectileConfig,
    pub camera: CameraConfig,
    pub scoring: ScoringConfig,
}

impl JumperConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    JumperConfig::default()
                },
            },
            Err(_) => {
                tracing::debug!("No config at {path}, using defaults");
                JumperConfig::default()
            },
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Feet position of the player at spawn; height zero.
    pub fn initial_player_y(&self) -> f32 {
        self.screen.height - self.player.start_offset_y
    }

    pub fn starting_platform_y(&self) -> f32 {
        self.screen.height - self.platform.start_offset_y
    }

    pub fn player_half_width(&self) -> f32 {
        self.player.body_width / 2.0
    }
}
