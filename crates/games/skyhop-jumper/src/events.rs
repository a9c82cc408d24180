use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, PlatformType};
use crate::player::Pose;
use crate::powerups::{PowerupKind, PowerupState};

/// Looping presentation effects that are started and stopped explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Loop {
    /// Jetpack flame and thrust sound.
    JetpackThrust,
    /// Propeller spinning sound.
    PropellerSpin,
}

/// How an enemy was defeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefeatCause {
    Stomp,
    Projectile,
}

/// Fire-and-forget requests for the audio/visual collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cue {
    Music,
    Jump,
    SpringBounce,
    Shoot,
    PowerupCollect,
    PowerupBurst { x: f32, y: f32, kind: PowerupKind },
    EnemyDefeat { x: f32, y: f32, cause: DefeatCause },
    Particles { x: f32, y: f32, color: u32 },
    ScreenShake { intensity: f32 },
    PlatformBreak { x: f32, y: f32 },
    SpringCompressed { platform: EntityId },
    SpringReleased { platform: EntityId },
    LoopStart(Loop),
    LoopStop(Loop),
    GameOver,
}

impl Cue {
    /// Stable name used to report a missing asset once.
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Music => "music",
            Cue::Jump => "jump",
            Cue::SpringBounce => "spring_bounce",
            Cue::Shoot => "shoot",
            Cue::PowerupCollect => "powerup_collect",
            Cue::PowerupBurst { .. } => "powerup_burst",
            Cue::EnemyDefeat { .. } => "enemy_defeat",
            Cue::Particles { .. } => "particles",
            Cue::ScreenShake { .. } => "screen_shake",
            Cue::PlatformBreak { .. } => "platform_break",
            Cue::SpringCompressed { .. } => "spring_compressed",
            Cue::SpringReleased { .. } => "spring_released",
            Cue::LoopStart(Loop::JetpackThrust) | Cue::LoopStop(Loop::JetpackThrust) => {
                "jetpack_thrust"
            },
            Cue::LoopStart(Loop::PropellerSpin) | Cue::LoopStop(Loop::PropellerSpin) => {
                "propeller_spin"
            },
            Cue::GameOver => "game_over",
        }
    }
}

/// Final numbers handed to the terminal screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverSummary {
    pub score: u64,
    pub highest_height: i64,
    pub best_score: u64,
    pub new_best: bool,
    pub cause: EndCause,
}

/// What ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    EnemyContact,
    FellBelowStart,
}

/// Gameplay events returned from each update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    PowerupChanged {
        from: PowerupState,
        to: PowerupState,
    },
    PoseChanged {
        from: Pose,
        to: Pose,
    },
    Landed {
        platform: EntityId,
        kind: PlatformType,
    },
    PlatformBroken {
        platform: EntityId,
    },
    EnemyDefeated {
        enemy: EntityId,
        cause: DefeatCause,
        points: u64,
    },
    PowerupCollected {
        kind: PowerupKind,
        points: u64,
    },
    ProjectileFired {
        projectile: EntityId,
    },
    NewHeight {
        height: i64,
    },
    ComboEnded,
    GameOver(GameOverSummary),
}

/// Work scheduled on the run's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    BreakPlatform(EntityId),
    ReleaseSpring(EntityId),
    EndShootPose,
    ExpireProjectile(EntityId),
}
