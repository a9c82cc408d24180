use serde::{Deserialize, Serialize};

use skyhop_core::time::{Millis, elapsed};

use crate::config::JumperConfig;
use crate::events::{Cue, Loop};
use crate::powerups::{PowerupKind, PowerupState, PowerupTimers};

/// Boolean control state polled by the host each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumperInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub shoot: bool,
    /// Touch or mouse held.
    pub pointer_down: bool,
    /// The held pointer is on the left half of the screen.
    pub pointer_left_half: bool,
}

/// Resolved horizontal intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
    None,
}

impl JumperInput {
    /// Keys win over the pointer; left wins over right.
    pub fn steer(&self) -> Steer {
        if self.left {
            Steer::Left
        } else if self.right {
            Steer::Right
        } else if self.pointer_down && self.pointer_left_half {
            Steer::Left
        } else if self.pointer_down {
            Steer::Right
        } else {
            Steer::None
        }
    }

    /// A held pointer also fires.
    pub fn shoot_held(&self) -> bool {
        self.shoot || self.pointer_down
    }

    /// Manual jetpack thrust: up, or the fire control.
    pub fn thrust_held(&self) -> bool {
        self.up || self.shoot_held()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Animation pose shown by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pose {
    #[default]
    Idle,
    Shooting,
    Jetpack,
    SpringShoes,
    PropellerHat,
}

impl Pose {
    pub fn for_state(shooting: bool, current: PowerupState) -> Self {
        if shooting {
            return Pose::Shooting;
        }
        match current {
            PowerupState::Normal => Pose::Idle,
            PowerupState::Jetpack => Pose::Jetpack,
            PowerupState::SpringShoes => Pose::SpringShoes,
            PowerupState::PropellerHat => Pose::PropellerHat,
        }
    }
}

/// Power-up attachment drawn on the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlay {
    #[default]
    None,
    PropellerHat,
    Jetpack,
    SpringShoes,
}

impl From<PowerupState> for Overlay {
    fn from(state: PowerupState) -> Self {
        match state {
            PowerupState::Normal => Overlay::None,
            PowerupState::Jetpack => Overlay::Jetpack,
            PowerupState::SpringShoes => Overlay::SpringShoes,
            PowerupState::PropellerHat => Overlay::PropellerHat,
        }
    }
}

/// On/off latches for looping effects; repeated starts and stops are no-ops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopLatches {
    pub jetpack_thrust: bool,
    pub propeller_spin: bool,
}

impl LoopLatches {
    fn slot(&mut self, which: Loop) -> &mut bool {
        match which {
            Loop::JetpackThrust => &mut self.jetpack_thrust,
            Loop::PropellerSpin => &mut self.propeller_spin,
        }
    }

    pub fn set(&mut self, which: Loop, on: bool, outbox: &mut Vec<Cue>) {
        let slot = self.slot(which);
        if *slot == on {
            return;
        }
        *slot = on;
        outbox.push(if on {
            Cue::LoopStart(which)
        } else {
            Cue::LoopStop(which)
        });
    }

    pub fn stop_all(&mut self, outbox: &mut Vec<Cue>) {
        self.set(Loop::JetpackThrust, false, outbox);
        self.set(Loop::PropellerSpin, false, outbox);
    }
}

/// The player, anchored at its feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    pub alive: bool,
    pub shooting: bool,
    pub last_shot_ms: Option<Millis>,
    pub pose: Pose,
    pub loops: LoopLatches,
}

impl PlayerState {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            facing: Facing::Right,
            alive: true,
            shooting: false,
            last_shot_ms: None,
            pose: Pose::Idle,
            loops: LoopLatches::default(),
        }
    }

    /// Set vx from horizontal intent; facing keeps the last non-neutral intent.
    pub fn steer(&mut self, input: &JumperInput, move_speed: f32) {
        match input.steer() {
            Steer::Left => {
                self.vx = -move_speed;
                self.facing = Facing::Left;
            },
            Steer::Right => {
                self.vx = move_speed;
                self.facing = Facing::Right;
            },
            Steer::None => self.vx = 0.0,
        }
    }

    /// Vertical override from the current power-ups. Returns whether jetpack
    /// thrust is being applied this tick.
    pub fn drive_vertical(
        &mut self,
        powerups: &PowerupTimers,
        input: &JumperInput,
        now: Millis,
        cfg: &JumperConfig,
    ) -> bool {
        let pu = &cfg.powerup;
        if powerups.is_active(PowerupKind::PropellerHat) {
            self.vy = -pu.propeller_hat_power;
            false
        } else if powerups.is_active(PowerupKind::Jetpack) {
            if powerups.in_auto_fly(now) {
                self.vy = -pu.jetpack_power * pu.jetpack_auto_fly_factor;
                true
            } else if input.thrust_held() {
                self.vy = -pu.jetpack_power * pu.jetpack_manual_factor;
                true
            } else {
                false
            }
        } else {
            false
        }
    }

    fn shoe_multiplier(powerups: &PowerupTimers, cfg: &JumperConfig) -> f32 {
        if powerups.is_active(PowerupKind::SpringShoes) {
            cfg.powerup.spring_shoes_multiplier
        } else {
            1.0
        }
    }

    /// Jump impulse: the override velocity or `-jump_power`, scaled by
    /// spring shoes.
    pub fn jump(
        &mut self,
        velocity: Option<f32>,
        powerups: &PowerupTimers,
        cfg: &JumperConfig,
        outbox: &mut Vec<Cue>,
    ) {
        let base = velocity.unwrap_or(-cfg.player.jump_power);
        self.vy = base * Self::shoe_multiplier(powerups, cfg);
        outbox.push(Cue::Jump);
    }

    /// Stronger jump granted only by spring platforms.
    pub fn spring_jump(&mut self, powerups: &PowerupTimers, cfg: &JumperConfig, outbox: &mut Vec<Cue>) {
        let base = -cfg.player.jump_power * cfg.player.spring_bounce_multiplier;
        self.vy = base * Self::shoe_multiplier(powerups, cfg);
        outbox.push(Cue::SpringBounce);
    }

    /// Keep the body on screen. Returns whether a clamp happened.
    pub fn clamp_to_screen(&mut self, screen_width: f32, half_width: f32) -> bool {
        if self.x < half_width {
            self.x = half_width;
        } else if self.x > screen_width - half_width {
            self.x = screen_width - half_width;
        } else {
            return false;
        }
        self.vx = 0.0;
        true
    }

    pub fn can_shoot(&self, now: Millis, cooldown: Millis) -> bool {
        self.alive
            && self
                .last_shot_ms
                .is_none_or(|last| elapsed(now, last) > cooldown)
    }

    /// Recompute the pose. Returns the old and new pose on change.
    pub fn sync_pose(&mut self, current: PowerupState) -> Option<(Pose, Pose)> {
        let next = Pose::for_state(self.shooting, current);
        if next == self.pose {
            return None;
        }
        let prev = self.pose;
        self.pose = next;
        Some((prev, next))
    }

    /// Stop moving and drop every looping effect. Idempotent.
    pub fn die(&mut self, outbox: &mut Vec<Cue>) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.vx = 0.0;
        self.vy = 0.0;
        self.shooting = false;
        self.loops.stop_all(outbox);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PlayerState, PowerupTimers, JumperConfig) {
        let cfg = JumperConfig::default();
        (
            PlayerState::new(240.0, 700.0),
            PowerupTimers::new(&cfg.powerup),
            cfg,
        )
    }

    #[test]
    fn steering_sets_velocity_and_facing() {
        let (mut p, _, cfg) = setup();
        let left = JumperInput {
            left: true,
            ..Default::default()
        };
        p.steer(&left, cfg.player.move_speed);
        assert_eq!(p.vx, -300.0);
        assert_eq!(p.facing, Facing::Left);

        p.steer(&JumperInput::default(), cfg.player.move_speed);
        assert_eq!(p.vx, 0.0);
        assert_eq!(p.facing, Facing::Left);
    }

    #[test]
    fn pointer_halves_steer() {
        let touch_right = JumperInput {
            pointer_down: true,
            ..Default::default()
        };
        assert_eq!(touch_right.steer(), Steer::Right);
        assert!(touch_right.shoot_held());
        let touch_left = JumperInput {
            pointer_down: true,
            pointer_left_half: true,
            ..Default::default()
        };
        assert_eq!(touch_left.steer(), Steer::Left);
    }

    #[test]
    fn spring_shoes_scale_jumps() {
        let (mut p, mut pu, cfg) = setup();
        let mut out = Vec::new();
        p.jump(None, &pu, &cfg, &mut out);
        assert_eq!(p.vy, -600.0);

        pu.collect(PowerupKind::SpringShoes, 0, &cfg.powerup);
        p.jump(None, &pu, &cfg, &mut out);
        assert_eq!(p.vy, -900.0);
        p.jump(Some(-400.0), &pu, &cfg, &mut out);
        assert_eq!(p.vy, -600.0);
        p.spring_jump(&pu, &cfg, &mut out);
        assert!((p.vy - (-600.0 * 1.8 * 1.5)).abs() < 1e-3);
        assert_eq!(out, vec![Cue::Jump, Cue::Jump, Cue::Jump, Cue::SpringBounce]);
    }

    #[test]
    fn propeller_overrides_jetpack() {
        let (mut p, mut pu, cfg) = setup();
        pu.collect(PowerupKind::Jetpack, 0, &cfg.powerup);
        pu.collect(PowerupKind::PropellerHat, 0, &cfg.powerup);
        let thrust = p.drive_vertical(&pu, &JumperInput::default(), 10, &cfg);
        assert!(!thrust);
        assert_eq!(p.vy, -300.0);
    }

    #[test]
    fn jetpack_auto_fly_then_manual() {
        let (mut p, mut pu, cfg) = setup();
        pu.collect(PowerupKind::Jetpack, 1_000, &cfg.powerup);
        let idle = JumperInput::default();

        assert!(p.drive_vertical(&pu, &idle, 1_200, &cfg));
        assert_eq!(p.vy, -600.0);

        p.vy = 50.0;
        assert!(!p.drive_vertical(&pu, &idle, 1_600, &cfg));
        assert_eq!(p.vy, 50.0);

        let up = JumperInput {
            up: true,
            ..Default::default()
        };
        assert!(p.drive_vertical(&pu, &up, 1_600, &cfg));
        assert!((p.vy - (-520.0)).abs() < 1e-3);
    }

    #[test]
    fn clamp_zeroes_horizontal_velocity() {
        let (mut p, _, cfg) = setup();
        p.x = 10.0;
        p.vx = -300.0;
        assert!(p.clamp_to_screen(cfg.screen.width, cfg.player_half_width()));
        assert_eq!(p.x, 25.0);
        assert_eq!(p.vx, 0.0);
        p.x = 470.0;
        assert!(p.clamp_to_screen(cfg.screen.width, cfg.player_half_width()));
        assert_eq!(p.x, 455.0);
        p.x = 240.0;
        p.vx = 300.0;
        assert!(!p.clamp_to_screen(cfg.screen.width, cfg.player_half_width()));
        assert_eq!(p.vx, 300.0);
    }

    #[test]
    fn loop_latches_are_idempotent() {
        let mut latches = LoopLatches::default();
        let mut out = Vec::new();
        latches.set(Loop::JetpackThrust, false, &mut out);
        latches.set(Loop::JetpackThrust, true, &mut out);
        latches.set(Loop::JetpackThrust, true, &mut out);
        latches.set(Loop::JetpackThrust, false, &mut out);
        latches.set(Loop::JetpackThrust, false, &mut out);
        assert_eq!(
            out,
            vec![
                Cue::LoopStart(Loop::JetpackThrust),
                Cue::LoopStop(Loop::JetpackThrust)
            ]
        );
    }

    #[test]
    fn shooting_cooldown() {
        let (mut p, _, cfg) = setup();
        assert!(p.can_shoot(0, cfg.player.shoot_cooldown_ms));
        p.last_shot_ms = Some(1_000);
        assert!(!p.can_shoot(1_300, cfg.player.shoot_cooldown_ms));
        assert!(p.can_shoot(1_301, cfg.player.shoot_cooldown_ms));
    }

    #[test]
    fn shooting_pose_wins_over_powerup_pose() {
        let (mut p, _, _) = setup();
        p.shooting = true;
        assert_eq!(
            p.sync_pose(PowerupState::Jetpack),
            Some((Pose::Idle, Pose::Shooting))
        );
        p.shooting = false;
        assert_eq!(
            p.sync_pose(PowerupState::Jetpack),
            Some((Pose::Shooting, Pose::Jetpack))
        );
        assert_eq!(p.sync_pose(PowerupState::Jetpack), None);
    }

    #[test]
    fn die_is_idempotent_and_stops_loops() {
        let (mut p, _, _) = setup();
        let mut out = Vec::new();
        p.loops.set(Loop::PropellerSpin, true, &mut out);
        out.clear();
        p.vy = 200.0;
        assert!(p.die(&mut out));
        assert!(!p.die(&mut out));
        assert_eq!(p.vy, 0.0);
        assert_eq!(out, vec![Cue::LoopStop(Loop::PropellerSpin)]);
        assert!(!p.can_shoot(10_000, 0));
    }
}
