use serde::{Deserialize, Serialize};

use crate::config::{CameraConfig, ScreenConfig};

/// Vertical scrolling camera. Only `scroll_y` moves; the view is always one
/// screen tall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub scroll_y: f32,
    pub height: f32,
}

impl Camera {
    pub fn new(screen: &ScreenConfig) -> Self {
        Self {
            scroll_y: 0.0,
            height: screen.height,
        }
    }

    pub fn top(&self) -> f32 {
        self.scroll_y
    }

    pub fn bottom(&self) -> f32 {
        self.scroll_y + self.height
    }

    fn center(&self) -> f32 {
        self.scroll_y + self.height / 2.0
    }

    /// Follow the player with a lerped, deadzoned target kept
    /// `follow_offset` below the player. A falling player low on screen pulls
    /// the camera down hard and drops the vertical deadzone.
    pub fn follow(&mut self, player_y: f32, player_vy: f32, cfg: &CameraConfig) {
        let catching_up =
            player_vy > 0.0 && player_y > self.scroll_y + self.height * cfg.fall_catchup_threshold;
        if catching_up {
            let target = player_y - self.height * cfg.fall_target_ratio;
            if self.scroll_y < target {
                self.scroll_y += (target - self.scroll_y) * cfg.fall_catchup_lerp;
            }
        }

        let half_zone = if catching_up { 0.0 } else { cfg.deadzone / 2.0 };
        let target = player_y + cfg.follow_offset;
        let center = self.center();
        let desired = if target < center - half_zone {
            target + half_zone
        } else if target > center + half_zone {
            target - half_zone
        } else {
            return;
        };
        self.scroll_y += (desired - center) * cfg.lerp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> (Camera, CameraConfig) {
        (Camera::new(&ScreenConfig::default()), CameraConfig::default())
    }

    #[test]
    fn player_inside_deadzone_holds_camera() {
        let (mut cam, cfg) = camera();
        // center 400, target = y + 150
        cam.follow(260.0, -100.0, &cfg);
        assert_eq!(cam.scroll_y, 0.0);
    }

    #[test]
    fn rising_player_pulls_camera_up() {
        let (mut cam, cfg) = camera();
        cam.follow(0.0, -500.0, &cfg);
        assert!(cam.scroll_y < 0.0);
        let first = cam.scroll_y;
        cam.follow(0.0, -500.0, &cfg);
        assert!(cam.scroll_y < first);
    }

    #[test]
    fn camera_converges_on_steady_target() {
        let (mut cam, cfg) = camera();
        for _ in 0..400 {
            cam.follow(-1_000.0, 0.0, &cfg);
        }
        // target center -850, settles at the deadzone edge
        let center = cam.scroll_y + cam.height / 2.0;
        assert!((center - (-825.0)).abs() < 1.0);
    }

    #[test]
    fn falling_low_on_screen_catches_up() {
        let (mut cam, cfg) = camera();
        let slow = {
            let mut c = cam.clone();
            c.follow(600.0, -10.0, &cfg);
            c.scroll_y
        };
        cam.follow(600.0, 300.0, &cfg);
        assert!(cam.scroll_y > slow);
        assert!(cam.bottom() > 800.0);
    }
}
