use skyhop_jumper::JumperState;
use skyhop_jumper::player::JumperInput;

/// Horizontal slack before the pilot bothers to steer.
const STEER_SLACK: f32 = 12.0;
/// Enemies this far above the player and this close horizontally get shot.
const SHOT_RANGE: f32 = 400.0;
const SHOT_WIDTH: f32 = 30.0;

/// Scripted input: steer toward the best platform to land on and fire at
/// enemies overhead.
#[derive(Debug, Default)]
pub struct Pilot {
    fired_last_tick: bool,
}

impl Pilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_input(&mut self, state: &JumperState) -> JumperInput {
        let player = &state.player;
        let mut input = JumperInput::default();

        if let Some(target_x) = landing_target(state) {
            if target_x < player.x - STEER_SLACK {
                input.left = true;
            } else if target_x > player.x + STEER_SLACK {
                input.right = true;
            }
        }

        let enemy_overhead = state.world.enemies.iter().any(|e| {
            e.is_live()
                && e.y < player.y
                && player.y - e.y < SHOT_RANGE
                && (e.x - player.x).abs() < SHOT_WIDTH
        });
        // Release between shots so every press is a fresh one.
        input.shoot = enemy_overhead && !self.fired_last_tick;
        self.fired_last_tick = input.shoot;
        input
    }
}

/// Rising: the lowest platform above the feet. Falling: the highest
/// platform still below the feet.
fn landing_target(state: &JumperState) -> Option<f32> {
    let player = &state.player;
    let platforms = state.world.live_platforms();
    if player.vy < 0.0 {
        platforms
            .filter(|p| p.y < player.y)
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .map(|p| p.x)
    } else {
        platforms
            .filter(|p| p.y > player.y)
            .min_by(|a, b| a.y.total_cmp(&b.y))
            .map(|p| p.x)
    }
}
