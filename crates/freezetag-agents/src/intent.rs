//! Translate a discrete action into a motion intent for the physics
//! subsystem.

use freezetag_types::{AgentAction, MotionIntent, Movement, Pose, Turn};

use crate::config::MovementConfig;

/// Convert `action` into a motion intent for one tick of `dt_ms`.
///
/// Horizontal velocity follows the body's heading; turning scales with the
/// tick length; a jump impulse is only issued while grounded. Callers pass
/// [`MotionIntent::STILL`] instead for agents that cannot move.
pub fn motion_intent(
    action: AgentAction,
    pose: &Pose,
    grounded: bool,
    dt_ms: u64,
    movement: &MovementConfig,
) -> MotionIntent {
    let direction = match action.movement {
        Movement::None => 0.0,
        Movement::Forward => 1.0,
        Movement::Backward => -1.0,
    };
    let spin = match action.turn {
        Turn::None => 0.0,
        Turn::Right => 1.0,
        Turn::Left => -1.0,
    };
    let dt_secs = f64::from(u32::try_from(dt_ms).unwrap_or(u32::MAX)) / 1000.0;

    MotionIntent {
        velocity: pose.forward().scale(direction * movement.move_speed),
        turn_deg: spin * movement.turn_speed_deg * dt_secs,
        jump_impulse: if action.jump && grounded {
            movement.jump_impulse
        } else {
            0.0
        },
    }
}
