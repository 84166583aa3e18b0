//! Discrete actions produced by policies and the motion intents the core
//! forwards to the physics subsystem.
//!
//! The policy contract is three discrete branches:
//!
//! | Branch | Values |
//! |--------|--------|
//! | 0: movement | 0 = none, 1 = forward, 2 = backward |
//! | 1: turn | 0 = none, 1 = right, 2 = left |
//! | 2: jump | 0 = no, 1 = yes |

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// Forward/backward movement choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Movement {
    /// Stand still horizontally.
    #[default]
    None,
    /// Move along the heading.
    Forward,
    /// Move against the heading.
    Backward,
}

/// Turning choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Turn {
    /// Keep the current heading.
    #[default]
    None,
    /// Rotate clockwise when viewed from above.
    Right,
    /// Rotate counter-clockwise when viewed from above.
    Left,
}

/// One decision for one agent for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AgentAction {
    /// Movement branch.
    pub movement: Movement,
    /// Turn branch.
    pub turn: Turn,
    /// Jump branch.
    pub jump: bool,
}

/// A discrete action vector contained an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("discrete action branch {branch} has invalid value {value}")]
pub struct ActionDecodeError {
    /// Which branch was invalid (0 = movement, 1 = turn, 2 = jump).
    pub branch: usize,
    /// The rejected value.
    pub value: i32,
}

impl AgentAction {
    /// The do-nothing action.
    pub const IDLE: Self = Self {
        movement: Movement::None,
        turn: Turn::None,
        jump: false,
    };

    /// Decode the three-branch discrete action vector.
    ///
    /// # Errors
    ///
    /// Returns [`ActionDecodeError`] naming the first out-of-range branch.
    pub const fn from_discrete(branches: [i32; 3]) -> Result<Self, ActionDecodeError> {
        let [movement, turn, jump] = branches;
        let movement = match movement {
            0 => Movement::None,
            1 => Movement::Forward,
            2 => Movement::Backward,
            value => return Err(ActionDecodeError { branch: 0, value }),
        };
        let turn = match turn {
            0 => Turn::None,
            1 => Turn::Right,
            2 => Turn::Left,
            value => return Err(ActionDecodeError { branch: 1, value }),
        };
        let jump = match jump {
            0 => false,
            1 => true,
            value => return Err(ActionDecodeError { branch: 2, value }),
        };
        Ok(Self {
            movement,
            turn,
            jump,
        })
    }

    /// Encode back into the three-branch discrete vector.
    pub const fn to_discrete(self) -> [i32; 3] {
        let movement = match self.movement {
            Movement::None => 0,
            Movement::Forward => 1,
            Movement::Backward => 2,
        };
        let turn = match self.turn {
            Turn::None => 0,
            Turn::Right => 1,
            Turn::Left => 2,
        };
        [movement, turn, if self.jump { 1 } else { 0 }]
    }
}

/// What the core asks the physics subsystem to do with a body this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionIntent {
    /// Desired horizontal velocity (the `y` component is ignored).
    pub velocity: Vec3,
    /// Heading change in degrees to apply this tick.
    pub turn_deg: f64,
    /// Upward impulse; zero for no jump.
    pub jump_impulse: f64,
}

impl MotionIntent {
    /// Hold still: no velocity, no turn, no jump.
    pub const STILL: Self = Self {
        velocity: Vec3::ZERO,
        turn_deg: 0.0,
        jump_impulse: 0.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_branches() {
        let action = AgentAction::from_discrete([1, 2, 1]);
        assert_eq!(
            action,
            Ok(AgentAction {
                movement: Movement::Forward,
                turn: Turn::Left,
                jump: true,
            })
        );
    }

    #[test]
    fn rejects_out_of_range_branch() {
        assert_eq!(
            AgentAction::from_discrete([0, 3, 0]),
            Err(ActionDecodeError {
                branch: 1,
                value: 3
            })
        );
        assert_eq!(
            AgentAction::from_discrete([0, 0, 2]),
            Err(ActionDecodeError {
                branch: 2,
                value: 2
            })
        );
    }

    #[test]
    fn idle_is_all_zero() {
        assert_eq!(AgentAction::IDLE.to_discrete(), [0, 0, 0]);
        assert_eq!(AgentAction::default(), AgentAction::IDLE);
    }
}
