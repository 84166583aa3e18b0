//! Physics boundary and a kinematic reference backend.
//!
//! The core issues motion intents and reads back poses and a grounded
//! flag. It never resolves collisions itself. [`KinematicPhysics`] is a
//! minimal backend for headless runs and tests: it integrates velocity and
//! gravity against a flat ground plane and keeps bodies inside the arena.

use std::collections::BTreeMap;

use freezetag_types::{BodyHandle, MotionIntent, Pose, Vec3};
use freezetag_world::Arena;

/// Errors reported by a physics backend.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// The handle does not name a live body.
    #[error("unknown body {0}")]
    UnknownBody(BodyHandle),

    /// The template cannot be instantiated.
    #[error("cannot instantiate template {template:?}: {reason}")]
    SpawnFailed {
        /// Template name.
        template: String,
        /// Why instantiation failed.
        reason: String,
    },
}

/// The operations the core needs from a physics subsystem.
pub trait PhysicsBackend: Send {
    /// Instantiate `template` at `pose`.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::SpawnFailed`] if the body cannot be created.
    fn spawn_body(&mut self, template: &str, pose: Pose) -> Result<BodyHandle, PhysicsError>;

    /// Remove a body. Unknown handles are ignored.
    fn despawn(&mut self, body: BodyHandle);

    /// Move a body to `pose` and stop it.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a stale handle.
    fn teleport(&mut self, body: BodyHandle, pose: Pose) -> Result<(), PhysicsError>;

    /// Set a body's intent for the next step.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a stale handle.
    fn apply_intent(&mut self, body: BodyHandle, intent: &MotionIntent) -> Result<(), PhysicsError>;

    /// Integrate every body forward by `dt_ms`.
    fn step(&mut self, dt_ms: u64);

    /// Current pose of a body.
    fn pose(&self, body: BodyHandle) -> Option<Pose>;

    /// Whether a body is resting on the ground.
    fn is_grounded(&self, body: BodyHandle) -> bool;
}

/// Downward acceleration in world units per second squared.
pub const GRAVITY: f64 = 9.81;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Body {
    pose: Pose,
    /// Horizontal velocity requested by the last intent.
    velocity: Vec3,
    vertical_speed: f64,
    /// Heading change still to apply on the next step.
    pending_turn_deg: f64,
}

/// Point-mass bodies on a flat floor.
#[derive(Debug, Clone)]
pub struct KinematicPhysics {
    arena: Arena,
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: BodyHandle,
}

impl KinematicPhysics {
    /// Create an empty world bounded by `arena`.
    pub const fn new(arena: Arena) -> Self {
        Self {
            arena,
            bodies: BTreeMap::new(),
            next_handle: BodyHandle::from_raw(0),
        }
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Height at which a body rests on the floor.
    fn rest_height(&self) -> f64 {
        self.arena.ground() + self.arena.spawn_height
    }
}

impl PhysicsBackend for KinematicPhysics {
    fn spawn_body(&mut self, template: &str, pose: Pose) -> Result<BodyHandle, PhysicsError> {
        let handle = self.next_handle;
        self.next_handle = handle.next().ok_or_else(|| PhysicsError::SpawnFailed {
            template: template.to_owned(),
            reason: "body handles exhausted".to_owned(),
        })?;
        self.bodies.insert(
            handle,
            Body {
                pose,
                velocity: Vec3::ZERO,
                vertical_speed: 0.0,
                pending_turn_deg: 0.0,
            },
        );
        Ok(handle)
    }

    fn despawn(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
    }

    fn teleport(&mut self, body: BodyHandle, pose: Pose) -> Result<(), PhysicsError> {
        let entry = self
            .bodies
            .get_mut(&body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        entry.pose = pose;
        entry.velocity = Vec3::ZERO;
        entry.vertical_speed = 0.0;
        entry.pending_turn_deg = 0.0;
        Ok(())
    }

    fn apply_intent(&mut self, body: BodyHandle, intent: &MotionIntent) -> Result<(), PhysicsError> {
        let entry = self
            .bodies
            .get_mut(&body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        entry.velocity = Vec3::new(intent.velocity.x, 0.0, intent.velocity.z);
        entry.pending_turn_deg = intent.turn_deg;
        entry.vertical_speed += intent.jump_impulse;
        Ok(())
    }

    fn step(&mut self, dt_ms: u64) {
        let dt = f64::from(u32::try_from(dt_ms).unwrap_or(u32::MAX)) / 1000.0;
        let rest = self.rest_height();
        let arena = self.arena;

        for body in self.bodies.values_mut() {
            body.pose.yaw_deg = (body.pose.yaw_deg + body.pending_turn_deg).rem_euclid(360.0);
            body.pending_turn_deg = 0.0;

            body.vertical_speed -= GRAVITY * dt;
            let mut position = body.pose.position.add(body.velocity.scale(dt));
            position.y += body.vertical_speed * dt;
            if position.y <= rest {
                position.y = rest;
                body.vertical_speed = 0.0;
            }
            body.pose.position = arena.clamp_horizontal(position);
        }
    }

    fn pose(&self, body: BodyHandle) -> Option<Pose> {
        self.bodies.get(&body).map(|b| b.pose)
    }

    fn is_grounded(&self, body: BodyHandle) -> bool {
        let rest = self.rest_height();
        self.bodies
            .get(&body)
            .is_some_and(|b| b.pose.position.y <= rest + 1e-9 && b.vertical_speed <= 0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn world() -> (KinematicPhysics, BodyHandle) {
        let arena = Arena::default();
        let mut physics = KinematicPhysics::new(arena);
        let start = Pose::new(Vec3::new(0.0, 0.5, 0.0), 0.0);
        let body = physics.spawn_body("runner", start).unwrap();
        (physics, body)
    }

    #[test]
    fn velocity_integrates_over_step() {
        let (mut physics, body) = world();
        let intent = MotionIntent {
            velocity: Vec3::new(0.0, 0.0, 1.5),
            ..MotionIntent::STILL
        };
        physics.apply_intent(body, &intent).unwrap();
        physics.step(1000);

        let pose = physics.pose(body).unwrap();
        assert!((pose.position.z - 1.5).abs() < 1e-9);
        assert!(physics.is_grounded(body));
    }

    #[test]
    fn jump_leaves_and_returns_to_ground() {
        let (mut physics, body) = world();
        let intent = MotionIntent {
            jump_impulse: 5.0,
            ..MotionIntent::STILL
        };
        physics.apply_intent(body, &intent).unwrap();
        physics.apply_intent(body, &MotionIntent::STILL).unwrap();
        physics.step(20);
        assert!(!physics.is_grounded(body));

        for _ in 0..100 {
            physics.step(20);
        }
        assert!(physics.is_grounded(body));
        assert!((physics.pose(body).unwrap().position.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn bodies_stay_inside_arena() {
        let (mut physics, body) = world();
        let intent = MotionIntent {
            velocity: Vec3::new(100.0, 0.0, 0.0),
            ..MotionIntent::STILL
        };
        physics.apply_intent(body, &intent).unwrap();
        physics.step(1000);
        assert!(physics.pose(body).unwrap().position.x <= 15.0);
    }

    #[test]
    fn turn_wraps_heading() {
        let (mut physics, body) = world();
        let intent = MotionIntent {
            turn_deg: -90.0,
            ..MotionIntent::STILL
        };
        physics.apply_intent(body, &intent).unwrap();
        physics.step(20);
        assert!((physics.pose(body).unwrap().yaw_deg - 270.0).abs() < 1e-9);
    }

    #[test]
    fn stale_handles_are_reported() {
        let (mut physics, body) = world();
        physics.despawn(body);
        assert_eq!(physics.body_count(), 0);
        assert!(matches!(
            physics.apply_intent(body, &MotionIntent::STILL),
            Err(PhysicsError::UnknownBody(_))
        ));
    }
}
