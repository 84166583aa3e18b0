//! The rectangular play area and random spawn placement.
//!
//! Agents and items spawn at uniformly random points inside the arena
//! floor, inset by a margin from every edge, at a fixed height above the
//! arena centre. When the arena is too small to honour the margin on an
//! axis, that axis collapses to the centre.

use rand::Rng;
use serde::{Deserialize, Serialize};

use freezetag_types::{Pose, Vec3};

use crate::error::WorldError;

/// Default inset from the arena edges for spawn points.
pub const DEFAULT_SPAWN_MARGIN: f64 = 1.0;

/// Default spawn height above the arena centre.
pub const DEFAULT_SPAWN_HEIGHT: f64 = 0.5;

/// Axis-aligned arena bounds plus spawn placement rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Centre of the arena floor.
    #[serde(default)]
    pub center: Vec3,
    /// Full extent along each axis (`y` is unused for placement).
    #[serde(default = "default_size")]
    pub size: Vec3,
    /// Inset from every edge for spawn points.
    #[serde(default = "default_margin")]
    pub spawn_margin: f64,
    /// Height above `center.y` at which bodies and items are placed.
    #[serde(default = "default_height")]
    pub spawn_height: f64,
}

const fn default_size() -> Vec3 {
    Vec3::new(30.0, 10.0, 30.0)
}

const fn default_margin() -> f64 {
    DEFAULT_SPAWN_MARGIN
}

const fn default_height() -> f64 {
    DEFAULT_SPAWN_HEIGHT
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: default_size(),
            spawn_margin: DEFAULT_SPAWN_MARGIN,
            spawn_height: DEFAULT_SPAWN_HEIGHT,
        }
    }
}

impl Arena {
    /// Check that the dimensions are usable.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidArena`] for negative or non-finite sizes
    /// and margins.
    pub fn validate(&self) -> Result<(), WorldError> {
        let values = [
            self.center.x,
            self.center.y,
            self.center.z,
            self.size.x,
            self.size.y,
            self.size.z,
            self.spawn_margin,
            self.spawn_height,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(WorldError::InvalidArena {
                reason: "dimensions must be finite",
            });
        }
        if self.size.x < 0.0 || self.size.z < 0.0 || self.spawn_margin < 0.0 {
            return Err(WorldError::InvalidArena {
                reason: "size and margin must be non-negative",
            });
        }
        Ok(())
    }

    /// Lowest corner of the arena.
    pub fn min(&self) -> Vec3 {
        self.center.add(self.size.scale(-0.5))
    }

    /// Highest corner of the arena.
    pub fn max(&self) -> Vec3 {
        self.center.add(self.size.scale(0.5))
    }

    /// Height of the ground plane.
    pub const fn ground(&self) -> f64 {
        self.center.y
    }

    /// Clamp a point into the arena footprint (horizontal axes only).
    pub fn clamp_horizontal(&self, point: Vec3) -> Vec3 {
        let lo = self.min();
        let hi = self.max();
        Vec3::new(point.x.clamp(lo.x, hi.x), point.y, point.z.clamp(lo.z, hi.z))
    }

    /// A uniformly random spawn point.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec3 {
        let lo = self.min();
        let hi = self.max();
        let x = sample_axis(rng, lo.x, hi.x, self.spawn_margin, self.center.x);
        let z = sample_axis(rng, lo.z, hi.z, self.spawn_margin, self.center.z);
        Vec3::new(x, self.center.y + self.spawn_height, z)
    }

    /// A random spawn point with a random heading.
    pub fn random_pose(&self, rng: &mut impl Rng) -> Pose {
        let position = self.random_point(rng);
        let yaw = rng.random_range(0.0..360.0);
        Pose::new(position, yaw)
    }
}

/// Sample `[lo + margin, hi - margin)`, or `center` when that range is empty.
fn sample_axis(rng: &mut impl Rng, lo: f64, hi: f64, margin: f64, center: f64) -> f64 {
    let from = lo + margin;
    let to = hi - margin;
    if from < to {
        rng.random_range(from..to)
    } else {
        center
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn spawn_points_respect_margin_and_height() {
        let arena = Arena::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = arena.random_point(&mut rng);
            assert!(p.x >= -14.0 && p.x < 14.0);
            assert!(p.z >= -14.0 && p.z < 14.0);
            assert!((p.y - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn tiny_arena_collapses_to_center() {
        let arena = Arena {
            center: Vec3::new(3.0, 1.0, -2.0),
            size: Vec3::new(1.5, 1.0, 1.5),
            ..Arena::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let p = arena.random_point(&mut rng);
        assert!((p.x - 3.0).abs() < 1e-9);
        assert!((p.z + 2.0).abs() < 1e-9);
        assert!((p.y - 1.5).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_points() {
        let arena = Arena::default();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(arena.random_pose(&mut a), arena.random_pose(&mut b));
        }
    }

    #[test]
    fn clamp_keeps_height() {
        let arena = Arena::default();
        let p = arena.clamp_horizontal(Vec3::new(100.0, 7.0, -100.0));
        assert!((p.x - 15.0).abs() < 1e-9);
        assert!((p.y - 7.0).abs() < 1e-9);
        assert!((p.z + 15.0).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_bad_sizes() {
        let negative = Arena {
            size: Vec3::new(-1.0, 0.0, 5.0),
            ..Arena::default()
        };
        assert!(negative.validate().is_err());

        let nan = Arena {
            spawn_margin: f64::NAN,
            ..Arena::default()
        };
        assert!(nan.validate().is_err());
        assert!(Arena::default().validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let arena: Arena = serde_json::from_str(r#"{"size":{"x":10.0,"y":2.0,"z":10.0}}"#).unwrap();
        assert!((arena.spawn_margin - 1.0).abs() < 1e-9);
        assert!((arena.max().x - 5.0).abs() < 1e-9);
    }
}
