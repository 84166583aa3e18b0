//! Positions and orientations read back from the physics subsystem.
//!
//! The core never integrates motion itself; it only measures distances
//! between agents and items to drive proximity-based interactions.

use serde::{Deserialize, Serialize};

/// A point or direction in world space. `y` is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// East-west axis.
    pub x: f64,
    /// Vertical axis.
    pub y: f64,
    /// North-south axis.
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Construct a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise sum.
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Multiply every component by `factor`.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy))
    }

    /// Whether `other` lies within `radius` of this point (inclusive).
    pub fn within(self, other: Self, radius: f64) -> bool {
        self.distance_squared(other) <= radius * radius
    }
}

/// Position plus heading of a body.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// World position.
    pub position: Vec3,
    /// Heading around the up axis in degrees; 0 faces +z.
    pub yaw_deg: f64,
}

impl Pose {
    /// Construct a pose.
    pub const fn new(position: Vec3, yaw_deg: f64) -> Self {
        Self { position, yaw_deg }
    }

    /// Unit vector the body is facing, in the horizontal plane.
    pub fn forward(&self) -> Vec3 {
        let rad = self.yaw_deg.to_radians();
        Vec3::new(rad.sin(), 0.0, rad.cos())
    }
}
