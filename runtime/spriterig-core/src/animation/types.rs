//! Common value types for the animation system

use glam::DVec2;

/// Animated offset applied to a bone on top of its rest pose
///
/// Translation is in world units, rotation in degrees. A scale of `0.0`
/// means "unset" to the resolver, not "collapse".
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees
    pub rotation: f64,
    pub scale: f64,
}

impl Transform {
    /// No translation, no rotation, unit scale
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale: 1.0,
    };

    /// Create a new transform
    pub const fn new(x: f64, y: f64, rotation: f64, scale: f64) -> Self {
        Self {
            x,
            y,
            rotation,
            scale,
        }
    }

    /// Translation-only transform
    pub const fn from_translation(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    /// Rotation-only transform
    pub const fn from_rotation(rotation: f64) -> Self {
        Self::new(0.0, 0.0, rotation, 1.0)
    }

    /// Translation part as a vector
    pub fn translation(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Check whether the translation part is exactly zero
    pub fn has_translation(&self) -> bool {
        self.x != 0.0 || self.y != 0.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Trait for types that can be linearly interpolated
pub trait Lerp: Clone {
    /// Linear interpolation between self and other
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Transform {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x.lerp(&other.x, t),
            y: self.y.lerp(&other.y, t),
            rotation: self.rotation.lerp(&other.rotation, t),
            scale: self.scale.lerp(&other.scale, t),
        }
    }
}

/// Rotate an offset vector by `degrees` with the standard 2D rotation matrix
pub fn rotate_offset(offset: DVec2, degrees: f64) -> DVec2 {
    DVec2::from_angle(degrees.to_radians()).rotate(offset)
}
