//! Sprite sheet rectangles and origin-aware placement geometry

use glam::DVec2;

use super::projector::ProjectedSprite;
use crate::animation::rotate_offset;

/// A named region of the sprite sheet
///
/// `origin_x`/`origin_y` locate the pivot as a fraction of the width and
/// height; `(0.5, 0.5)` is the centre.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteRect {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub origin_x: f64,
    pub origin_y: f64,
}

/// Where a projected sprite's pixels land in world space
///
/// Corners are listed top-left, top-right, bottom-right, bottom-left in the
/// sprite's own frame, after rotation about the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct SpriteQuad {
    /// Scaled width
    pub width: f64,
    /// Scaled height
    pub height: f64,
    /// Pivot in scaled pixels from the sprite's top-left
    pub origin: DVec2,
    pub corners: [DVec2; 4],
    /// Top-left of the axis-aligned bounds of the rotated quad
    pub bounds_min: DVec2,
    /// Size of the axis-aligned bounds of the rotated quad
    pub bounds_size: DVec2,
}

impl SpriteRect {
    /// Create a rect with a centred origin
    pub fn new(name: impl Into<String>, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
            origin_x: 0.5,
            origin_y: 0.5,
        }
    }

    pub fn with_origin(mut self, origin_x: f64, origin_y: f64) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }

    pub fn has_positive_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn origin_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.origin_x) && (0.0..=1.0).contains(&self.origin_y)
    }

    /// Whether the rect has a positive size and lies inside a sheet
    pub fn fits_within(&self, sheet_width: i32, sheet_height: i32) -> bool {
        self.has_positive_size()
            && self.x >= 0
            && self.y >= 0
            && i64::from(self.x) + i64::from(self.width) <= i64::from(sheet_width)
            && i64::from(self.y) + i64::from(self.height) <= i64::from(sheet_height)
    }

    /// Pivot in unscaled pixels from the rect's top-left
    pub fn origin_pixels(&self) -> DVec2 {
        DVec2::new(
            f64::from(self.width) * self.origin_x,
            f64::from(self.height) * self.origin_y,
        )
    }

    /// Place this sprite at a projected position
    ///
    /// The origin sits at the projected `(x, y)`, the image is scaled by the
    /// projected scale and rotated about the origin by the projected rotation.
    pub fn placement(&self, sprite: &ProjectedSprite) -> SpriteQuad {
        let width = f64::from(self.width) * sprite.scale;
        let height = f64::from(self.height) * sprite.scale;
        let origin = DVec2::new(width * self.origin_x, height * self.origin_y);
        let anchor = DVec2::new(sprite.x, sprite.y);

        let corners = [
            DVec2::new(0.0, 0.0),
            DVec2::new(width, 0.0),
            DVec2::new(width, height),
            DVec2::new(0.0, height),
        ]
        .map(|corner| anchor + rotate_offset(corner - origin, sprite.rotation));

        let bounds_min = corners.iter().copied().fold(DVec2::INFINITY, DVec2::min);
        let bounds_max = corners.iter().copied().fold(DVec2::NEG_INFINITY, DVec2::max);

        SpriteQuad {
            width,
            height,
            origin,
            corners,
            bounds_min,
            bounds_size: bounds_max - bounds_min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::BoneLayer;

    fn projected(x: f64, y: f64, rotation: f64, scale: f64) -> ProjectedSprite {
        ProjectedSprite {
            instance_id: "i".into(),
            sprite_name: "s".into(),
            bone_name: "b".into(),
            x,
            y,
            rotation,
            scale,
            layer: BoneLayer::Middle,
            layer_order: 0,
        }
    }

    fn assert_vec(actual: DVec2, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
            "expected ({x}, {y}), got {actual}"
        );
    }

    #[test]
    fn test_fits_within() {
        assert!(SpriteRect::new("a", 0, 0, 32, 32).fits_within(64, 64));
        assert!(SpriteRect::new("a", 32, 32, 32, 32).fits_within(64, 64));
        assert!(!SpriteRect::new("a", 40, 0, 32, 32).fits_within(64, 64));
        assert!(!SpriteRect::new("a", -1, 0, 8, 8).fits_within(64, 64));
        assert!(!SpriteRect::new("a", 0, 0, 0, 8).fits_within(64, 64));
    }

    #[test]
    fn test_unrotated_placement_centres_origin() {
        let rect = SpriteRect::new("head", 0, 0, 20, 10);
        let quad = rect.placement(&projected(100.0, 50.0, 0.0, 1.0));

        assert_vec(quad.origin, 10.0, 5.0);
        assert_vec(quad.corners[0], 90.0, 45.0);
        assert_vec(quad.corners[2], 110.0, 55.0);
        assert_vec(quad.bounds_min, 90.0, 45.0);
        assert_vec(quad.bounds_size, 20.0, 10.0);
    }

    #[test]
    fn test_scaled_placement() {
        let rect = SpriteRect::new("head", 0, 0, 20, 10).with_origin(0.0, 0.0);
        let quad = rect.placement(&projected(0.0, 0.0, 0.0, 2.0));

        assert_eq!((quad.width, quad.height), (40.0, 20.0));
        assert_vec(quad.corners[0], 0.0, 0.0);
        assert_vec(quad.corners[2], 40.0, 20.0);
    }

    #[test]
    fn test_rotation_about_top_left_origin() {
        let rect = SpriteRect::new("arm", 0, 0, 10, 4).with_origin(0.0, 0.0);
        let quad = rect.placement(&projected(5.0, 5.0, 90.0, 1.0));

        // Origin corner stays put, the width now runs down the y axis
        assert_vec(quad.corners[0], 5.0, 5.0);
        assert_vec(quad.corners[1], 5.0, 15.0);
        assert_vec(quad.corners[3], 1.0, 5.0);
        assert_vec(quad.bounds_min, 1.0, 5.0);
        assert_vec(quad.bounds_size, 4.0, 10.0);
    }

    #[test]
    fn test_rotated_bounds_grow() {
        let rect = SpriteRect::new("box", 0, 0, 10, 10);
        let quad = rect.placement(&projected(0.0, 0.0, 45.0, 1.0));
        let diagonal = 10.0 * std::f64::consts::SQRT_2;
        assert!((quad.bounds_size.x - diagonal).abs() < 1e-9);
        assert!((quad.bounds_size.y - diagonal).abs() < 1e-9);
    }
}
