//! Sprite placements attached to bones

use glam::DVec2;

use crate::skeleton::AttachmentPoint;

/// One placement of a sprite rect onto a bone
///
/// Several instances may share a sprite and several may hang off the same
/// bone. An instance without a bone is inert and never drawn.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteInstance {
    pub id: String,
    pub sprite_name: String,
    pub bone_name: Option<String>,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Fixed rotation in degrees, added to the bone's animated rotation
    pub offset_rotation: f64,
    pub scale: f64,
    pub bone_attachment_point: AttachmentPoint,
}

impl SpriteInstance {
    /// Create an unattached instance with no offset
    pub fn new(id: impl Into<String>, sprite_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sprite_name: sprite_name.into(),
            bone_name: None,
            offset_x: 0.0,
            offset_y: 0.0,
            offset_rotation: 0.0,
            scale: 1.0,
            bone_attachment_point: AttachmentPoint::Start,
        }
    }

    pub fn attached_to(mut self, bone_name: impl Into<String>, point: AttachmentPoint) -> Self {
        self.bone_name = Some(bone_name.into());
        self.bone_attachment_point = point;
        self
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64, offset_rotation: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self.offset_rotation = offset_rotation;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn detach(&mut self) {
        self.bone_name = None;
    }

    pub fn is_attached(&self) -> bool {
        self.bone_name.is_some()
    }

    pub fn offset(&self) -> DVec2 {
        DVec2::new(self.offset_x, self.offset_y)
    }
}
