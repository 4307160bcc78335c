//! Projection of sprite instances through a resolved pose

use super::instance::SpriteInstance;
use crate::animation::rotate_offset;
use crate::skeleton::{BoneLayer, ResolvedPose};

/// A sprite instance placed in world space for one frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct ProjectedSprite {
    pub instance_id: String,
    pub sprite_name: String,
    pub bone_name: String,
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees
    pub rotation: f64,
    /// Bone scale times instance scale
    pub scale: f64,
    pub layer: BoneLayer,
    pub layer_order: i32,
}

/// Place an instance using its bone's resolved transform
///
/// Returns `None` for instances with no bone or a bone missing from the pose.
/// The instance offset is rotated by the bone's world rotation, while the
/// sprite itself only picks up the rotation the animation added on top of
/// the bone's baseline.
pub fn project(instance: &SpriteInstance, pose: &ResolvedPose) -> Option<ProjectedSprite> {
    let bone_name = instance.bone_name.as_deref()?;
    let bone = pose.get(bone_name)?;

    let attach = bone.attachment_point(instance.bone_attachment_point);
    let position = attach + rotate_offset(instance.offset(), bone.rotation);

    Some(ProjectedSprite {
        instance_id: instance.id.clone(),
        sprite_name: instance.sprite_name.clone(),
        bone_name: bone_name.to_string(),
        x: position.x,
        y: position.y,
        rotation: instance.offset_rotation + bone.animated_rotation(),
        scale: bone.scale * instance.scale,
        layer: bone.layer,
        layer_order: bone.layer_order,
    })
}
