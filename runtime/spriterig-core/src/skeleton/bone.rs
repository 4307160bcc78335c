//! Bone records and their closed enums

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use indexmap::IndexMap;

use super::Skeleton;
use crate::error::{Result, RigError};

/// Which end of a bone segment something attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AttachmentPoint {
    /// Base of the segment
    Start,
    /// Tip of the segment
    End,
}

impl AttachmentPoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentPoint {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(RigError::unknown_variant("attachment point", other)),
        }
    }
}

/// Coarse draw layer of a bone's sprites
///
/// Variants are declared in draw order so `Ord` sorts BEHIND first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BoneLayer {
    Behind,
    #[default]
    Middle,
    Front,
}

impl BoneLayer {
    pub const DRAW_ORDER: [Self; 3] = [Self::Behind, Self::Middle, Self::Front];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Behind => "behind",
            Self::Middle => "middle",
            Self::Front => "front",
        }
    }
}

impl fmt::Display for BoneLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoneLayer {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::DRAW_ORDER
            .into_iter()
            .find(|layer| layer.as_str() == s)
            .ok_or_else(|| RigError::unknown_variant("layer", s))
    }
}

/// A rigid segment in the skeleton tree
///
/// `children` mirrors the parent links and is maintained by
/// [`Skeleton`](super::Skeleton); the `parent` field is authoritative.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct Bone {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub length: f64,
    /// Rest angle in degrees
    pub angle: f64,
    pub parent: Option<String>,
    pub parent_attachment_point: AttachmentPoint,
    pub(crate) children: Vec<String>,
    pub layer: BoneLayer,
    /// Order within the layer, higher draws on top
    pub layer_order: i32,
}

impl Bone {
    /// Create a root bone on the middle layer
    pub fn new(name: impl Into<String>, x: f64, y: f64, length: f64, angle: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            length,
            angle,
            parent: None,
            parent_attachment_point: AttachmentPoint::End,
            children: Vec::new(),
            layer: BoneLayer::Middle,
            layer_order: 0,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>, attachment: AttachmentPoint) -> Self {
        self.parent = Some(parent.into());
        self.parent_attachment_point = attachment;
        self
    }

    pub fn with_layer(mut self, layer: BoneLayer, layer_order: i32) -> Self {
        self.layer = layer;
        self.layer_order = layer_order;
        self
    }

    /// Names of the bones attached to this one
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Rest position of the bone's start point
    pub fn rest_position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RigError::validation("bone name must not be empty"));
        }
        if !self.length.is_finite() || self.length < 0.0 {
            return Err(RigError::validation(format!(
                "bone '{}' has invalid length {}",
                self.name, self.length
            )));
        }
        Ok(())
    }
}

/// Rest pose snapshot used as the animation baseline
///
/// Keyframe transforms are offsets from this pose, so later edits to a
/// bone's rest fields do not shift existing animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginalBonePosition {
    pub x: f64,
    pub y: f64,
    /// Angle in degrees
    pub angle: f64,
}

impl OriginalBonePosition {
    pub const fn new(x: f64, y: f64, angle: f64) -> Self {
        Self { x, y, angle }
    }

    /// Snapshot a bone's current rest pose
    pub fn of(bone: &Bone) -> Self {
        Self::new(bone.x, bone.y, bone.angle)
    }

    /// Snapshot the rest pose of every bone in a skeleton
    pub fn capture(skeleton: &Skeleton) -> IndexMap<String, Self> {
        skeleton.capture_original_positions()
    }
}

impl From<[f64; 3]> for OriginalBonePosition {
    fn from([x, y, angle]: [f64; 3]) -> Self {
        Self::new(x, y, angle)
    }
}

impl From<OriginalBonePosition> for [f64; 3] {
    fn from(pos: OriginalBonePosition) -> Self {
        [pos.x, pos.y, pos.angle]
    }
}

#[cfg(feature = "serde-support")]
impl serde::Serialize for OriginalBonePosition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        <[f64; 3]>::from(*self).serialize(serializer)
    }
}

#[cfg(feature = "serde-support")]
impl<'de> serde::Deserialize<'de> for OriginalBonePosition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        <[f64; 3]>::deserialize(deserializer).map(Self::from)
    }
}
