//! The rig aggregate and its per-frame pipeline
//!
//! A frame is produced in four steps: resolve the skeleton, project every
//! instance through the resolved pose, drop instances that cannot be drawn,
//! and sort the rest into draw order.

use std::fmt;

use indexmap::IndexMap;

use crate::animation::{AnimationClip, MAX_FRAME_COUNT};
use crate::error::{Result, RigError};
use crate::skeleton::{ResolvedPose, Skeleton, SkeletonResolver, resolve_pose};
use crate::sprite::{ProjectedSprite, SpriteInstance, SpriteQuad, SpriteRect, project, sort_in_place};

/// Skeleton, sprites, sprite instances and the animation driving them
#[derive(Debug, Clone, Default)]
pub struct Rig {
    pub skeleton: Skeleton,
    /// Sprite rects keyed by name
    pub sprites: IndexMap<String, SpriteRect>,
    /// Sprite instances keyed by id, in authoring order
    pub instances: IndexMap<String, SpriteInstance>,
    pub clip: AnimationClip,
}

/// Everything the renderer needs for one point in time
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct Frame {
    pub time: f64,
    pub pose: ResolvedPose,
    /// Drawable sprites, back to front
    pub draw_list: Vec<ProjectedSprite>,
}

/// A name that does not resolve to anything in the rig
///
/// These are recoverable: the bone becomes a root, the instance is not
/// drawn, the track is never sampled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum MissingReference {
    BoneParent { bone: String, parent: String },
    InstanceBone { instance: String, bone: String },
    InstanceSprite { instance: String, sprite: String },
    TrackBone { bone: String },
}

impl fmt::Display for MissingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoneParent { bone, parent } => {
                write!(f, "bone '{bone}' has missing parent '{parent}'")
            }
            Self::InstanceBone { instance, bone } => {
                write!(f, "sprite instance '{instance}' is attached to missing bone '{bone}'")
            }
            Self::InstanceSprite { instance, sprite } => {
                write!(f, "sprite instance '{instance}' uses missing sprite '{sprite}'")
            }
            Self::TrackBone { bone } => write!(f, "animation track targets missing bone '{bone}'"),
        }
    }
}

impl Rig {
    pub fn new(skeleton: Skeleton) -> Self {
        Self {
            skeleton,
            ..Self::default()
        }
    }

    pub fn with_clip(mut self, clip: AnimationClip) -> Self {
        self.clip = clip;
        self
    }

    /// Add a sprite rect, rejecting a name already in use
    pub fn add_sprite(&mut self, sprite: SpriteRect) -> Result<()> {
        if self.sprites.contains_key(&sprite.name) {
            return Err(RigError::DuplicateName {
                kind: "sprite",
                name: sprite.name,
            });
        }
        self.sprites.insert(sprite.name.clone(), sprite);
        Ok(())
    }

    /// Add a sprite instance, rejecting an id already in use
    pub fn add_instance(&mut self, instance: SpriteInstance) -> Result<()> {
        if self.instances.contains_key(&instance.id) {
            return Err(RigError::DuplicateName {
                kind: "sprite instance",
                name: instance.id,
            });
        }
        self.instances.insert(instance.id.clone(), instance);
        Ok(())
    }

    /// Resolve, project and sort at `time`
    ///
    /// Pure: the rig is not modified and the same time always yields the
    /// same frame.
    pub fn frame_at(&self, time: f64) -> Result<Frame> {
        let pose = resolve_pose(&self.skeleton, &self.clip, time)?;
        Ok(self.compose_frame(pose))
    }

    /// Like [`Rig::frame_at`] but reusing a resolver's cached bone order
    pub fn frame_with(&self, resolver: &mut SkeletonResolver, time: f64) -> Result<Frame> {
        let pose = resolver.resolve(&self.skeleton, &self.clip, time)?;
        Ok(self.compose_frame(pose))
    }

    /// Project and sort every drawable instance for an already resolved pose
    pub fn compose_frame(&self, pose: ResolvedPose) -> Frame {
        let mut draw_list = Vec::with_capacity(self.instances.len());

        for instance in self.instances.values() {
            if !self.sprites.contains_key(&instance.sprite_name) {
                log::debug!(
                    "Skipping instance '{}': sprite '{}' not loaded",
                    instance.id,
                    instance.sprite_name
                );
                continue;
            }
            match project(instance, &pose) {
                Some(projected) => draw_list.push(projected),
                None => {
                    if let Some(bone_name) = instance.bone_name.as_deref() {
                        log::debug!("Skipping instance '{}': bone '{}' not resolved", instance.id, bone_name);
                    }
                }
            }
        }

        sort_in_place(&mut draw_list);
        Frame {
            time: pose.time,
            pose,
            draw_list,
        }
    }

    /// A frame for every sample time of the clip
    ///
    /// Clips needing more than [`MAX_FRAME_COUNT`] frames are rejected.
    pub fn bake(&self) -> Result<Vec<Frame>> {
        let frame_count = self.clip.frame_count();
        if frame_count > MAX_FRAME_COUNT {
            return Err(RigError::validation(format!(
                "clip needs {frame_count} frames, at most {MAX_FRAME_COUNT} can be baked"
            )));
        }
        let mut resolver = SkeletonResolver::new();
        self.clip
            .frame_times()
            .into_iter()
            .map(|time| self.frame_with(&mut resolver, time))
            .collect()
    }

    /// Origin-aware placement of every sprite in a frame's draw list
    pub fn placements<'a>(&self, frame: &'a Frame) -> Vec<(&'a ProjectedSprite, SpriteQuad)> {
        frame
            .draw_list
            .iter()
            .filter_map(|sprite| {
                self.sprites
                    .get(&sprite.sprite_name)
                    .map(|rect| (sprite, rect.placement(sprite)))
            })
            .collect()
    }

    /// Every name in the rig that points at nothing, each logged as a warning
    pub fn validate_references(&self) -> Vec<MissingReference> {
        let mut missing = Vec::new();

        for bone in self.skeleton.bones() {
            if let Some(parent) = &bone.parent
                && !self.skeleton.contains(parent)
            {
                missing.push(MissingReference::BoneParent {
                    bone: bone.name.clone(),
                    parent: parent.clone(),
                });
            }
        }

        for instance in self.instances.values() {
            if let Some(bone) = &instance.bone_name
                && !self.skeleton.contains(bone)
            {
                missing.push(MissingReference::InstanceBone {
                    instance: instance.id.clone(),
                    bone: bone.clone(),
                });
            }
            if !self.sprites.contains_key(&instance.sprite_name) {
                missing.push(MissingReference::InstanceSprite {
                    instance: instance.id.clone(),
                    sprite: instance.sprite_name.clone(),
                });
            }
        }

        for track in self.clip.tracks() {
            if !self.skeleton.contains(track.bone_name()) {
                missing.push(MissingReference::TrackBone {
                    bone: track.bone_name().to_string(),
                });
            }
        }

        for reference in &missing {
            log::warn!("{reference}");
        }
        missing
    }
}
