//! Bone hierarchy transform resolution
//!
//! Walks the skeleton in parent-before-child order and combines each bone's
//! baseline pose with its sampled animation offset. Rotation is not inherited
//! from the parent: a parent only moves a child through the attachment point
//! and through the rotation applied to the child's animated translation.

use glam::DVec2;
use indexmap::IndexMap;

use super::bone::{AttachmentPoint, Bone, BoneLayer};
use super::hierarchy::Skeleton;
use crate::animation::{AnimationClip, rotate_offset};
use crate::error::{Result, RigError};

/// Smallest scale a bone resolves to
pub const MIN_BONE_SCALE: f64 = 0.1;

/// Clamp an animated scale to a usable bone scale
///
/// Zero means the keyframe left scale unset and resolves to `1.0`; anything
/// else is floored at [`MIN_BONE_SCALE`].
pub fn resolve_scale(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale.max(MIN_BONE_SCALE)
    }
}

/// World-space transform of a bone for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct BoneWorldTransform {
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees
    pub rotation: f64,
    pub scale: f64,
    pub length: f64,
    /// Baseline angle the animation rotation was added to
    pub baseline_angle: f64,
    pub layer: BoneLayer,
    pub layer_order: i32,
}

impl BoneWorldTransform {
    /// World position of the bone's start point
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// World position of the bone's tip
    pub fn tip(&self) -> DVec2 {
        self.position() + DVec2::from_angle(self.rotation.to_radians()) * self.length
    }

    pub fn attachment_point(&self, point: AttachmentPoint) -> DVec2 {
        match point {
            AttachmentPoint::Start => self.position(),
            AttachmentPoint::End => self.tip(),
        }
    }

    /// Rotation added by animation on top of the baseline
    pub fn animated_rotation(&self) -> f64 {
        self.rotation - self.baseline_angle
    }
}

/// A bone drawn as a line from its start to its tip
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct BoneSegment {
    pub bone: String,
    pub start: DVec2,
    pub end: DVec2,
}

/// Every bone's world transform at one time, in processing order
///
/// Owned snapshot; a frame's pose can be handed to another thread as is.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct ResolvedPose {
    pub time: f64,
    bones: IndexMap<String, BoneWorldTransform>,
}

impl ResolvedPose {
    pub fn get(&self, bone_name: &str) -> Option<&BoneWorldTransform> {
        self.bones.get(bone_name)
    }

    pub fn contains(&self, bone_name: &str) -> bool {
        self.bones.contains_key(bone_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneWorldTransform)> {
        self.bones.iter().map(|(name, world)| (name.as_str(), world))
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Start and tip of every bone, for skeleton overlays
    pub fn segments(&self) -> Vec<BoneSegment> {
        self.bones
            .iter()
            .map(|(name, world)| BoneSegment {
                bone: name.clone(),
                start: world.position(),
                end: world.tip(),
            })
            .collect()
    }

    pub fn into_inner(self) -> IndexMap<String, BoneWorldTransform> {
        self.bones
    }
}

/// Resolver that keeps the processing order between frames
///
/// The order is recomputed when the skeleton's revision changes. Revisions
/// are unique per process, so a resolver may be handed a different skeleton.
#[derive(Debug, Clone, Default)]
pub struct SkeletonResolver {
    order: Vec<String>,
    revision: Option<u64>,
}

impl SkeletonResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached order
    pub fn invalidate(&mut self) {
        self.order.clear();
        self.revision = None;
    }

    /// Processing order for the skeleton, recomputed after structural edits
    pub fn order(&mut self, skeleton: &Skeleton) -> Result<&[String]> {
        if self.revision != Some(skeleton.revision()) {
            self.revision = None;
            self.order = skeleton.topological_order()?;
            self.revision = Some(skeleton.revision());
            log::debug!(
                "Computed processing order for {} bones at revision {}",
                self.order.len(),
                skeleton.revision()
            );
        }
        Ok(&self.order)
    }

    /// Resolve every bone at `time`
    ///
    /// A cached order that does not cover the skeleton parent-first is
    /// dropped and recomputed.
    pub fn resolve(
        &mut self,
        skeleton: &Skeleton,
        clip: &AnimationClip,
        time: f64,
    ) -> Result<ResolvedPose> {
        let order = self.order(skeleton)?;
        if let Some(pose) = evaluate(skeleton, clip, order, time) {
            return Ok(pose);
        }

        log::debug!("Cached processing order is stale, recomputing");
        self.invalidate();
        let order = self.order(skeleton)?;
        evaluate(skeleton, clip, order, time).ok_or_else(stale_order)
    }
}

/// Resolve every bone at `time` without caching the processing order
pub fn resolve_pose(skeleton: &Skeleton, clip: &AnimationClip, time: f64) -> Result<ResolvedPose> {
    let order = skeleton.topological_order()?;
    evaluate(skeleton, clip, &order, time).ok_or_else(stale_order)
}

fn stale_order() -> RigError {
    RigError::validation("processing order does not match the skeleton")
}

/// Returns `None` when `order` misses a bone or puts a child before its parent
fn evaluate(
    skeleton: &Skeleton,
    clip: &AnimationClip,
    order: &[String],
    time: f64,
) -> Option<ResolvedPose> {
    if order.len() != skeleton.len() {
        return None;
    }
    let mut bones: IndexMap<String, BoneWorldTransform> = IndexMap::with_capacity(order.len());

    for name in order {
        let bone = skeleton.bone(name)?;
        let parent = match bone.parent.as_deref() {
            Some(parent) if skeleton.contains(parent) => Some(bones.get(parent)?),
            _ => None,
        };
        let world = resolve_bone(bone, parent, clip, time);
        log::trace!(
            "{name}: ({:.3}, {:.3}) rot {:.3} scale {:.3}",
            world.x,
            world.y,
            world.rotation,
            world.scale
        );
        bones.insert(name.clone(), world);
    }

    Some(ResolvedPose { time, bones })
}

/// Resolve a single bone given its already resolved parent
pub fn resolve_bone(
    bone: &Bone,
    parent: Option<&BoneWorldTransform>,
    clip: &AnimationClip,
    time: f64,
) -> BoneWorldTransform {
    let baseline = clip.baseline(bone);
    let anim = clip.sample(&bone.name, time);

    let position = match parent {
        Some(parent) => {
            let attach = parent.attachment_point(bone.parent_attachment_point);
            if anim.has_translation() {
                attach + rotate_offset(anim.translation(), parent.rotation)
            } else {
                attach
            }
        }
        None => DVec2::new(baseline.x + anim.x, baseline.y + anim.y),
    };

    BoneWorldTransform {
        x: position.x,
        y: position.y,
        rotation: baseline.angle + anim.rotation,
        scale: resolve_scale(anim.scale),
        length: bone.length,
        baseline_angle: baseline.angle,
        layer: bone.layer,
        layer_order: bone.layer_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationTrack, Keyframe, Transform};
    use test_case::test_case;

    const EPSILON: f64 = 1e-6;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    fn arm(attachment: AttachmentPoint) -> Skeleton {
        Skeleton::from_bones([
            Bone::new("root", 0.0, 0.0, 10.0, 0.0),
            Bone::new("child", 10.0, 0.0, 5.0, 0.0).with_parent("root", attachment),
        ])
        .unwrap()
    }

    fn constant_track(bone: &str, transform: Transform) -> AnimationTrack {
        AnimationTrack::from_keyframes(bone, vec![Keyframe::new(0.0, transform)]).unwrap()
    }

    #[test]
    fn test_rest_pose_without_tracks() {
        let skeleton = arm(AttachmentPoint::End);
        let pose = resolve_pose(&skeleton, &AnimationClip::default(), 0.0).unwrap();

        let child = pose.get("child").unwrap();
        assert_close(child.x, 10.0);
        assert_close(child.y, 0.0);
        assert_close(child.scale, 1.0);
    }

    #[test]
    fn test_child_follows_parent_rotation() {
        let skeleton = arm(AttachmentPoint::End);
        let mut clip = AnimationClip::default();
        clip.insert_track(constant_track("root", Transform::from_rotation(90.0)));

        let pose = resolve_pose(&skeleton, &clip, 0.0).unwrap();
        let root = pose.get("root").unwrap();
        let child = pose.get("child").unwrap();

        assert_close(root.rotation, 90.0);
        assert_close(child.x, 0.0);
        assert_close(child.y, 10.0);
        // Child keeps its own logical angle
        assert_close(child.rotation, 0.0);
    }

    #[test]
    fn test_start_attachment_ignores_parent_length() {
        let skeleton = arm(AttachmentPoint::Start);
        let mut clip = AnimationClip::default();
        clip.insert_track(constant_track("root", Transform::from_rotation(90.0)));

        let pose = resolve_pose(&skeleton, &clip, 0.0).unwrap();
        let child = pose.get("child").unwrap();
        assert_close(child.x, 0.0);
        assert_close(child.y, 0.0);
    }

    #[test]
    fn test_child_offset_rotates_with_parent() {
        let skeleton = arm(AttachmentPoint::End);
        let mut clip = AnimationClip::default();
        clip.insert_track(constant_track("root", Transform::from_rotation(90.0)));
        clip.insert_track(constant_track("child", Transform::from_translation(5.0, 0.0)));

        let pose = resolve_pose(&skeleton, &clip, 0.0).unwrap();
        let child = pose.get("child").unwrap();
        assert_close(child.x, 0.0);
        assert_close(child.y, 15.0);
    }

    #[test]
    fn test_root_offset_is_world_space() {
        let skeleton = arm(AttachmentPoint::End);
        let mut clip = AnimationClip::default();
        clip.insert_track(constant_track("root", Transform::new(3.0, -2.0, 45.0, 1.0)));

        let pose = resolve_pose(&skeleton, &clip, 0.0).unwrap();
        let root = pose.get("root").unwrap();
        assert_close(root.x, 3.0);
        assert_close(root.y, -2.0);
    }

    #[test_case(0.0, 1.0 ; "zero means unset")]
    #[test_case(0.05, 0.1 ; "floored")]
    #[test_case(-2.0, 0.1 ; "negative floored")]
    #[test_case(2.5, 2.5 ; "passes through")]
    fn test_scale_floor(anim_scale: f64, expected: f64) {
        let skeleton = arm(AttachmentPoint::End);
        let mut clip = AnimationClip::default();
        clip.insert_track(constant_track("root", Transform::new(0.0, 0.0, 0.0, anim_scale)));

        let pose = resolve_pose(&skeleton, &clip, 0.0).unwrap();
        assert_close(pose.get("root").unwrap().scale, expected);
    }

    #[test]
    fn test_original_position_is_baseline() {
        let mut skeleton = arm(AttachmentPoint::End);
        let mut clip = AnimationClip::default();
        clip.set_original_positions(skeleton.capture_original_positions());

        // Editing the rest pose afterwards does not move the animated baseline
        skeleton.set_rest_pose("root", 50.0, 50.0, 30.0).unwrap();
        let pose = resolve_pose(&skeleton, &clip, 0.0).unwrap();
        let root = pose.get("root").unwrap();
        assert_close(root.x, 0.0);
        assert_close(root.rotation, 0.0);
        assert_close(root.baseline_angle, 0.0);
    }

    #[test]
    fn test_hip_torso_zero_length_parent() {
        let skeleton = Skeleton::from_bones([
            Bone::new("hip", 100.0, 100.0, 0.0, 0.0),
            Bone::new("torso", 0.0, 0.0, 50.0, -90.0).with_parent("hip", AttachmentPoint::End),
        ])
        .unwrap();
        let mut clip = AnimationClip::new(1.0, 30);
        clip.insert_track(
            AnimationTrack::from_keyframes(
                "hip",
                vec![
                    Keyframe::new(0.0, Transform::from_rotation(90.0)),
                    Keyframe::new(1.0, Transform::from_rotation(0.0)),
                ],
            )
            .unwrap(),
        );

        let pose = resolve_pose(&skeleton, &clip, 0.5).unwrap();
        let hip = pose.get("hip").unwrap();
        let torso = pose.get("torso").unwrap();

        assert_close(hip.rotation, 45.0);
        assert_close(torso.x, 100.0);
        assert_close(torso.y, 100.0);
        assert_close(torso.rotation, -90.0);
    }

    #[test]
    fn test_cycle_fails_resolve() {
        let skeleton = Skeleton::from_bones([
            Bone::new("a", 0.0, 0.0, 1.0, 0.0).with_parent("b", AttachmentPoint::End),
            Bone::new("b", 0.0, 0.0, 1.0, 0.0).with_parent("a", AttachmentPoint::End),
        ])
        .unwrap();

        let err = resolve_pose(&skeleton, &AnimationClip::default(), 0.0).unwrap_err();
        assert!(matches!(err, RigError::StructuralCycle { .. }));

        let mut resolver = SkeletonResolver::new();
        assert!(resolver
            .resolve(&skeleton, &AnimationClip::default(), 0.0)
            .is_err());
        // A failed order is not cached
        assert!(resolver
            .resolve(&skeleton, &AnimationClip::default(), 0.0)
            .is_err());
    }

    #[test]
    fn test_resolver_recomputes_after_structural_edit() {
        let mut skeleton = arm(AttachmentPoint::End);
        let clip = AnimationClip::default();
        let mut resolver = SkeletonResolver::new();

        let first = resolver.resolve(&skeleton, &clip, 0.0).unwrap();
        assert_eq!(first.len(), 2);

        skeleton
            .add_bone(Bone::new("hand", 0.0, 0.0, 2.0, 0.0).with_parent("child", AttachmentPoint::End))
            .unwrap();
        let second = resolver.resolve(&skeleton, &clip, 0.0).unwrap();
        assert_eq!(second.len(), 3);
        assert_close(second.get("hand").unwrap().x, 15.0);
    }

    #[test]
    fn test_resolver_shared_between_skeletons() {
        let clip = AnimationClip::default();
        let mut resolver = SkeletonResolver::new();

        let first = Skeleton::from_bones([
            Bone::new("a", 0.0, 0.0, 1.0, 0.0),
            Bone::new("b", 0.0, 0.0, 1.0, 0.0),
        ])
        .unwrap();
        assert_eq!(resolver.resolve(&first, &clip, 0.0).unwrap().len(), 2);

        // Same names, but `a` now hangs off the tip of `b`
        let second = Skeleton::from_bones([
            Bone::new("a", 0.0, 0.0, 1.0, 0.0).with_parent("b", AttachmentPoint::End),
            Bone::new("b", 50.0, 0.0, 10.0, 0.0),
        ])
        .unwrap();
        let pose = resolver.resolve(&second, &clip, 0.0).unwrap();
        let a = pose.get("a").unwrap();
        assert_close(a.x, 60.0);
        assert_close(a.y, 0.0);

        // Going back to the first skeleton still resolves both bones
        assert_eq!(resolver.resolve(&first, &clip, 0.0).unwrap().len(), 2);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let skeleton = arm(AttachmentPoint::End);
        let mut clip = AnimationClip::default();
        clip.insert_track(constant_track("root", Transform::new(1.0, 2.0, 33.0, 1.5)));

        let mut resolver = SkeletonResolver::new();
        let a = resolver.resolve(&skeleton, &clip, 0.25).unwrap();
        let b = resolver.resolve(&skeleton, &clip, 0.25).unwrap();
        let c = resolve_pose(&skeleton, &clip, 0.25).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_segments() {
        let skeleton = arm(AttachmentPoint::End);
        let pose = resolve_pose(&skeleton, &AnimationClip::default(), 0.0).unwrap();
        let segments = pose.segments();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].bone, "root");
        assert_close(segments[0].end.x, 10.0);
        assert_close(segments[1].end.x, 15.0);
    }

    #[test]
    fn test_pose_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolvedPose>();
    }
}
