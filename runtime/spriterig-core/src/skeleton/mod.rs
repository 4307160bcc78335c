//! Bone hierarchy and world transform resolution
//!
//! Bones live in a name-keyed [`Skeleton`] arena. Parent links are names, the
//! `children` lists are kept in sync on every edit, and the processing order
//! is an explicit topological sort that reports cycles instead of looping.
//!
//! # Example
//!
//! ```rust
//! use spriterig_core::animation::AnimationClip;
//! use spriterig_core::skeleton::{AttachmentPoint, Bone, Skeleton, SkeletonResolver};
//!
//! let skeleton = Skeleton::from_bones([
//!     Bone::new("hip", 100.0, 100.0, 0.0, 0.0),
//!     Bone::new("torso", 0.0, 0.0, 50.0, -90.0).with_parent("hip", AttachmentPoint::End),
//! ])?;
//!
//! let mut resolver = SkeletonResolver::new();
//! let pose = resolver.resolve(&skeleton, &AnimationClip::default(), 0.0)?;
//! assert_eq!(pose.get("torso").map(|t| (t.x, t.y)), Some((100.0, 100.0)));
//! # Ok::<(), spriterig_core::RigError>(())
//! ```

mod bone;
mod hierarchy;
mod resolver;

pub use bone::{AttachmentPoint, Bone, BoneLayer, OriginalBonePosition};
pub use hierarchy::Skeleton;
pub use resolver::{
    BoneSegment, BoneWorldTransform, MIN_BONE_SCALE, ResolvedPose, SkeletonResolver, resolve_bone,
    resolve_pose, resolve_scale,
};
