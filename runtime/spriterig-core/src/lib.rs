//! 2D skeletal sprite animation runtime
//!
//! Resolves a bone hierarchy against keyframed animation, projects the sprite
//! instances attached to the bones and orders them for drawing. Pixel work is
//! left to the host renderer.
//!
//! ```rust
//! use spriterig_core::{Rig, RigError};
//! use spriterig_core::skeleton::{AttachmentPoint, Bone, Skeleton};
//! use spriterig_core::sprite::{SpriteInstance, SpriteRect};
//!
//! let skeleton = Skeleton::from_bones([
//!     Bone::new("body", 0.0, 0.0, 20.0, -90.0),
//!     Bone::new("head", 0.0, 0.0, 8.0, -90.0).with_parent("body", AttachmentPoint::End),
//! ])?;
//! let mut rig = Rig::new(skeleton);
//! rig.add_sprite(SpriteRect::new("face", 0, 0, 16, 16))?;
//! rig.add_instance(SpriteInstance::new("face_0", "face").attached_to("head", AttachmentPoint::Start))?;
//!
//! let frame = rig.frame_at(0.0)?;
//! assert_eq!(frame.draw_list.len(), 1);
//! # Ok::<(), RigError>(())
//! ```

#![forbid(unsafe_code)]

// Re-export main components
pub mod animation;
pub mod error;
#[cfg(feature = "serde-support")]
pub mod project;
pub mod rig;
pub mod skeleton;
pub mod sprite;

pub use animation::{AnimationClip, AnimationPlayer, AnimationTrack, Interpolation, Keyframe, Transform};
pub use error::{Result, RigError};
pub use rig::{Frame, MissingReference, Rig};
pub use skeleton::{AttachmentPoint, Bone, BoneLayer, ResolvedPose, Skeleton, SkeletonResolver};
pub use sprite::{ProjectedSprite, SpriteInstance, SpriteRect};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
