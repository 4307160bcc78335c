//! Keyframe animation for skeletal rigs
//!
//! This module provides:
//! - Transform values and linear interpolation
//! - Keyframe tracks with per-segment easing
//! - Animation clips with rest-pose baselines
//! - A looping playback clock and a player that turns ticks into frames
//!
//! # Example
//!
//! ```rust,ignore
//! use spriterig_core::animation::{AnimationPlayer, AnimationTrack, Keyframe, Transform};
//!
//! let mut track = AnimationTrack::new("hip");
//! track.insert(Keyframe::new(0.0, Transform::from_rotation(90.0)))?;
//! track.insert(Keyframe::new(1.0, Transform::IDENTITY))?;
//! rig.clip.insert_track(track);
//!
//! let mut player = AnimationPlayer::new(rig);
//! player.play();
//! let frame = player.update(1.0 / 60.0)?;
//! renderer.draw(&frame.draw_list);
//! ```

mod clip;
mod interpolation;
mod manager;
mod state;
mod track;
mod types;

pub use clip::{AnimationClip, DEFAULT_DURATION, DEFAULT_FPS, MAX_FRAME_COUNT};
pub use interpolation::{Interpolation, find_keyframe_index, sample_keyframes};
pub use manager::AnimationPlayer;
pub use state::Playback;
pub use track::{AnimationTrack, Keyframe};
pub use types::{Lerp, Transform, rotate_offset};
