//! Per-bone keyframe tracks

use super::interpolation::{Interpolation, sample_keyframes};
use super::types::Transform;
use crate::error::{Result, RigError};

/// A time-stamped transform on a bone track
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    /// Time in seconds
    pub time: f64,
    pub transform: Transform,
    /// Easing for the segment from this keyframe to the next
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub interpolation: Interpolation,
    /// Sprite instance to show on the bone from this keyframe on
    #[cfg_attr(
        feature = "serde-support",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub sprite_instance_id: Option<String>,
}

impl Keyframe {
    /// Create a linear keyframe
    pub fn new(time: f64, transform: Transform) -> Self {
        Self {
            time,
            transform,
            interpolation: Interpolation::Linear,
            sprite_instance_id: None,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_sprite_instance(mut self, instance_id: impl Into<String>) -> Self {
        self.sprite_instance_id = Some(instance_id.into());
        self
    }
}

/// Ordered keyframe timeline for one bone
///
/// Keyframes stay sorted ascending by time across every mutation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct AnimationTrack {
    bone_name: String,
    keyframes: Vec<Keyframe>,
}

impl AnimationTrack {
    /// Create an empty track
    pub fn new(bone_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            keyframes: Vec::new(),
        }
    }

    /// Build a track from keyframes in any order
    ///
    /// Equal times keep their relative input order.
    pub fn from_keyframes(bone_name: impl Into<String>, keyframes: Vec<Keyframe>) -> Result<Self> {
        for keyframe in &keyframes {
            validate_time(keyframe.time)?;
        }

        let mut keyframes = keyframes;
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));

        Ok(Self {
            bone_name: bone_name.into(),
            keyframes,
        })
    }

    pub fn bone_name(&self) -> &str {
        &self.bone_name
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Time of the first keyframe
    pub fn start_time(&self) -> Option<f64> {
        self.keyframes.first().map(|kf| kf.time)
    }

    /// Time of the last keyframe
    pub fn end_time(&self) -> Option<f64> {
        self.keyframes.last().map(|kf| kf.time)
    }

    /// Interpolated transform at `time`
    pub fn sample(&self, time: f64) -> Transform {
        sample_keyframes(&self.keyframes, time)
    }

    /// Insert a keyframe, after any existing keyframes with the same time
    ///
    /// Returns the index the keyframe landed at.
    pub fn insert(&mut self, keyframe: Keyframe) -> Result<usize> {
        validate_time(keyframe.time)?;

        let index = self.keyframes.partition_point(|kf| kf.time <= keyframe.time);
        self.keyframes.insert(index, keyframe);
        Ok(index)
    }

    /// Replace the transform of the keyframe near `time`, or insert a new one
    ///
    /// The first keyframe within `tolerance` of `time` is updated in place.
    pub fn upsert_at(&mut self, time: f64, transform: Transform, tolerance: f64) -> Result<usize> {
        validate_time(time)?;

        if let Some(index) = self
            .keyframes
            .iter()
            .position(|kf| (kf.time - time).abs() < tolerance)
        {
            self.keyframes[index].transform = transform;
            return Ok(index);
        }

        self.insert(Keyframe::new(time, transform))
    }

    /// Remove the keyframe at `index`
    pub fn remove(&mut self, index: usize) -> Option<Keyframe> {
        (index < self.keyframes.len()).then(|| self.keyframes.remove(index))
    }

    /// Change the easing of the segment starting at `index`
    pub fn set_interpolation(&mut self, index: usize, interpolation: Interpolation) -> Result<()> {
        let len = self.keyframes.len();
        let keyframe = self.keyframes.get_mut(index).ok_or_else(|| {
            RigError::ReferenceError(format!(
                "keyframe index {index} out of range for track '{}' ({len} keyframes)",
                self.bone_name
            ))
        })?;
        keyframe.interpolation = interpolation;
        Ok(())
    }

    /// Sprite instance selected by the most recent keyframe at or before `time`
    pub fn active_sprite_instance(&self, time: f64) -> Option<&str> {
        self.keyframes
            .iter()
            .take_while(|kf| kf.time <= time)
            .filter_map(|kf| kf.sprite_instance_id.as_deref())
            .last()
    }
}

fn validate_time(time: f64) -> Result<()> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(RigError::validation(format!(
            "keyframe time must be finite and non-negative, got {time}"
        )))
    }
}
