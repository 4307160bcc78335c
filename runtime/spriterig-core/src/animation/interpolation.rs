//! Keyframe interpolation for bone animation tracks

use std::fmt;
use std::str::FromStr;

use super::track::Keyframe;
use super::types::{Lerp, Transform};
use crate::error::{Result, RigError};

/// Easing applied to the segment that starts at a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Cubic ease in
    EaseIn,
    /// Cubic ease out
    EaseOut,
    /// Cubic ease in for the first half, ease out for the second
    EaseInOut,
    /// Smoothstep
    Bezier,
}

impl Interpolation {
    pub const ALL: [Self; 5] = [
        Self::Linear,
        Self::EaseIn,
        Self::EaseOut,
        Self::EaseInOut,
        Self::Bezier,
    ];

    /// Map a linear segment parameter to the eased one
    pub fn ease(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powf(3.0) / 2.0
                }
            }
            Self::Bezier => t * t * (3.0 - 2.0 * t),
        }
    }

    /// Persisted name of this mode
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease_in",
            Self::EaseOut => "ease_out",
            Self::EaseInOut => "ease_in_out",
            Self::Bezier => "bezier",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interpolation {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| RigError::unknown_variant("interpolation", s))
    }
}

/// Find the index of the keyframe at or before the given time
///
/// Returns None if there are no keyframes. Among keyframes sharing a time
/// the last one is returned, so the later insertion wins a tie.
pub fn find_keyframe_index(keyframes: &[Keyframe], time: f64) -> Option<usize> {
    if keyframes.is_empty() {
        return None;
    }

    let last_index = keyframes.len() - 1;
    if time >= keyframes[last_index].time {
        return Some(last_index);
    }

    // Largest index where keyframes[index].time <= time
    let mut low = 0;
    let mut high = last_index;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if keyframes[mid].time <= time {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Some(low)
}

/// Sample a sorted keyframe sequence at the given time
///
/// Empty sequences yield the identity transform. Times outside the keyed
/// range clamp to the first or last keyframe.
pub fn sample_keyframes(keyframes: &[Keyframe], time: f64) -> Transform {
    let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else {
        return Transform::IDENTITY;
    };

    if time.is_nan() || time <= first.time {
        return first.transform;
    }
    if time >= last.time {
        return last.transform;
    }

    let Some(index) = find_keyframe_index(keyframes, time) else {
        return Transform::IDENTITY;
    };
    let (Some(kf1), Some(kf2)) = (keyframes.get(index), keyframes.get(index + 1)) else {
        return last.transform;
    };

    let span = kf2.time - kf1.time;
    let t = if span > 0.0 {
        (time - kf1.time) / span
    } else {
        0.0
    };

    // The earlier keyframe's mode governs the segment
    kf1.transform.lerp(&kf2.transform, kf1.interpolation.ease(t))
}
