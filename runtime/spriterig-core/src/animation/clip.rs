//! Animation clip: the per-bone tracks plus their rest-pose baselines

use indexmap::IndexMap;

use super::track::AnimationTrack;
use super::types::Transform;
use crate::skeleton::{Bone, OriginalBonePosition};

/// Default playback rate for clips that do not specify one
pub const DEFAULT_FPS: u32 = 30;

/// Default clip length in seconds
pub const DEFAULT_DURATION: f64 = 5.0;

/// Most frames [`AnimationClip::frame_times`] will produce
pub const MAX_FRAME_COUNT: usize = 1_000_000;

/// A keyframed animation over a skeleton
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct AnimationClip {
    /// Length in seconds
    pub duration: f64,
    /// Frames per second, used for stepping and baking
    pub fps: u32,
    tracks: IndexMap<String, AnimationTrack>,
    original_positions: IndexMap<String, OriginalBonePosition>,
}

impl Default for AnimationClip {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION, DEFAULT_FPS)
    }
}

impl AnimationClip {
    pub fn new(duration: f64, fps: u32) -> Self {
        Self {
            duration,
            fps,
            tracks: IndexMap::new(),
            original_positions: IndexMap::new(),
        }
    }

    pub fn track(&self, bone_name: &str) -> Option<&AnimationTrack> {
        self.tracks.get(bone_name)
    }

    pub fn track_mut(&mut self, bone_name: &str) -> Option<&mut AnimationTrack> {
        self.tracks.get_mut(bone_name)
    }

    /// Track for a bone, created empty on first use
    pub fn track_entry(&mut self, bone_name: &str) -> &mut AnimationTrack {
        self.tracks
            .entry(bone_name.to_string())
            .or_insert_with(|| AnimationTrack::new(bone_name))
    }

    pub fn tracks(&self) -> impl Iterator<Item = &AnimationTrack> {
        self.tracks.values()
    }

    /// Insert a track keyed by its bone, returning any track it replaces
    pub fn insert_track(&mut self, track: AnimationTrack) -> Option<AnimationTrack> {
        self.tracks.insert(track.bone_name().to_string(), track)
    }

    pub fn remove_track(&mut self, bone_name: &str) -> Option<AnimationTrack> {
        self.tracks.shift_remove(bone_name)
    }

    pub fn clear_tracks(&mut self) {
        self.tracks.clear();
    }

    /// Sampled animation offset for a bone, identity when it has no track
    pub fn sample(&self, bone_name: &str, time: f64) -> Transform {
        self.tracks
            .get(bone_name)
            .map_or(Transform::IDENTITY, |track| track.sample(time))
    }

    pub fn original_position(&self, bone_name: &str) -> Option<OriginalBonePosition> {
        self.original_positions.get(bone_name).copied()
    }

    pub fn original_positions(&self) -> &IndexMap<String, OriginalBonePosition> {
        &self.original_positions
    }

    pub fn set_original_position(&mut self, bone_name: impl Into<String>, position: OriginalBonePosition) {
        self.original_positions.insert(bone_name.into(), position);
    }

    pub fn set_original_positions(&mut self, positions: IndexMap<String, OriginalBonePosition>) {
        self.original_positions = positions;
    }

    /// Baseline pose for a bone, falling back to its current rest pose
    pub fn baseline(&self, bone: &Bone) -> OriginalBonePosition {
        self.original_position(&bone.name)
            .unwrap_or_else(|| OriginalBonePosition::of(bone))
    }

    /// Sprite instance each track selects at `time`, keyed by bone
    pub fn active_sprite_instances(&self, time: f64) -> IndexMap<&str, &str> {
        self.tracks
            .values()
            .filter_map(|track| {
                track
                    .active_sprite_instance(time)
                    .map(|instance| (track.bone_name(), instance))
            })
            .collect()
    }

    /// Length of one frame in seconds
    pub fn frame_duration(&self) -> f64 {
        if self.fps == 0 {
            0.0
        } else {
            1.0 / f64::from(self.fps)
        }
    }

    /// Frame index containing `time`
    pub fn frame_index(&self, time: f64) -> usize {
        if !time.is_finite() || time <= 0.0 {
            return 0;
        }
        (time * f64::from(self.fps)).floor() as usize
    }

    /// Number of frames needed to cover `[0, duration]`, both ends included
    ///
    /// Saturates at `usize::MAX` for absurd durations.
    pub fn frame_count(&self) -> usize {
        if self.fps == 0 || !self.duration.is_finite() || self.duration <= 0.0 {
            return 1;
        }
        self.frame_index(self.duration).saturating_add(1)
    }

    /// Sample times `i / fps` for every frame, clamped to the duration
    ///
    /// Stops after [`MAX_FRAME_COUNT`] frames.
    pub fn frame_times(&self) -> Vec<f64> {
        let step = self.frame_duration();
        let end = self.duration.max(0.0);
        (0..self.frame_count().min(MAX_FRAME_COUNT))
            .map(|i| (i as f64 * step).min(end))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Keyframe;
    use pretty_assertions::assert_eq;

    fn clip_with_hip_track() -> AnimationClip {
        let mut clip = AnimationClip::new(1.0, 4);
        let track = AnimationTrack::from_keyframes(
            "hip",
            vec![
                Keyframe::new(0.0, Transform::from_rotation(90.0)).with_sprite_instance("hip_a"),
                Keyframe::new(1.0, Transform::from_rotation(0.0)),
            ],
        )
        .unwrap();
        clip.insert_track(track);
        clip
    }

    #[test]
    fn test_sample_missing_track_is_identity() {
        let clip = clip_with_hip_track();
        assert_eq!(clip.sample("torso", 0.5), Transform::IDENTITY);
        assert!((clip.sample("hip", 0.5).rotation - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_baseline_falls_back_to_rest_pose() {
        let mut clip = AnimationClip::default();
        let bone = Bone::new("hip", 3.0, 4.0, 1.0, 15.0);

        assert_eq!(clip.baseline(&bone), OriginalBonePosition::new(3.0, 4.0, 15.0));

        clip.set_original_position("hip", OriginalBonePosition::new(0.0, 0.0, 0.0));
        assert_eq!(clip.baseline(&bone), OriginalBonePosition::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_insert_track_replaces() {
        let mut clip = clip_with_hip_track();
        let previous = clip.insert_track(AnimationTrack::new("hip"));
        assert_eq!(previous.map(|t| t.len()), Some(2));
        assert!(clip.track("hip").unwrap().is_empty());
    }

    #[test]
    fn test_track_entry_creates_once() {
        let mut clip = AnimationClip::default();
        clip.track_entry("arm")
            .insert(Keyframe::new(0.0, Transform::IDENTITY))
            .unwrap();
        clip.track_entry("arm")
            .insert(Keyframe::new(1.0, Transform::IDENTITY))
            .unwrap();
        assert_eq!(clip.tracks().count(), 1);
        assert_eq!(clip.track("arm").unwrap().len(), 2);
    }

    #[test]
    fn test_active_sprite_instances() {
        let clip = clip_with_hip_track();
        let active = clip.active_sprite_instances(0.5);
        assert_eq!(active.get("hip"), Some(&"hip_a"));
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn test_frame_times() {
        let clip = AnimationClip::new(1.0, 4);
        assert_eq!(clip.frame_count(), 5);
        assert_eq!(clip.frame_times(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(clip.frame_index(0.6), 2);

        let empty = AnimationClip::new(0.0, 30);
        assert_eq!(empty.frame_times(), vec![0.0]);
    }

    #[test]
    fn test_frame_count_saturates_for_huge_duration() {
        let clip = AnimationClip::new(1e300, 30);
        assert_eq!(clip.frame_count(), usize::MAX);
        assert_eq!(clip.frame_times().len(), MAX_FRAME_COUNT);
    }
}
