//! Playback driver for a rig
//!
//! The AnimationPlayer owns a rig, its playback clock and a resolver with a
//! cached bone order, and turns host ticks into frames.

use super::clip::AnimationClip;
use super::state::Playback;
use crate::error::Result;
use crate::rig::{Frame, Rig};
use crate::skeleton::SkeletonResolver;

/// Drives a rig's animation from a host loop
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    rig: Rig,
    playback: Playback,
    resolver: SkeletonResolver,
}

impl AnimationPlayer {
    /// Create a paused player at time zero
    pub fn new(rig: Rig) -> Self {
        let playback = Playback::for_clip(&rig.clip);
        Self {
            rig,
            playback,
            resolver: SkeletonResolver::new(),
        }
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    /// Mutable access to the rig
    ///
    /// Structural skeleton edits are picked up on the next frame. Clip length
    /// and rate changes are applied to the clock on the next tick.
    pub fn rig_mut(&mut self) -> &mut Rig {
        &mut self.rig
    }

    pub fn into_rig(self) -> Rig {
        self.rig
    }

    /// Replace the clip and rewind
    pub fn set_clip(&mut self, clip: AnimationClip) {
        self.playback = Playback::for_clip(&clip);
        self.rig.clip = clip;
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    fn sync_playback(&mut self) {
        if self.playback.duration() != self.rig.clip.duration {
            self.playback.set_duration(self.rig.clip.duration);
        }
        if self.playback.fps() != self.rig.clip.fps {
            self.playback.set_fps(self.rig.clip.fps);
        }
    }

    /// Advance the clock by `dt` seconds and evaluate the new time
    pub fn update(&mut self, dt: f64) -> Result<Frame> {
        self.sync_playback();
        self.playback.advance(dt);
        self.evaluate()
    }

    /// Frame at the current time
    pub fn evaluate(&mut self) -> Result<Frame> {
        self.sync_playback();
        self.rig
            .frame_with(&mut self.resolver, self.playback.current_time())
    }

    pub fn current_time(&self) -> f64 {
        self.playback.current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn play(&mut self) {
        self.playback.play();
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    pub fn stop(&mut self) {
        self.playback.stop();
    }

    pub fn toggle(&mut self) {
        self.playback.toggle();
    }

    pub fn seek(&mut self, time: f64) {
        self.sync_playback();
        self.playback.seek(time);
    }

    pub fn step_forward(&mut self) {
        self.sync_playback();
        self.playback.step_forward();
    }

    pub fn step_backward(&mut self) {
        self.sync_playback();
        self.playback.step_backward();
    }

    pub fn go_to_start(&mut self) {
        self.playback.go_to_start();
    }

    pub fn go_to_end(&mut self) {
        self.sync_playback();
        self.playback.go_to_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationTrack, Keyframe, Transform};
    use crate::skeleton::{AttachmentPoint, Bone, Skeleton};

    fn player() -> AnimationPlayer {
        let skeleton = Skeleton::from_bones([
            Bone::new("root", 0.0, 0.0, 10.0, 0.0),
            Bone::new("tip", 0.0, 0.0, 1.0, 0.0).with_parent("root", AttachmentPoint::End),
        ])
        .unwrap();
        let mut clip = AnimationClip::new(1.0, 10);
        clip.insert_track(
            AnimationTrack::from_keyframes(
                "root",
                vec![
                    Keyframe::new(0.0, Transform::from_rotation(0.0)),
                    Keyframe::new(1.0, Transform::from_rotation(90.0)),
                ],
            )
            .unwrap(),
        );
        AnimationPlayer::new(Rig::new(skeleton).with_clip(clip))
    }

    #[test]
    fn test_paused_update_holds_time() {
        let mut player = player();
        let frame = player.update(0.5).unwrap();
        assert_eq!(frame.time, 0.0);
    }

    #[test]
    fn test_update_advances_and_loops() {
        let mut player = player();
        player.play();

        let frame = player.update(0.5).unwrap();
        assert_eq!(frame.time, 0.5);
        let root = frame.pose.get("root").unwrap();
        assert!((root.rotation - 45.0).abs() < 1e-9);

        let frame = player.update(0.5).unwrap();
        assert_eq!(frame.time, 0.0);
    }

    #[test]
    fn test_seek_and_stop() {
        let mut player = player();
        player.seek(0.25);
        assert_eq!(player.evaluate().unwrap().time, 0.25);

        player.play();
        player.stop();
        assert!(!player.is_playing());
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_clip_changes_reach_the_clock() {
        let mut player = player();
        player.rig_mut().clip.duration = 0.5;
        player.go_to_end();
        assert_eq!(player.current_time(), 0.5);

        player.set_clip(AnimationClip::new(2.0, 30));
        assert_eq!(player.current_time(), 0.0);
        assert_eq!(player.playback().duration(), 2.0);
    }

    #[test]
    fn test_structural_edit_picked_up() {
        let mut player = player();
        assert_eq!(player.evaluate().unwrap().pose.len(), 2);

        player
            .rig_mut()
            .skeleton
            .add_bone(Bone::new("extra", 0.0, 0.0, 1.0, 0.0))
            .unwrap();
        assert_eq!(player.evaluate().unwrap().pose.len(), 3);
    }

    #[test]
    fn test_swapped_skeleton_resolves_fully() {
        let mut player = player();
        assert_eq!(player.evaluate().unwrap().pose.len(), 2);

        player.rig_mut().skeleton = Skeleton::from_bones([
            Bone::new("child", 0.0, 0.0, 1.0, 0.0).with_parent("a", AttachmentPoint::End),
            Bone::new("a", 100.0, 0.0, 10.0, 0.0),
        ])
        .unwrap();

        let frame = player.evaluate().unwrap();
        assert_eq!(frame.pose.len(), 2);
        let child = frame.pose.get("child").unwrap();
        assert!((child.x - 110.0).abs() < 1e-9);
        assert!(child.y.abs() < 1e-9);
    }
}
