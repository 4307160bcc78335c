//! Playback clock for a looping animation clip

use super::clip::AnimationClip;

/// Current time and play state of a clip
///
/// Time always stays within `[0, duration]`. Looping is the only mode: once
/// playback reaches the end, time returns to `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    duration: f64,
    fps: u32,
    current_time: f64,
    playing: bool,
}

impl Playback {
    /// Create a paused clock at time zero
    pub fn new(duration: f64, fps: u32) -> Self {
        Self {
            duration: if duration.is_finite() { duration } else { 0.0 },
            fps,
            current_time: 0.0,
            playing: false,
        }
    }

    pub fn for_clip(clip: &AnimationClip) -> Self {
        Self::new(clip.duration, clip.fps)
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Change the clip length, pulling the current time back into range
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_finite() { duration } else { 0.0 };
        self.seek(self.current_time);
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    /// Move time forward by `dt` seconds if playing
    ///
    /// Reaching or passing the end wraps back to `0.0`. Returns the new time.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if !self.playing || !dt.is_finite() {
            return self.current_time;
        }
        if self.duration <= 0.0 {
            self.current_time = 0.0;
            return self.current_time;
        }

        self.current_time = (self.current_time + dt).max(0.0);
        if self.current_time >= self.duration {
            log::trace!("Playback looped at {:.3}s", self.current_time);
            self.current_time = 0.0;
        }
        self.current_time
    }

    /// Jump to `time`, clamped to `[0, duration]`
    pub fn seek(&mut self, time: f64) {
        self.current_time = if time.is_nan() || self.duration <= 0.0 {
            0.0
        } else {
            time.clamp(0.0, self.duration)
        };
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Pause and rewind to the start
    pub fn stop(&mut self) {
        self.playing = false;
        self.current_time = 0.0;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    fn frame_step(&self) -> f64 {
        if self.fps == 0 {
            0.0
        } else {
            1.0 / f64::from(self.fps)
        }
    }

    /// Step one frame forward, stopping at the end
    pub fn step_forward(&mut self) {
        self.seek(self.current_time + self.frame_step());
    }

    /// Step one frame back, stopping at the start
    pub fn step_backward(&mut self) {
        self.seek(self.current_time - self.frame_step());
    }

    pub fn go_to_start(&mut self) {
        self.seek(0.0);
    }

    pub fn go_to_end(&mut self) {
        self.seek(self.duration);
    }

    /// Frame index at the current time
    pub fn current_frame(&self) -> usize {
        (self.current_time * f64::from(self.fps)).floor() as usize
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::for_clip(&AnimationClip::default())
    }
}
