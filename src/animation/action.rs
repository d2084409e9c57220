use std::sync::Arc;

use crate::animation::{
    binding::{PropertyBinding, TargetPath},
    clip::{AnimationClip, TrackData},
    tracks::KeyframeCursor,
};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// A clip bound to concrete scene nodes, plus its playback state.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    /// Creates a stopped action; call [`play`](Self::play) to start it.
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 0.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: false,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: Vec<PropertyBinding>) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.clip.name
    }

    /// Starts the action from the beginning at full weight.
    pub fn play(&mut self) {
        self.reset();
        self.enabled = true;
        self.paused = false;
        self.weight = 1.0;
    }

    /// Stops the action and rewinds it.
    pub fn stop(&mut self) {
        self.enabled = false;
        self.weight = 0.0;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
        for cursor in &mut self.track_cursors {
            cursor.last_index = 0;
        }
    }

    /// Enabled, not paused and contributing.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.enabled && !self.paused && self.weight > 0.0
    }

    /// Weight the mixer applies this frame (`0.0` when not running).
    #[inline]
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        if self.enabled { self.weight } else { 0.0 }
    }

    /// Advances local time by `dt * time_scale`, honouring the loop mode.
    pub fn update(&mut self, dt: f32) {
        if self.paused || !self.enabled {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                if self.time >= duration {
                    self.time %= duration;
                } else if self.time < 0.0 {
                    self.time = duration + (self.time % duration);
                }
            }
            LoopMode::PingPong => {
                let double_duration = duration * 2.0;
                let mut t = self.time % double_duration;
                if t < 0.0 {
                    t += double_duration;
                }
                if t > duration {
                    t = double_duration - t;
                }
                self.time = t;
            }
        }
    }

    /// Samples every bound track at the current time and writes the result
    /// into the target nodes' transforms.
    pub fn apply(&mut self, scene: &mut Scene) {
        let time = self.time;
        for binding in &self.bindings {
            let Some(track) = self.clip.tracks.get(binding.track_index) else {
                continue;
            };
            let Some(cursor) = self.track_cursors.get_mut(binding.track_index) else {
                continue;
            };
            let Some(node) = scene.get_node_mut(binding.node_handle) else {
                continue;
            };

            match (&track.data, binding.target) {
                (TrackData::Vector3(t), TargetPath::Translation) => {
                    if let Some(v) = t.sample_with_cursor(time, cursor) {
                        node.transform.position = v;
                    }
                }
                (TrackData::Vector3(t), TargetPath::Scale) => {
                    if let Some(v) = t.sample_with_cursor(time, cursor) {
                        node.transform.scale = v;
                    }
                }
                (TrackData::Quaternion(t), TargetPath::Rotation) => {
                    if let Some(q) = t.sample_with_cursor(time, cursor) {
                        node.transform.rotation = q;
                    }
                }
                _ => {}
            }
        }
    }
}
