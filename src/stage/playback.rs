use crate::animation::{AnimationMixer, LoopMode};

/// Fixed frame steps do not sum exactly to a clip's duration; a countdown
/// this close to zero counts as elapsed.
const COUNTDOWN_EPSILON: f32 = 1e-4;

/// Return-to-idle countdown of a transient clip, in animation seconds.
#[derive(Debug, Clone, PartialEq)]
struct PendingReturn {
    clip: String,
    remaining: f32,
}

/// Keeps exactly one clip current.
///
/// Every successful [`play`](Self::play) stops all actions of the mixer
/// before starting the requested one, so at most one action runs at a time.
/// Transient clips (dances) additionally arm a countdown; when it runs out
/// the owner switches back to idle.
#[derive(Debug, Default)]
pub struct PlaybackController {
    current: Option<String>,
    pending_return: Option<PendingReturn>,
}

impl PlaybackController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Plays `name` looping. Unknown names are a logged no-op returning `false`.
    pub fn play(&mut self, mixer: &mut AnimationMixer, name: &str) -> bool {
        if !mixer.contains(name) {
            log::warn!("Animation '{name}' not found");
            return false;
        }

        mixer.stop_all_action();
        if let Some(action) = mixer.action_mut(name) {
            action.loop_mode = LoopMode::Loop;
            action.play();
        }

        self.current = Some(name.to_string());
        self.pending_return = None;
        log::info!("Playing animation: {name}");
        true
    }

    /// Like [`play`](Self::play), then returns to idle after one pass of the clip.
    pub fn play_transient(&mut self, mixer: &mut AnimationMixer, name: &str) -> bool {
        if !self.play(mixer, name) {
            return false;
        }
        let duration = mixer.action(name).map_or(0.0, |a| a.clip().duration);
        if duration > 0.0 {
            self.pending_return = Some(PendingReturn {
                clip: name.to_string(),
                remaining: duration,
            });
        } else {
            log::debug!("'{name}' has zero duration; no return to idle scheduled");
        }
        true
    }

    #[must_use]
    pub fn is_return_pending(&self) -> bool {
        self.pending_return.is_some()
    }

    pub fn cancel_return(&mut self) {
        self.pending_return = None;
    }

    /// Advances the return countdown by the same amount the mixer advances
    /// the transient action (`dt × time_scale`). Returns `true` once, on the
    /// frame the return to idle is due.
    pub fn advance(&mut self, mixer: &AnimationMixer, dt: f32) -> bool {
        let Some(pending) = &mut self.pending_return else {
            return false;
        };
        let time_scale = mixer.action(&pending.clip).map_or(1.0, |a| a.time_scale);
        pending.remaining -= dt * time_scale.abs();

        if pending.remaining <= COUNTDOWN_EPSILON {
            log::debug!("'{}' finished its pass", pending.clip);
            self.pending_return = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::animation::{
        AnimationAction, AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
    };

    fn action(name: &str, duration: f32) -> AnimationAction {
        let track = Track {
            meta: TrackMeta {
                node_name: "Hips".to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, duration],
                vec![Vec3::ZERO, Vec3::X],
                InterpolationMode::Linear,
            )),
        };
        AnimationAction::new(Arc::new(AnimationClip::new(name, vec![track])))
    }

    fn mixer() -> AnimationMixer {
        let mut mixer = AnimationMixer::new();
        mixer.add_action(action("idle.glb", 2.0));
        mixer.add_action(action("dance.glb", 1.0));
        mixer
    }

    #[test]
    fn unknown_clip_keeps_current() {
        let mut mixer = mixer();
        let mut playback = PlaybackController::new();
        assert!(playback.play(&mut mixer, "idle.glb"));
        assert!(!playback.play(&mut mixer, "missing.glb"));
        assert_eq!(playback.current(), Some("idle.glb"));
        assert_eq!(mixer.running_count(), 1);
    }

    #[test]
    fn one_running_action_after_play() {
        let mut mixer = mixer();
        let mut playback = PlaybackController::new();
        playback.play(&mut mixer, "idle.glb");
        playback.play(&mut mixer, "dance.glb");
        assert_eq!(mixer.running_count(), 1);
        assert!(mixer.action("dance.glb").unwrap().is_running());
        assert!(!mixer.action("idle.glb").unwrap().is_running());
    }

    #[test]
    fn transient_countdown_follows_time_scale() {
        let mut mixer = mixer();
        mixer.action_mut("dance.glb").unwrap().time_scale = 2.0;
        let mut playback = PlaybackController::new();
        assert!(playback.play_transient(&mut mixer, "dance.glb"));

        // 1.0s clip at 2x: due after 0.5s of frames.
        assert!(!playback.advance(&mixer, 0.25));
        assert!(playback.advance(&mixer, 0.25));
        assert!(!playback.advance(&mixer, 0.25), "fires only once");
    }

    #[test]
    fn explicit_play_cancels_return() {
        let mut mixer = mixer();
        let mut playback = PlaybackController::new();
        playback.play_transient(&mut mixer, "dance.glb");
        assert!(playback.is_return_pending());
        playback.play(&mut mixer, "idle.glb");
        assert!(!playback.is_return_pending());
        assert!(!playback.advance(&mixer, 10.0));
    }
}
