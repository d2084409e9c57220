use std::sync::Arc;

use crate::animation::{rescale_translations, AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
use crate::scene::{NodeHandle, Scene, SkeletonKey};
use crate::stage::playback::PlaybackController;

/// The loaded avatar: its subtree in the scene plus everything animating it.
///
/// Clips bound here live as long as the avatar; replacing the avatar drops
/// them with it.
#[derive(Debug)]
pub struct Avatar {
    pub root: NodeHandle,
    pub skeleton: Option<SkeletonKey>,
    pub mixer: AnimationMixer,
    pub playback: PlaybackController,
    /// Time scale given to every clip bound to this avatar.
    pub playback_rate: f32,
    generation: u64,
}

impl Avatar {
    #[must_use]
    pub fn new(root: NodeHandle, skeleton: Option<SkeletonKey>, generation: u64, playback_rate: f32) -> Self {
        Self {
            root,
            skeleton,
            mixer: AnimationMixer::new(),
            playback: PlaybackController::new(),
            playback_rate,
            generation,
        }
    }

    /// Load generation this avatar was created for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn has_clip(&self, name: &str) -> bool {
        self.mixer.contains(name)
    }

    #[must_use]
    pub fn current_clip(&self) -> Option<&str> {
        self.playback.current()
    }

    /// Rescales (when `translation_divisor` is given), binds and stores
    /// `clip` under its name. Returns that name.
    ///
    /// Binds to the skeleton's bones when the avatar is skinned, otherwise to
    /// the whole avatar subtree.
    pub fn register_clip(&mut self, scene: &Scene, mut clip: AnimationClip, translation_divisor: Option<f32>) -> String {
        if let Some(divisor) = translation_divisor {
            rescale_translations(&mut clip, divisor);
        }

        let bindings = match self.skeleton.and_then(|key| scene.skeleton(key)) {
            Some(skeleton) => Binder::bind_to_skeleton(scene, skeleton, &clip),
            None => Binder::bind(scene, self.root, &clip),
        };
        log::debug!(
            "Bound '{}': {} of {} tracks, {:.2}s",
            clip.name,
            bindings.len(),
            clip.tracks.len(),
            clip.duration
        );

        let mut action = AnimationAction::new(Arc::new(clip)).with_bindings(bindings);
        action.loop_mode = LoopMode::Loop;
        action.time_scale = self.playback_rate;
        self.mixer.add_action(action)
    }

    pub fn play(&mut self, name: &str) -> bool {
        self.playback.play(&mut self.mixer, name)
    }

    pub fn play_transient(&mut self, name: &str) -> bool {
        self.playback.play_transient(&mut self.mixer, name)
    }

    /// Advances playback by `dt`, switching to `idle_clip` when a transient
    /// clip has finished its pass, and poses the scene.
    pub fn update(&mut self, dt: f32, scene: &mut Scene, idle_clip: &str) {
        if self.playback.advance(&self.mixer, dt) {
            log::info!("Returning to idle '{idle_clip}'");
            self.playback.play(&mut self.mixer, idle_clip);
        }
        self.mixer.update(dt, scene);

        log::trace!(
            "Avatar frame: current={:?} running={}",
            self.playback.current(),
            self.mixer.running_count()
        );
    }
}
