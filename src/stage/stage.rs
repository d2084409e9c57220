use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::animation::AnimationClip;
use crate::assets::{GltfAsset, GltfLoader};
use crate::config::StageSettings;
use crate::errors::{AvatarError, Result};
use crate::render::{FrameRenderer, HeadlessRenderer, SurfaceConfig};
use crate::scene::{Camera, Light, Scene};
use crate::stage::avatar::Avatar;
use crate::stage::bridge::HostCommand;
use crate::stage::catalog::{clip_url, AnimationRole, Gender};
use crate::stage::input::DragRotation;
use crate::stage::loader::{AssetLoader, ClipIntent, ClipRequest, LoadEvent, LoadPayload};
use crate::utils::FrameClock;

/// Outcome of a finished background load, as applied on the frame thread.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    ModelLoaded { source: String },
    ModelFailed { source: String, error: String },
    ClipBound { name: String },
    ClipFailed { file: String, error: String },
    /// The load belonged to a replaced scene or avatar, or to a model
    /// request that a later one superseded, and was dropped.
    StaleDiscarded { generation: u64 },
}

/// The avatar display surface.
///
/// Owns the scene, the avatar, the renderer and every piece of mutable state
/// the host drives through [`HostCommand`]s. It lives on the host's frame
/// thread; only asset fetching happens elsewhere.
pub struct AvatarStage<R: FrameRenderer = HeadlessRenderer> {
    settings: StageSettings,
    renderer: R,
    scene: Scene,
    avatar: Option<Avatar>,
    gender: Gender,
    /// Bumped on every scene rebuild and every installed model.
    generation: u64,
    /// Number of the most recent `load_model` call.
    model_request: u64,
    loader: AssetLoader,
    drag: DragRotation,
    clock: FrameClock,
    rng: StdRng,
}

impl AvatarStage<HeadlessRenderer> {
    pub fn headless(settings: StageSettings) -> Result<Self> {
        Self::new(settings, HeadlessRenderer::new())
    }
}

impl<R: FrameRenderer> AvatarStage<R> {
    /// Validates `settings` and builds the initial scene.
    pub fn new(settings: StageSettings, renderer: R) -> Result<Self> {
        settings.validate()?;
        let seed = settings.dance_seed.unwrap_or_else(clock_seed);
        let mut stage = Self {
            gender: settings.initial_gender,
            drag: DragRotation::new(settings.rotation),
            clock: FrameClock::new(settings.frame_step),
            rng: StdRng::seed_from_u64(seed),
            scene: Scene::default(),
            avatar: None,
            generation: 0,
            model_request: 0,
            loader: AssetLoader::new(),
            renderer,
            settings,
        };
        stage.init_scene();
        Ok(stage)
    }

    /// Tears down the renderer state and rebuilds the scene from scratch.
    ///
    /// The avatar goes with it; loads still in flight will be discarded.
    pub fn init_scene(&mut self) {
        log::info!("Initializing scene");
        self.renderer.dispose();

        let s = &self.settings;
        let surface = SurfaceConfig {
            width: s.viewport.width,
            height: s.viewport.height,
            clear_color: s.clear_color,
            antialias: s.antialias,
        };
        self.renderer.configure(&surface);

        let mut camera = Camera::new_perspective(
            s.camera.fov_degrees,
            s.viewport.aspect(),
            s.camera.near,
            s.camera.far,
        );
        camera.place(s.camera.position, s.camera.target);

        let mut scene = Scene::new(camera);
        scene.clear_color = s.clear_color;
        scene.add_light(Light::new_ambient(s.lighting.ambient_color, s.lighting.ambient_intensity));
        if let Some(key) = &s.lighting.key_light {
            scene.add_light(Light::new_directional(key.color, key.intensity, key.direction));
        }

        self.scene = scene;
        self.avatar = None;
        self.drag.reset();
        self.generation += 1;
        self.model_request += 1;
    }

    /// Starts loading the model at `source` (URL or path). The current avatar
    /// stays, clips included, until the new one has been installed; if the
    /// load fails it keeps going as before.
    pub fn load_model(&mut self, source: &str) {
        self.model_request += 1;
        self.loader
            .spawn_model(self.generation, self.model_request, source.to_string());
    }

    /// Switches the gender used for clip selection and fetches its clips.
    ///
    /// If the avatar was idling, it moves on to the new gender's idle clip.
    pub fn set_gender(&mut self, gender: Gender) {
        if gender == self.gender {
            return;
        }
        let old_idle = self.settings.animations.clips_for(self.gender).idle.clone();
        self.gender = gender;
        log::info!("Gender set to {gender}");

        let Some(avatar) = &self.avatar else {
            return;
        };
        let idle_intent = if avatar.current_clip() == Some(old_idle.as_str()) {
            ClipIntent::PlayLoop
        } else {
            ClipIntent::PlayIfIdle
        };
        self.request_catalog(idle_intent);
    }

    /// Plays a bound clip by name, looping.
    pub fn play_animation(&mut self, name: &str) -> bool {
        match &mut self.avatar {
            Some(avatar) => avatar.play(name),
            None => {
                log::warn!("Cannot play '{name}': {}", AvatarError::AvatarMissing);
                false
            }
        }
    }

    /// Plays a random dance of the current gender once, then returns to idle.
    pub fn play_random_dance(&mut self) {
        if self.avatar.is_none() {
            log::warn!("Cannot dance: {}", AvatarError::AvatarMissing);
            return;
        }
        let dances = &self.settings.animations.clips_for(self.gender).dances;
        if dances.is_empty() {
            log::warn!("No dance clips configured for {}", self.gender);
            return;
        }
        let file = dances[self.rng.random_range(0..dances.len())].clone();
        log::info!("Random dance: {file}");
        self.request_clip(&file, AnimationRole::Dance, ClipIntent::PlayTransient);
    }

    /// Number keys switch clips: `"1"` idle, `"2"`.. the dances.
    pub fn handle_key(&mut self, key: &str) {
        let Some(file) = self.settings.animations.clips_for(self.gender).clip_for_key(key) else {
            return;
        };
        let file = file.to_string();
        self.play_animation(&file);
    }

    pub fn pointer_down(&mut self, x: f32) {
        self.drag.pointer_down(x);
    }

    pub fn pointer_move(&mut self, x: f32) {
        self.drag.pointer_move(x);
    }

    pub fn pointer_up(&mut self) {
        self.drag.pointer_up();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.settings.viewport.width = width;
        self.settings.viewport.height = height;
        self.scene.camera.set_aspect(self.settings.viewport.aspect());
        self.renderer.resize(width, height);
    }

    /// Applies one host command.
    pub fn handle_command(&mut self, command: HostCommand) {
        log::debug!("Host command: {command:?}");
        match command {
            HostCommand::LoadModel { url } => self.load_model(&url),
            HostCommand::SetGender { gender } => self.set_gender(gender),
            HostCommand::PlayRandomDance => self.play_random_dance(),
            HostCommand::PlayAnimation { name } => {
                self.play_animation(&name);
            }
            HostCommand::PointerDown { x } => self.pointer_down(x),
            HostCommand::PointerMove { x } => self.pointer_move(x),
            HostCommand::PointerUp => self.pointer_up(),
            HostCommand::Key { key } => self.handle_key(&key),
            HostCommand::Resize { width, height } => self.resize(width, height),
            HostCommand::Reload => self.init_scene(),
        }
    }

    /// Runs one frame: applies finished loads, advances animation and input,
    /// updates world matrices and renders. Returns the applied load outcomes.
    pub fn frame(&mut self) -> Vec<StageEvent> {
        let events = self.pump_loads();
        let dt = self.clock.next_dt();

        if let Some(avatar) = &mut self.avatar {
            if let Some(root) = self.scene.get_node_mut(avatar.root) {
                self.drag.apply(&mut root.transform);
            }
            let idle = &self.settings.animations.clips_for(self.gender).idle;
            avatar.update(dt, &mut self.scene, idle);
        }

        self.scene.update_matrix_world();
        self.renderer.render(&self.scene);
        events
    }

    /// Applies every load that has finished, without blocking.
    pub fn pump_loads(&mut self) -> Vec<StageEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.loader.try_recv() {
            events.push(self.apply_load(event));
        }
        events
    }

    /// Blocks until no load is in flight or `timeout` has passed, applying
    /// results as they arrive. Loads started by applied results (a model's
    /// clips) are waited for too.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> Vec<StageEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while self.loader.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!("Timed out with {} load(s) in flight", self.loader.in_flight());
                break;
            }
            if let Some(event) = self.loader.recv_timeout(remaining) {
                events.push(self.apply_load(event));
            }
        }
        events
    }

    fn apply_load(&mut self, event: LoadEvent) -> StageEvent {
        let superseded = match &event.payload {
            LoadPayload::Model { request, .. } => *request != self.model_request,
            LoadPayload::Clip { .. } => false,
        };
        if superseded || event.generation != self.generation {
            log::debug!(
                "Discarding load of generation {} (current {}, superseded: {superseded})",
                event.generation,
                self.generation
            );
            return StageEvent::StaleDiscarded {
                generation: event.generation,
            };
        }

        match event.payload {
            LoadPayload::Model { source, result, .. } => match result.and_then(|asset| self.install_model(&asset)) {
                Ok(()) => {
                    log::info!("Model loaded: {source}");
                    StageEvent::ModelLoaded { source }
                }
                Err(err) => {
                    log::error!("Model load failed ({source}): {err}");
                    StageEvent::ModelFailed {
                        source,
                        error: err.to_string(),
                    }
                }
            },
            LoadPayload::Clip { request, url, result } => match result.and_then(|clip| self.install_clip(&request, clip)) {
                Ok(name) => StageEvent::ClipBound { name },
                Err(err) => {
                    log::error!(
                        "Animation load failed ({} {} '{}', {url}): {err}",
                        request.gender,
                        request.role,
                        request.file
                    );
                    StageEvent::ClipFailed {
                        file: request.file,
                        error: err.to_string(),
                    }
                }
            },
        }
    }

    /// Instantiates `asset` and swaps it in for the current avatar. On error
    /// the current avatar is left untouched.
    fn install_model(&mut self, asset: &GltfAsset) -> Result<()> {
        let model = GltfLoader::instantiate(asset, &mut self.scene)?;
        if let Some(old) = self.avatar.take() {
            self.scene.remove_node(old.root);
        }
        self.drag.reset();
        // Clips still in flight for the old avatar are now stale.
        self.generation += 1;

        let mut avatar = Avatar::new(model.root, model.skeleton, self.generation, self.settings.playback_rate);
        for clip in model.clips {
            avatar.register_clip(&self.scene, clip, None);
        }
        self.avatar = Some(avatar);

        self.request_catalog(ClipIntent::PlayIfIdle);
        Ok(())
    }

    fn install_clip(&mut self, request: &ClipRequest, clip: AnimationClip) -> Result<String> {
        let Some(avatar) = &mut self.avatar else {
            return Err(AvatarError::AvatarMissing);
        };
        let name = avatar.register_clip(
            &self.scene,
            clip,
            Some(self.settings.animations.translation_divisor),
        );
        log::info!("{} {} animation '{name}' assigned to avatar", request.gender, request.role);
        Self::apply_intent(avatar, &name, request.intent);
        Ok(name)
    }

    fn apply_intent(avatar: &mut Avatar, name: &str, intent: ClipIntent) {
        match intent {
            ClipIntent::Preload => {}
            ClipIntent::PlayIfIdle => {
                if avatar.current_clip().is_none() {
                    avatar.play(name);
                }
            }
            ClipIntent::PlayLoop => {
                avatar.play(name);
            }
            ClipIntent::PlayTransient => {
                avatar.play_transient(name);
            }
        }
    }

    /// Requests the current gender's idle clip with `idle_intent` and
    /// preloads its dances.
    fn request_catalog(&mut self, idle_intent: ClipIntent) {
        let clips = self.settings.animations.clips_for(self.gender).clone();
        for (role, file) in clips.files() {
            let intent = match role {
                AnimationRole::Idle => idle_intent,
                AnimationRole::Dance => ClipIntent::Preload,
            };
            self.request_clip(file, role, intent);
        }
    }

    /// Applies `intent` right away if `file` is already bound, otherwise
    /// fetches it for the current gender.
    fn request_clip(&mut self, file: &str, role: AnimationRole, intent: ClipIntent) {
        let Some(avatar) = &mut self.avatar else {
            return;
        };
        if avatar.has_clip(file) {
            Self::apply_intent(avatar, file, intent);
            return;
        }
        let url = clip_url(&self.settings.animations.base_url, self.gender, role, file);
        let request = ClipRequest {
            file: file.to_string(),
            gender: self.gender,
            role,
            intent,
        };
        self.loader.spawn_clip(self.generation, url, request);
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&Avatar> {
        self.avatar.as_ref()
    }

    #[must_use]
    pub fn current_clip(&self) -> Option<&str> {
        self.avatar.as_ref().and_then(Avatar::current_clip)
    }

    #[must_use]
    pub fn gender(&self) -> Gender {
        self.gender
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn loads_in_flight(&self) -> usize {
        self.loader.in_flight()
    }

    #[must_use]
    pub fn rotation_velocity(&self) -> f32 {
        self.drag.velocity()
    }

    #[must_use]
    pub fn settings(&self) -> &StageSettings {
        &self.settings
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}
