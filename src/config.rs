//! Stage Settings
//!
//! Everything the stage needs to know up front: viewport, camera framing,
//! lighting, the animation catalog, rotation feel and frame pacing. Every
//! field has a default matching the stock mobile embedding, so hosts only
//! override what they need:
//!
//! ```rust,ignore
//! let settings = StageSettings::from_json_str(r#"{ "playback_rate": 1.5 }"#)?;
//! ```

use std::path::Path;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::animation::DEFAULT_TRANSLATION_DIVISOR;
use crate::errors::{AvatarError, Result};
use crate::stage::catalog::{Gender, GenderClips};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    pub viewport: ViewportSettings,
    pub camera: CameraSettings,
    pub lighting: LightingSettings,
    /// RGBA clear colour. Fully transparent by default so the host UI shows through.
    pub clear_color: Vec4,
    pub antialias: bool,
    pub animations: AnimationSettings,
    pub rotation: RotationSettings,
    pub frame_step: FrameStep,
    /// Time scale applied to every bound clip.
    pub playback_rate: f32,
    /// Seed for random dance selection; `None` seeds from the clock.
    pub dance_seed: Option<u64>,
    /// Gender used until the host sets one.
    pub initial_gender: Gender,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            viewport: ViewportSettings::default(),
            camera: CameraSettings::default(),
            lighting: LightingSettings::default(),
            clear_color: Vec4::ZERO,
            antialias: true,
            animations: AnimationSettings::default(),
            rotation: RotationSettings::default(),
            frame_step: FrameStep::default(),
            playback_rate: 1.0,
            dance_seed: None,
            initial_gender: Gender::Male,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: 720,
            height: 1280,
        }
    }
}

impl ViewportSettings {
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
            position: Vec3::new(0.0, 1.0, 4.0),
            target: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub key_light: Option<KeyLightSettings>,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 1.0,
            key_light: Some(KeyLightSettings::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLightSettings {
    pub color: Vec3,
    pub intensity: f32,
    pub direction: Vec3,
}

impl Default for KeyLightSettings {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.8,
            direction: Vec3::new(-1.0, -2.0, -1.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Root the per-gender, per-role animation folders live under.
    pub base_url: String,
    /// Translation keyframes are divided by this before binding.
    pub translation_divisor: f32,
    pub male: GenderClips,
    pub female: GenderClips,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://localhost/assets/animations".to_string(),
            translation_divisor: DEFAULT_TRANSLATION_DIVISOR,
            male: GenderClips {
                idle: "male_idle.glb".to_string(),
                dances: vec![
                    "male_dance_1.glb".to_string(),
                    "male_dance_2.glb".to_string(),
                    "male_dance_3.glb".to_string(),
                ],
            },
            female: GenderClips {
                idle: "female_idle.glb".to_string(),
                dances: vec![
                    "female_dance_1.glb".to_string(),
                    "female_dance_2.glb".to_string(),
                    "female_dance_3.glb".to_string(),
                ],
            },
        }
    }
}

impl AnimationSettings {
    #[must_use]
    pub fn clips_for(&self, gender: Gender) -> &GenderClips {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }
}

/// Drag-to-rotate feel. Velocities are radians per frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSettings {
    /// Radians of velocity gained per pixel of horizontal drag.
    pub acceleration: f32,
    /// Per-frame velocity multiplier, in `[0, 1]`.
    pub damping: f32,
    pub max_velocity: f32,
    /// Below this magnitude the velocity snaps to zero.
    pub min_velocity: f32,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            acceleration: 0.0005,
            damping: 0.95,
            max_velocity: 0.1,
            min_velocity: 1e-5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStep {
    /// Advance animations by a constant step every frame (seconds).
    Fixed(f32),
    /// Advance by the measured wall-clock time since the previous frame.
    Measured,
}

impl Default for FrameStep {
    fn default() -> Self {
        FrameStep::Fixed(0.02)
    }
}

impl StageSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::info!("Loaded stage settings from {}", path.display());
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(invalid(format!("camera.fov_degrees out of range: {}", cam.fov_degrees)));
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(invalid(format!(
                "camera near/far must satisfy 0 < near < far (got {} / {})",
                cam.near, cam.far
            )));
        }
        if !(self.animations.translation_divisor.is_finite() && self.animations.translation_divisor > 0.0) {
            return Err(invalid(format!(
                "animations.translation_divisor must be positive (got {})",
                self.animations.translation_divisor
            )));
        }
        let rot = &self.rotation;
        if !(0.0..=1.0).contains(&rot.damping) {
            return Err(invalid(format!("rotation.damping must be in [0, 1] (got {})", rot.damping)));
        }
        if rot.max_velocity < 0.0 || rot.min_velocity < 0.0 || rot.min_velocity > rot.max_velocity {
            return Err(invalid(format!(
                "rotation velocities must satisfy 0 <= min <= max (got {} / {})",
                rot.min_velocity, rot.max_velocity
            )));
        }
        if let FrameStep::Fixed(step) = self.frame_step
            && !(step.is_finite() && step > 0.0)
        {
            return Err(invalid(format!("frame_step must be positive (got {step})")));
        }
        if !self.playback_rate.is_finite() {
            return Err(invalid("playback_rate must be finite".to_string()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> AvatarError {
    AvatarError::InvalidSettings(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_embedding() {
        let s = StageSettings::default();
        assert_eq!(s.clear_color, Vec4::ZERO);
        assert_eq!(s.camera.position, Vec3::new(0.0, 1.0, 4.0));
        assert_eq!(s.frame_step, FrameStep::Fixed(0.02));
        assert!((s.animations.translation_divisor - 100.0).abs() < f32::EPSILON);
        s.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let s = StageSettings::from_json_str(
            r#"{ "playback_rate": 1.5, "rotation": { "damping": 0.9 }, "frame_step": "measured" }"#,
        )
        .unwrap();
        assert!((s.playback_rate - 1.5).abs() < f32::EPSILON);
        assert!((s.rotation.damping - 0.9).abs() < f32::EPSILON);
        assert!((s.rotation.max_velocity - 0.1).abs() < f32::EPSILON);
        assert_eq!(s.frame_step, FrameStep::Measured);
        assert_eq!(s.animations.female.idle, "female_idle.glb");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            StageSettings::from_json_str(r#"{ "animations": { "translation_divisor": 0.0 } }"#),
            Err(AvatarError::InvalidSettings(_))
        ));
        assert!(matches!(
            StageSettings::from_json_str(r#"{ "rotation": { "damping": 1.5 } }"#),
            Err(AvatarError::InvalidSettings(_))
        ));
        assert!(matches!(
            StageSettings::from_json_str(r#"{ "camera": { "near": 10.0, "far": 5.0 } }"#),
            Err(AvatarError::InvalidSettings(_))
        ));
        assert!(matches!(
            StageSettings::from_json_str("{ not json"),
            Err(AvatarError::JsonError(_))
        ));
    }
}
