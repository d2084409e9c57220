//! Animation Module
//!
//! Keyframe tracks, clips, actions and the per-avatar mixer, plus the unit
//! retargeting applied to externally-authored clips before they are bound.

pub mod values;
pub mod tracks;
pub mod clip;
pub mod action;
pub mod binding;
pub mod binder;
pub mod mixer;
pub mod retarget;

pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use action::{AnimationAction, LoopMode};
pub use mixer::AnimationMixer;
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use retarget::{rescale_translations, DEFAULT_TRANSLATION_DIVISOR};
