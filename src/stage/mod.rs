//! Avatar Stage
//!
//! The application layer on top of the scene and animation modules:
//!
//! - [`AvatarStage`]: the context object the host drives (scene bootstrap,
//!   model and clip loading, playback, input, frames)
//! - [`Avatar`]: the loaded model and its mixer
//! - [`PlaybackController`]: one current clip, timed return to idle
//! - [`DragRotation`]: drag-to-rotate with damping
//! - [`catalog`]: gendered idle/dance clip files and their URLs
//! - [`loader`]: background fetches tagged with a load generation
//! - [`bridge`]: host commands and their JSON form

pub mod avatar;
pub mod bridge;
pub mod catalog;
pub mod input;
pub mod loader;
pub mod playback;
#[allow(clippy::module_inception)]
pub mod stage;

pub use avatar::Avatar;
pub use bridge::{handle_message, HostCommand};
pub use catalog::{clip_url, AnimationRole, Gender, GenderClips};
pub use input::DragRotation;
pub use loader::{AssetLoader, ClipIntent, ClipRequest, LoadEvent, LoadPayload};
pub use playback::PlaybackController;
pub use stage::{AvatarStage, StageEvent};
