#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod config;
pub mod errors;
pub mod render;
pub mod scene;
pub mod stage;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use assets::{GltfAsset, GltfLoader};
pub use config::StageSettings;
pub use errors::{AvatarError, Result};
pub use render::{FrameRenderer, HeadlessRenderer};
pub use scene::{Camera, Light, Node, Scene};
pub use stage::{AvatarStage, Gender, HostCommand, StageEvent};
