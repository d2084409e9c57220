//! Host bridge.
//!
//! The embedding application drives the stage with [`HostCommand`]s, either
//! constructed directly or decoded from JSON messages such as
//! `{"command": "load_model", "url": "https://.../avatar.glb"}`. The
//! camel-case function names older hosts call (`loadGLBModel`, `setGender`,
//! `playRandomDance`) are accepted as aliases.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::render::FrameRenderer;
use crate::stage::catalog::Gender;
use crate::stage::stage::AvatarStage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    #[serde(alias = "loadGLBModel")]
    LoadModel { url: String },
    #[serde(alias = "setGender")]
    SetGender { gender: Gender },
    #[serde(alias = "playRandomDance")]
    PlayRandomDance,
    #[serde(alias = "playAnimation")]
    PlayAnimation { name: String },
    PointerDown { x: f32 },
    PointerMove { x: f32 },
    PointerUp,
    Key { key: String },
    Resize { width: u32, height: u32 },
    Reload,
}

impl HostCommand {
    pub fn from_json(message: &str) -> Result<Self> {
        Ok(serde_json::from_str(message)?)
    }
}

/// Decodes `message` and applies it to `stage`.
///
/// Only decoding errors are returned; what the command does afterwards
/// (loads, playback) is logged by the stage and never fails the call.
pub fn handle_message<R: FrameRenderer>(stage: &mut AvatarStage<R>, message: &str) -> Result<()> {
    let command = HostCommand::from_json(message)?;
    stage.handle_command(command);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AvatarError;

    #[test]
    fn decodes_snake_case_commands() {
        assert_eq!(
            HostCommand::from_json(r#"{"command": "load_model", "url": "avatar.glb"}"#).unwrap(),
            HostCommand::LoadModel {
                url: "avatar.glb".to_string()
            }
        );
        assert_eq!(
            HostCommand::from_json(r#"{"command": "resize", "width": 300, "height": 600}"#).unwrap(),
            HostCommand::Resize {
                width: 300,
                height: 600
            }
        );
        assert_eq!(
            HostCommand::from_json(r#"{"command": "pointer_up"}"#).unwrap(),
            HostCommand::PointerUp
        );
    }

    #[test]
    fn accepts_host_function_names() {
        assert_eq!(
            HostCommand::from_json(r#"{"command": "loadGLBModel", "url": "https://x/a.glb"}"#).unwrap(),
            HostCommand::LoadModel {
                url: "https://x/a.glb".to_string()
            }
        );
        assert_eq!(
            HostCommand::from_json(r#"{"command": "setGender", "gender": "female"}"#).unwrap(),
            HostCommand::SetGender {
                gender: Gender::Female
            }
        );
        assert_eq!(
            HostCommand::from_json(r#"{"command": "playRandomDance"}"#).unwrap(),
            HostCommand::PlayRandomDance
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(matches!(
            HostCommand::from_json(r#"{"command": "explode"}"#),
            Err(AvatarError::JsonError(_))
        ));
        assert!(matches!(
            HostCommand::from_json(r#"{"command": "set_gender", "gender": "robot"}"#),
            Err(AvatarError::JsonError(_))
        ));
    }
}
