//! Scene Graph Module
//!
//! Manages the renderable scene of the avatar stage:
//! - Node: scene node (parent/child links and a transform)
//! - Transform: TRS component with cached local/world matrices
//! - Scene: node arena, skeleton pool, camera, lights, clear colour
//! - Camera: perspective camera
//! - Light: ambient and directional lights
//! - Skeleton: bone list of a skinned avatar

pub mod node;
pub mod transform;
pub mod transform_system;
pub mod scene;
pub mod camera;
pub mod light;
pub mod skeleton;

pub use node::{MeshRef, Node};
pub use transform::Transform;
pub use scene::Scene;
pub use camera::Camera;
pub use light::{Light, LightKind};
pub use skeleton::Skeleton;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct SkeletonKey;
}
