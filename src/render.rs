//! Frame Renderer Seam
//!
//! The stage does not own a GPU pipeline. It hands a fully updated [`Scene`]
//! to a [`FrameRenderer`] once per frame; hosts plug in whatever backend
//! draws into their embedded surface. [`HeadlessRenderer`] is the built-in
//! backend: it records what would have been drawn, which is all the host
//! binary and the tests need.

use glam::{Affine3A, Mat4, Vec4};

use crate::scene::Scene;

/// Surface configuration handed to a renderer on (re)initialisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    /// RGBA; alpha `0.0` keeps the host view visible behind the avatar.
    pub clear_color: Vec4,
    pub antialias: bool,
}

/// A rendering backend driven by the stage.
pub trait FrameRenderer {
    /// (Re)configures the backend. Called on every scene rebuild.
    fn configure(&mut self, config: &SurfaceConfig);

    fn resize(&mut self, width: u32, height: u32);

    /// Draws one frame. World matrices of `scene` are up to date.
    fn render(&mut self, scene: &Scene);

    /// Releases backend state. The renderer may be configured again afterwards.
    fn dispose(&mut self);
}

/// One mesh node as seen by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub node_name: String,
    pub mesh_name: String,
    pub world_matrix: Affine3A,
    pub skinned: bool,
}

/// What the most recent frame contained.
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshot {
    pub frame_index: u64,
    pub view_projection: Mat4,
    pub draws: Vec<DrawRecord>,
}

/// Renderer that records frames instead of drawing them.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    config: Option<SurfaceConfig>,
    frames_rendered: u64,
    disposals: u32,
    last_frame: Option<FrameSnapshot>,
}

impl HeadlessRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(&self) -> Option<&SurfaceConfig> {
        self.config.as_ref()
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// How many times [`dispose`](FrameRenderer::dispose) has been called.
    #[must_use]
    pub fn disposals(&self) -> u32 {
        self.disposals
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.last_frame.as_ref()
    }
}

impl FrameRenderer for HeadlessRenderer {
    fn configure(&mut self, config: &SurfaceConfig) {
        log::debug!(
            "Headless surface {}x{} (clear alpha {})",
            config.width,
            config.height,
            config.clear_color.w
        );
        self.config = Some(*config);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(config) = &mut self.config {
            config.width = width;
            config.height = height;
        }
    }

    fn render(&mut self, scene: &Scene) {
        if self.config.is_none() {
            log::trace!("Headless render skipped: surface not configured");
            return;
        }

        let draws = scene
            .nodes
            .values()
            .filter(|node| node.visible)
            .filter_map(|node| {
                node.mesh.as_ref().map(|mesh| DrawRecord {
                    node_name: node.name.clone(),
                    mesh_name: mesh.name.clone(),
                    world_matrix: *node.world_matrix(),
                    skinned: node.is_skinned(),
                })
            })
            .collect();

        self.frames_rendered += 1;
        self.last_frame = Some(FrameSnapshot {
            frame_index: self.frames_rendered,
            view_projection: scene.camera.view_projection_matrix(),
            draws,
        });
    }

    fn dispose(&mut self) {
        self.config = None;
        self.last_frame = None;
        self.disposals += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshRef, Node};

    fn surface() -> SurfaceConfig {
        SurfaceConfig {
            width: 720,
            height: 1280,
            clear_color: Vec4::ZERO,
            antialias: true,
        }
    }

    #[test]
    fn records_visible_meshes_only() {
        let mut scene = Scene::default();
        let root = scene.create_node_with_name("avatar_root");

        let mut body = Node::new("Body");
        body.mesh = Some(MeshRef {
            name: "BodyMesh".to_string(),
            primitive_count: 2,
        });
        scene.add_to_parent(body, root);

        let mut hidden = Node::new("Hat");
        hidden.mesh = Some(MeshRef {
            name: "HatMesh".to_string(),
            primitive_count: 1,
        });
        hidden.visible = false;
        scene.add_to_parent(hidden, root);
        scene.update_matrix_world();

        let mut renderer = HeadlessRenderer::new();
        renderer.render(&scene);
        assert_eq!(renderer.frames_rendered(), 0, "unconfigured renderer draws nothing");

        renderer.configure(&surface());
        renderer.render(&scene);
        let frame = renderer.last_frame().unwrap();
        assert_eq!(frame.frame_index, 1);
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(frame.draws[0].mesh_name, "BodyMesh");
    }

    #[test]
    fn dispose_then_reconfigure() {
        let mut renderer = HeadlessRenderer::new();
        renderer.configure(&surface());
        renderer.resize(100, 0);
        assert_eq!(renderer.config().unwrap().width, 720);
        renderer.resize(100, 200);
        assert_eq!(renderer.config().unwrap().height, 200);

        renderer.dispose();
        assert!(renderer.config().is_none());
        assert_eq!(renderer.disposals(), 1);

        renderer.configure(&surface());
        assert!(renderer.config().is_some());
    }
}
