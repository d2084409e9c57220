use crate::scene::transform::Transform;
use crate::scene::{NodeHandle, SkeletonKey};
use glam::Affine3A;

/// Mesh attached to a node.
///
/// Geometry stays with the frame renderer; the scene only records what the
/// node draws so the renderer and the binder can reason about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRef {
    pub name: String,
    pub primitive_count: usize,
}

/// A scene node: hierarchy links, transform and optional components.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,
    pub visible: bool,

    pub mesh: Option<MeshRef>,
    /// Skeleton deforming this node's mesh.
    pub skin: Option<SkeletonKey>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            mesh: None,
            skin: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.skin.is_some()
    }

    /// World matrix as of the last [`Scene::update_matrix_world`](crate::scene::Scene::update_matrix_world).
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
