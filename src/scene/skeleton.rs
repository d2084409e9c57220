use glam::Affine3A;

use crate::scene::NodeHandle;

/// Bone list of a skinned avatar.
///
/// `bones[i]` corresponds to joint `i` of the skinned meshes it deforms.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    pub bones: Vec<NodeHandle>,
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,
    pub(crate) root_bone_index: usize,
}

impl Skeleton {
    #[must_use]
    pub fn new(
        name: &str,
        bones: Vec<NodeHandle>,
        inverse_bind_matrices: Vec<Affine3A>,
        root_bone_index: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            root_bone_index,
        }
    }

    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrices(&self) -> &[Affine3A] {
        &self.inverse_bind_matrices
    }
}
