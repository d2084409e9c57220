use rustc_hash::FxHashMap;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::skeleton::Skeleton;
use crate::scene::{NodeHandle, Scene};

/// Resolves clip tracks to concrete scene nodes by node name.
pub struct Binder;

impl Binder {
    /// Binds `clip` against every node in the subtree under `root_node`.
    #[must_use]
    pub fn bind(scene: &Scene, root_node: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut lookup = FxHashMap::default();
        collect_subtree_names(scene, root_node, &mut lookup);
        Self::bind_with_lookup(&lookup, clip)
    }

    /// Binds `clip` against the bones of `skeleton` only.
    #[must_use]
    pub fn bind_to_skeleton(scene: &Scene, skeleton: &Skeleton, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut lookup = FxHashMap::default();
        for &bone in &skeleton.bones {
            if let Some(node) = scene.get_node(bone) {
                lookup.entry(node.name.clone()).or_insert(bone);
            }
        }
        Self::bind_with_lookup(&lookup, clip)
    }

    fn bind_with_lookup(lookup: &FxHashMap<String, NodeHandle>, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());
        let mut unbound = 0usize;

        for (track_index, track) in clip.tracks.iter().enumerate() {
            if let Some(&node_handle) = lookup.get(&track.meta.node_name) {
                bindings.push(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                });
            } else {
                unbound += 1;
                log::debug!("Clip '{}': no node for track '{}'", clip.name, track.name());
            }
        }

        if unbound > 0 {
            log::debug!(
                "Clip '{}': bound {} of {} tracks",
                clip.name,
                bindings.len(),
                clip.tracks.len()
            );
        }
        bindings
    }
}

/// First node wins on duplicate names, matching depth-first lookup order.
fn collect_subtree_names(scene: &Scene, root: NodeHandle, out: &mut FxHashMap<String, NodeHandle>) {
    let mut stack = vec![root];
    while let Some(handle) = stack.pop() {
        let Some(node) = scene.get_node(handle) else {
            continue;
        };
        out.entry(node.name.clone()).or_insert(handle);
        stack.extend(node.children().iter().rev().copied());
    }
}
