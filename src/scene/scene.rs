use glam::Vec4;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::node::Node;
use crate::scene::skeleton::Skeleton;
use crate::scene::transform_system;
use crate::scene::{NodeHandle, SkeletonKey};

/// Scene graph of the avatar stage.
///
/// Pure data: a node arena with parent/child links, the skeleton pool, one
/// perspective camera, the lights, and the colour the frame is cleared to.
/// Rebuilt wholesale whenever the stage re-initialises.
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub skeletons: SlotMap<SkeletonKey, Skeleton>,

    pub camera: Camera,
    pub lights: Vec<Light>,

    /// RGBA; alpha `0.0` lets the host view show through.
    pub clear_color: Vec4,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Camera::new_perspective(45.0, 1.0, 1.0, 1000.0))
    }
}

impl Scene {
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            skeletons: SlotMap::with_key(),
            camera,
            lights: Vec::new(),
            clear_color: Vec4::ZERO,
        }
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Creates a root-level node.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.nodes.insert(Node::new(name));
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(child);
        self.root_nodes.push(handle);
        self.attach(handle, parent);
        handle
    }

    /// Moves `child` under `parent`, detaching it from its previous parent.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found during attach!");
            return;
        }

        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }

        self.nodes[parent].children.push(child);
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    /// Removes `handle` and its whole subtree, along with any skeleton
    /// referenced by a removed node.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let Some(parent) = self.nodes.get(handle).map(|n| n.parent) else {
            return;
        };

        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent)
                    && let Some(pos) = p.children.iter().position(|&x| x == handle)
                {
                    p.children.remove(pos);
                }
            }
            None => self.root_nodes.retain(|&x| x != handle),
        }

        let mut removed_nodes = FxHashSet::default();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.nodes.remove(current) {
                if let Some(skin) = removed.skin {
                    self.skeletons.remove(skin);
                }
                removed_nodes.insert(current);
                stack.extend(removed.children);
            }
        }

        // Skins no node binds still die with their bones.
        self.skeletons
            .retain(|_, skeleton| !skeleton.bones.iter().any(|b| removed_nodes.contains(b)));
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Depth-first search for a node named `name` in the subtree under `root`.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self, key: SkeletonKey) -> Option<&Skeleton> {
        self.skeletons.get(key)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Recomputes world matrices. Call once per frame before rendering.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
    }
}
