//! Transform System
//!
//! Propagates local matrices down the hierarchy into world matrices. It only
//! borrows the node arena and the root list, so it can run while other parts
//! of the scene are borrowed.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates world matrices for every tree under `roots`.
///
/// Uses an explicit stack so deep skeletons cannot overflow the call stack.
/// A node's world matrix is recomputed when its local matrix changed or any
/// ancestor's did.
pub fn update_hierarchy_iterative(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    // (node, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root_handle in roots.iter().rev() {
        stack.push((root_handle, Affine3A::IDENTITY, false));
    }

    while let Some((node_handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        if world_needs_update {
            let new_world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);
        }

        let current_world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, current_world, world_needs_update));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn child_inherits_parent_translation() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();

        let mut parent = Node::new("parent");
        parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let parent_handle = nodes.insert(parent);

        let mut child = Node::new("child");
        child.transform.position = Vec3::new(0.0, 1.0, 0.0);
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);

        nodes[parent_handle].children.push(child_handle);

        update_hierarchy_iterative(&mut nodes, &[parent_handle]);

        let pos = nodes[child_handle].transform.world_matrix.translation;
        assert!((pos.x - 1.0).abs() < 1e-5);
        assert!((pos.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn parent_change_propagates_on_next_update() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let parent_handle = nodes.insert(Node::new("parent"));
        let mut child = Node::new("child");
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);
        nodes[parent_handle].children.push(child_handle);

        update_hierarchy_iterative(&mut nodes, &[parent_handle]);
        nodes[parent_handle].transform.position = Vec3::new(0.0, 0.0, -3.0);
        update_hierarchy_iterative(&mut nodes, &[parent_handle]);

        let pos = nodes[child_handle].transform.world_matrix.translation;
        assert!((pos.z + 3.0).abs() < 1e-5);
    }
}
