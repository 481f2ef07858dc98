//! Red-black rebalancing.
//!
//! Both fixups are written once for a node hanging off the left of its parent and mirrored by
//! swapping `dir` with `1 - dir`.

use super::node::{Color, NodeId, Tree, HEADER, LEFT, RIGHT};

/// Restores the red-black invariants after `id` was attached as a red leaf.
pub fn rebalance_insert<K, V>(tree: &mut Tree<K, V>, mut id: NodeId) {
    loop {
        let parent = tree.parent(id);
        // The header is never red, so this also stops at the root.
        if !tree.is_red(Some(parent)) { break; }

        // A red parent is never the root, so the grandparent is a real node.
        let grandparent = tree.parent(parent);
        let dir = tree.side(parent);
        let uncle = tree.child(grandparent, 1 - dir);

        if tree.is_red(uncle) {
            tree.set_color(parent, Color::Black);
            if let Some(uncle) = uncle { tree.set_color(uncle, Color::Black); }
            tree.set_color(grandparent, Color::Red);
            id = grandparent;
            continue;
        }

        // Zig-zag: turn the inner grandchild into an outer one.
        if tree.child(parent, 1 - dir) == Some(id) {
            id = parent;
            tree.rotate(id, dir);
        }

        let parent = tree.parent(id);
        let grandparent = tree.parent(parent);
        tree.set_color(parent, Color::Black);
        tree.set_color(grandparent, Color::Red);
        tree.rotate(grandparent, 1 - dir);
    }

    if let Some(root) = tree.root() { tree.set_color(root, Color::Black); }
}

/// Restores the red-black invariants after a black node was spliced out.
///
/// `id` is the node that took the removed node's place, if any, and `parent` is its parent.
/// `id` carries an extra unit of blackness that is pushed up the tree or absorbed by rotations.
pub fn rebalance_remove<K, V>(tree: &mut Tree<K, V>, mut id: Option<NodeId>,
                              mut parent: NodeId) {

    while id != tree.root() && !tree.is_red(id) {
        debug_assert!(parent != HEADER);

        let dir = if tree.child(parent, LEFT) == id { LEFT } else { RIGHT };
        let mut sibling = sibling_of(tree, parent, dir);

        if tree.is_red(Some(sibling)) {
            tree.set_color(sibling, Color::Black);
            tree.set_color(parent, Color::Red);
            tree.rotate(parent, dir);
            sibling = sibling_of(tree, parent, dir);
        }

        let near = tree.child(sibling, dir);
        let far = tree.child(sibling, 1 - dir);

        if !tree.is_red(near) && !tree.is_red(far) {
            tree.set_color(sibling, Color::Red);
            id = Some(parent);
            parent = tree.parent(parent);
            continue;
        }

        if !tree.is_red(far) {
            if let Some(near) = near { tree.set_color(near, Color::Black); }
            tree.set_color(sibling, Color::Red);
            tree.rotate(sibling, 1 - dir);
            sibling = sibling_of(tree, parent, dir);
        }

        let parent_color = tree.node(parent).color();
        tree.set_color(sibling, parent_color);
        tree.set_color(parent, Color::Black);
        if let Some(far) = tree.child(sibling, 1 - dir) { tree.set_color(far, Color::Black); }
        tree.rotate(parent, dir);
        id = tree.root();
        break;
    }

    if let Some(id) = id { tree.set_color(id, Color::Black); }
}

/// Returns the child of `parent` opposite `dir`. The removed node was black, so this side has a
/// black height of at least one and cannot be empty.
fn sibling_of<K, V>(tree: &Tree<K, V>, parent: NodeId, dir: usize) -> NodeId {
    tree.child(parent, 1 - dir).expect("black height violated: missing sibling")
}
