//! The arena-backed red-black tree underlying `Map`.
//!
//! Every node lives in a `Slab` and is addressed by its slot. Slot `HEADER` always holds the
//! header: its left link caches the minimum, its right link caches the maximum and its parent
//! link is the root. The root's parent is the header, which makes traversal circular: the
//! successor of the maximum and the predecessor of the minimum are both the header.

mod iter;

#[cfg(test)]
mod test;

use compare::Compare;
use slab::Slab;
use std::cmp::Ordering::*;
use super::balance;
use super::error::Violation;

pub use self::iter::{IntoIter, Iter};

/// The slot of a node in the tree's arena.
pub type NodeId = usize;

/// The slot of the header node.
pub const HEADER: NodeId = 0;

pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
    /// The header's color, distinct from both tree colors so that a rotation touching the root
    /// can never mistake the header for a red or black parent.
    Header,
}

pub struct Node<K, V> {
    child: [Option<NodeId>; 2],
    parent: Option<NodeId>,
    color: Color,
    entry: Option<(K, V)>,
}

impl<K, V> Node<K, V> {
    fn header() -> Self {
        Node {
            child: [Some(HEADER), Some(HEADER)],
            parent: None,
            color: Color::Header,
            entry: None,
        }
    }

    fn new(parent: NodeId, color: Color, key: K, value: V) -> Self {
        Node { child: [None, None], parent: Some(parent), color: color, entry: Some((key, value)) }
    }

    pub fn color(&self) -> Color { self.color }

    pub fn is_header(&self) -> bool { self.color == Color::Header }

    /// Returns the node's key and value.
    ///
    /// Panics if the node is the header, or if its entry has already been moved out.
    pub fn key_value(&self) -> (&K, &V) {
        match self.entry {
            Some((ref key, ref value)) => (key, value),
            None => panic!("attempted to dereference the past-the-end position"),
        }
    }

    pub fn key_value_mut(&mut self) -> (&K, &mut V) {
        match self.entry {
            Some((ref key, ref mut value)) => (key, value),
            None => panic!("attempted to dereference the past-the-end position"),
        }
    }

    pub fn key(&self) -> &K { self.key_value().0 }
}

/// A position in a map.
///
/// A cursor is bound to an entry, bound to the map's past-the-end position, or nil. It is a plain
/// copyable handle that does not borrow the map. The map's methods that accept a cursor panic
/// when given a nil cursor. A cursor to an erased entry must not be used again: it panics until
/// its slot is reused by a later insertion, and refers to the new entry afterwards.
///
/// Cursors compare equal when they refer to the same position. The comparison does not know
/// which map a cursor came from, so cursors obtained from different maps must not be compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cursor(Option<NodeId>);

impl Cursor {
    /// Returns a cursor that is bound to no position.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::Cursor;
    ///
    /// let cursor = Cursor::nil();
    /// assert!(cursor.is_nil());
    /// assert_eq!(cursor, Cursor::default());
    /// ```
    pub fn nil() -> Self { Cursor(None) }

    /// Checks if the cursor is bound to no position.
    pub fn is_nil(&self) -> bool { self.0.is_none() }

    pub(crate) fn at(node: NodeId) -> Self { Cursor(Some(node)) }

    pub(crate) fn node(self) -> Option<NodeId> { self.0 }

    pub(crate) fn expect_node(self) -> NodeId {
        self.0.expect("attempted to use a nil cursor")
    }
}

/// Where a key belongs: either at an existing node holding an equivalent key, or in the empty
/// child slot `dir` of `parent`. An empty tree reports the header as the parent.
pub type Slot = Result<NodeId, (NodeId, usize)>;

pub struct Tree<K, V> {
    nodes: Slab<Node<K, V>>,
}

impl<K, V> Tree<K, V> {
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let header = nodes.insert(Node::header());
        debug_assert_eq!(header, HEADER);
        Tree { nodes: nodes }
    }

    pub fn len(&self) -> usize { self.nodes.len() - 1 }

    pub fn is_empty(&self) -> bool { self.root().is_none() }

    pub fn root(&self) -> Option<NodeId> { self.nodes[HEADER].parent }

    /// Returns the minimum node, or the header if the tree is empty.
    pub fn first(&self) -> NodeId { self.extremum(LEFT) }

    /// Returns the maximum node, or the header if the tree is empty.
    pub fn last(&self) -> NodeId { self.extremum(RIGHT) }

    pub fn node(&self, id: NodeId) -> &Node<K, V> { &self.nodes[id] }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> { &mut self.nodes[id] }

    pub fn child(&self, id: NodeId, dir: usize) -> Option<NodeId> {
        debug_assert!(id != HEADER);
        self.nodes[id].child[dir]
    }

    pub fn is_red(&self, id: Option<NodeId>) -> bool {
        id.map_or(false, |id| self.nodes[id].color == Color::Red)
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) {
        debug_assert!(id != HEADER && color != Color::Header);
        self.nodes[id].color = color;
    }

    /// Returns the parent of a non-header node, which is the header for the root.
    pub fn parent(&self, id: NodeId) -> NodeId {
        debug_assert!(id != HEADER);
        self.nodes[id].parent.unwrap_or(HEADER)
    }

    /// Returns the header's cached minimum (`LEFT`) or maximum (`RIGHT`).
    fn extremum(&self, dir: usize) -> NodeId {
        self.nodes[HEADER].child[dir].unwrap_or(HEADER)
    }

    /// Returns which child of its parent `id` is.
    pub fn side(&self, id: NodeId) -> usize {
        let parent = self.parent(id);
        if parent != HEADER && self.nodes[parent].child[LEFT] == Some(id) { LEFT } else { RIGHT }
    }

    pub fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.child(id, LEFT) { id = left; }
        id
    }

    /// Walks one step in direction `dir` in key order: `RIGHT` for the successor and `LEFT` for
    /// the predecessor. Stepping from the header wraps around: the successor of the header is
    /// the minimum and its predecessor is the maximum.
    fn step(&self, mut id: NodeId, dir: usize) -> NodeId {
        if id == HEADER { return self.extremum(1 - dir); }

        if let Some(child) = self.child(id, dir) {
            id = child;
            while let Some(next) = self.child(id, 1 - dir) { id = next; }
            return id;
        }

        let mut parent = self.parent(id);
        while parent != HEADER && self.nodes[parent].child[dir] == Some(id) {
            id = parent;
            parent = self.parent(id);
        }
        parent
    }

    pub fn successor(&self, id: NodeId) -> NodeId { self.step(id, RIGHT) }

    pub fn predecessor(&self, id: NodeId) -> NodeId { self.step(id, LEFT) }

    /// Returns the first node whose key is not less than `key`, or the header.
    pub fn lower_bound<C, Q: ?Sized>(&self, cmp: &C, key: &Q) -> NodeId
        where C: Compare<Q, K> {

        let mut link = self.root();
        let mut candidate = HEADER;

        while let Some(id) = link {
            let node = &self.nodes[id];
            match cmp.compare(key, node.key()) {
                Equal => return id,
                Greater => link = node.child[RIGHT],
                Less => {
                    candidate = id;
                    link = node.child[LEFT];
                }
            }
        }

        candidate
    }

    /// Returns the node whose key is equivalent to `key`, or the header.
    pub fn find<C, Q: ?Sized>(&self, cmp: &C, key: &Q) -> NodeId where C: Compare<Q, K> {
        let id = self.lower_bound(cmp, key);
        if id != HEADER && cmp.compares_eq(key, self.nodes[id].key()) { id } else { HEADER }
    }

    /// Descends from the root to the position of `key`.
    pub fn search<C, Q: ?Sized>(&self, cmp: &C, key: &Q) -> Slot where C: Compare<Q, K> {
        let mut id = match self.root() {
            None => return Err((HEADER, LEFT)),
            Some(root) => root,
        };

        loop {
            let node = &self.nodes[id];
            let dir = match cmp.compare(key, node.key()) {
                Equal => return Ok(id),
                Less => LEFT,
                Greater => RIGHT,
            };

            match node.child[dir] {
                None => return Err((id, dir)),
                Some(child) => id = child,
            }
        }
    }

    /// Locates `key` using `hint`, which claims to be the first node whose key is not less than
    /// `key` (or the header). Returns `None` when the claim turns out to be false.
    ///
    /// At most two comparisons are made: one against the hint and one against its predecessor.
    pub fn search_hinted<C>(&self, cmp: &C, hint: NodeId, key: &K) -> Option<Slot>
        where C: Compare<K> {

        if hint != HEADER {
            match cmp.compare(key, self.nodes[hint].key()) {
                Equal => return Some(Ok(hint)),
                Greater => return None,
                Less => {}
            }
        }

        if self.is_empty() { return Some(Err((HEADER, LEFT))); }
        if hint == self.first() { return Some(Err((hint, LEFT))); }

        let prev = self.predecessor(hint);
        match cmp.compare(key, self.nodes[prev].key()) {
            Equal => Some(Ok(prev)),
            Less => None,
            // `prev` and `hint` are adjacent, so exactly one of these slots is free.
            Greater => Some(Err(if self.child(prev, RIGHT).is_none() {
                (prev, RIGHT)
            } else {
                (hint, LEFT)
            })),
        }
    }

    /// Links a new node into the empty slot `dir` of `parent` and rebalances.
    pub fn attach(&mut self, parent: NodeId, dir: usize, key: K, value: V) -> NodeId {
        if parent == HEADER {
            debug_assert!(self.is_empty());
            let id = self.nodes.insert(Node::new(HEADER, Color::Black, key, value));
            let header = &mut self.nodes[HEADER];
            header.parent = Some(id);
            header.child = [Some(id), Some(id)];
            return id;
        }

        debug_assert!(self.child(parent, dir).is_none());
        let id = self.nodes.insert(Node::new(parent, Color::Red, key, value));
        self.nodes[parent].child[dir] = Some(id);

        // A new extremum can only hang off the old one.
        if self.extremum(dir) == parent { self.nodes[HEADER].child[dir] = Some(id); }

        balance::rebalance_insert(self, id);
        id
    }

    /// Unlinks `id`, rebalances and returns its entry.
    pub fn detach(&mut self, id: NodeId) -> (K, V) {
        assert!(id != HEADER, "attempted to erase the past-the-end position");

        if self.first() == id {
            let next = self.successor(id);
            self.nodes[HEADER].child[LEFT] = Some(next);
        }
        if self.last() == id {
            let prev = self.predecessor(id);
            self.nodes[HEADER].child[RIGHT] = Some(prev);
        }

        let left = self.child(id, LEFT);
        let right = self.child(id, RIGHT);

        let (replacement, parent, removed) = match (left, right) {
            (None, _) | (_, None) => {
                let replacement = left.or(right);
                let parent = self.parent(id);
                self.transplant(id, replacement);
                (replacement, parent, self.nodes[id].color)
            }
            (Some(left), Some(right)) => {
                let next = self.minimum(right);
                let removed = self.nodes[next].color;
                let replacement = self.child(next, RIGHT);

                let parent = if self.parent(next) == id {
                    next
                } else {
                    let parent = self.parent(next);
                    self.transplant(next, replacement);
                    self.nodes[next].child[RIGHT] = Some(right);
                    self.nodes[right].parent = Some(next);
                    parent
                };

                self.transplant(id, Some(next));
                self.nodes[next].child[LEFT] = Some(left);
                self.nodes[left].parent = Some(next);
                self.nodes[next].color = self.nodes[id].color;
                (replacement, parent, removed)
            }
        };

        if removed == Color::Black { balance::rebalance_remove(self, replacement, parent); }

        let node = self.nodes.remove(id);
        node.entry.expect("inner node without an entry")
    }

    /// Replaces the subtree rooted at `old` with the one rooted at `new` in `old`'s parent.
    /// `new`'s own children are left untouched.
    pub fn transplant(&mut self, old: NodeId, new: Option<NodeId>) {
        let parent = self.parent(old);

        if parent == HEADER {
            self.nodes[HEADER].parent = new;
        } else {
            let dir = self.side(old);
            self.nodes[parent].child[dir] = new;
        }

        if let Some(new) = new { self.nodes[new].parent = Some(parent); }
    }

    /// Rotates the subtree rooted at `id` so that `id` moves down to side `dir`, and its child
    /// on the opposite side takes its place.
    pub fn rotate(&mut self, id: NodeId, dir: usize) {
        let up = self.child(id, 1 - dir).expect("rotation without a pivot");
        let inner = self.child(up, dir);

        self.nodes[id].child[1 - dir] = inner;
        if let Some(inner) = inner { self.nodes[inner].parent = Some(id); }

        self.transplant(id, Some(up));
        self.nodes[up].child[dir] = Some(id);
        self.nodes[id].parent = Some(up);
    }

    /// Takes the entry out of `id`, leaving its links in place. Only used while the tree is
    /// being consumed.
    fn take_entry(&mut self, id: NodeId) -> (K, V) {
        self.nodes[id].entry.take().expect("entry taken twice")
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        let header = self.nodes.insert(Node::header());
        debug_assert_eq!(header, HEADER);
    }

    /// Returns the nodes in key order.
    pub fn ordered_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.len());
        let mut id = self.first();
        while id != HEADER {
            ids.push(id);
            id = self.successor(id);
        }
        ids
    }

    /// Returns mutable references to every entry, in key order.
    pub fn ordered_entries_mut(&mut self) -> Vec<(&K, &mut V)> {
        let ids = self.ordered_ids();
        let mut rank = vec![0; self.nodes.capacity()];
        for (i, &id) in ids.iter().enumerate() { rank[id] = i; }

        let mut slots: Vec<Option<(&K, &mut V)>> = ids.iter().map(|_| None).collect();
        for (id, node) in self.nodes.iter_mut() {
            if let Some((ref key, ref mut value)) = node.entry { slots[rank[id]] = Some((key, value)); }
        }

        slots.into_iter().flatten().collect()
    }

    /// Checks every structural invariant, walking the links directly rather than going through
    /// the navigation routines.
    pub fn validate<C>(&self, cmp: &C) -> Result<(), Violation> where C: Compare<K> {
        let header = &self.nodes[HEADER];
        if header.color != Color::Header || header.entry.is_some() {
            return Err(Violation::Header);
        }

        let root = match header.parent {
            None => {
                return if header.child != [Some(HEADER), Some(HEADER)] {
                    Err(Violation::Header)
                } else if self.len() != 0 {
                    Err(Violation::Len { counted: 0, len: self.len() })
                } else {
                    Ok(())
                };
            }
            Some(root) => root,
        };

        if self.nodes[root].parent != Some(HEADER) { return Err(Violation::Parent { node: root }); }
        if self.nodes[root].color == Color::Red { return Err(Violation::RedRoot); }

        let (counted, _) = self.validate_subtree(cmp, root, None, None)?;
        if counted != self.len() { return Err(Violation::Len { counted: counted, len: self.len() }); }

        let mut min = root;
        while let Some(left) = self.nodes[min].child[LEFT] { min = left; }
        let mut max = root;
        while let Some(right) = self.nodes[max].child[RIGHT] { max = right; }
        if header.child != [Some(min), Some(max)] { return Err(Violation::Header); }

        Ok(())
    }

    /// Returns the number of nodes in the subtree and its black height.
    fn validate_subtree<C>(&self, cmp: &C, id: NodeId, lo: Option<&K>, hi: Option<&K>)
        -> Result<(usize, usize), Violation> where C: Compare<K> {

        let node = match self.nodes.get(id) {
            Some(node) if !node.is_header() && node.entry.is_some() => node,
            _ => return Err(Violation::Header),
        };
        let key = node.key();

        if lo.map_or(false, |lo| !cmp.compares_lt(lo, key)) ||
           hi.map_or(false, |hi| !cmp.compares_lt(key, hi)) {
            return Err(Violation::Order { node: id });
        }

        let mut heights = [0; 2];
        let mut count = 1;

        for dir in [LEFT, RIGHT] {
            if let Some(child) = node.child[dir] {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(id) {
                    return Err(Violation::Parent { node: child });
                }
                if node.color == Color::Red && self.is_red(Some(child)) {
                    return Err(Violation::RedRed { node: child });
                }

                let (lo, hi) = if dir == LEFT { (lo, Some(key)) } else { (Some(key), hi) };
                let (n, height) = self.validate_subtree(cmp, child, lo, hi)?;
                count += n;
                heights[dir] = height;
            }
        }

        if heights[LEFT] != heights[RIGHT] {
            return Err(Violation::BlackHeight { node: id, left: heights[LEFT], right: heights[RIGHT] });
        }

        Ok((count, heights[LEFT] + if node.color == Color::Black { 1 } else { 0 }))
    }
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self { Tree::new() }
}
