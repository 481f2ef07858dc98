use super::{NodeId, Tree, HEADER};

/// An in-order walk between two nodes of a tree, driven by successor and predecessor links.
///
/// `front` and `back` are the next nodes to yield from either end; `len` counts the nodes
/// between them, inclusive, and is the only thing that decides when the walk is over.
#[derive(Clone, Copy)]
struct Walk {
    front: NodeId,
    back: NodeId,
    len: usize,
}

impl Walk {
    fn new<K, V>(tree: &Tree<K, V>) -> Self {
        Walk { front: tree.first(), back: tree.last(), len: tree.len() }
    }

    fn next<K, V>(&mut self, tree: &Tree<K, V>) -> Option<NodeId> {
        if self.len == 0 { return None; }
        self.len -= 1;
        let id = self.front;
        if self.len > 0 { self.front = tree.successor(id); }
        Some(id)
    }

    fn next_back<K, V>(&mut self, tree: &Tree<K, V>) -> Option<NodeId> {
        if self.len == 0 { return None; }
        self.len -= 1;
        let id = self.back;
        if self.len > 0 { self.back = tree.predecessor(id); }
        Some(id)
    }
}

pub struct Iter<'a, K: 'a, V: 'a> {
    tree: &'a Tree<K, V>,
    walk: Walk,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub fn new(tree: &'a Tree<K, V>) -> Self { Iter { tree: tree, walk: Walk::new(tree) } }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self { Iter { tree: self.tree, walk: self.walk } }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.walk.next(tree).map(|id| tree.node(id).key_value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.walk.len, Some(self.walk.len)) }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.walk.next_back(tree).map(|id| tree.node(id).key_value())
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// Moves entries out of a tree in order.
///
/// Entries are taken out of their nodes without unlinking them, so the links stay intact for
/// navigation until the whole arena is dropped with the iterator.
pub struct IntoIter<K, V> {
    tree: Tree<K, V>,
    walk: Walk,
}

impl<K, V> IntoIter<K, V> {
    pub fn new(tree: Tree<K, V>) -> Self {
        let walk = Walk::new(&tree);
        IntoIter { tree: tree, walk: walk }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let id = self.walk.next(&self.tree)?;
        debug_assert!(id != HEADER);
        Some(self.tree.take_entry(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.walk.len, Some(self.walk.len)) }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        let id = self.walk.next_back(&self.tree)?;
        debug_assert!(id != HEADER);
        Some(self.tree.take_entry(id))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
