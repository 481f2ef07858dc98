use std::error::Error;
use std::fmt;

/// A broken structural invariant, reported by [`Map::validate`](struct.Map.html#method.validate).
///
/// Nodes are identified by their arena slot, which is only meaningful for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Violation {
    /// The header is malformed: wrong color, carries an entry, or caches the wrong extrema.
    Header,
    /// A node's key is out of order with respect to an ancestor.
    Order { node: usize },
    /// A node's parent link does not point back at the node that owns it.
    Parent { node: usize },
    /// The root is red.
    RedRoot,
    /// A red node has a red child.
    RedRed { node: usize },
    /// The two subtrees of a node have different black heights.
    BlackHeight { node: usize, left: usize, right: usize },
    /// The recorded length disagrees with the number of nodes reachable from the root.
    Len { counted: usize, len: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Violation::Header => write!(f, "malformed header node"),
            Violation::Order { node } => write!(f, "key of node {} is out of order", node),
            Violation::Parent { node } => write!(f, "node {} has a stale parent link", node),
            Violation::RedRoot => write!(f, "root is red"),
            Violation::RedRed { node } => write!(f, "red node {} has a red parent", node),
            Violation::BlackHeight { node, left, right } =>
                write!(f, "node {} has black heights {} (left) and {} (right)", node, left, right),
            Violation::Len { counted, len } =>
                write!(f, "found {} nodes but the length is {}", counted, len),
        }
    }
}

impl Error for Violation {}
