// Heap arena for general-array* nodes and cons cells.
//
// Nodes are addressed by `NodeId`; a child link is a handle, so two parents
// holding the same `NodeId` share the sub-array and see each other's writes.

use crate::conditions::Condition;
use crate::types::{NodeId, Value};
use smallvec::SmallVec;

/// Dimensions of an array, outermost first.
pub type Dimensions = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Rank-0 element holding one value.
    Leaf(Value),
    /// Interior array node; every child has the same shape.
    Branch(Vec<NodeId>),
    /// Interior array node of dimension 0, remembering the dimensions below it.
    Empty(Dimensions),
    Cons(Value, Value),
}

/// Statistics about Arena memory usage
#[derive(Debug, Clone, Default)]
pub struct ArenaStats {
    pub total_slots: usize,
    pub leaves: usize,
    pub branches: usize,
    pub conses: usize,
}

#[derive(Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(1024),
        }
    }

    /// Allocate a node. Fails with `StorageExhausted` instead of aborting when
    /// the backing storage cannot grow.
    pub(crate) fn alloc(&mut self, node: Node) -> Result<NodeId, Condition> {
        let idx = u32::try_from(self.nodes.len())
            .map_err(|_| Condition::StorageExhausted { requested: 1 })?;
        self.nodes
            .try_reserve(1)
            .map_err(|_| Condition::StorageExhausted { requested: 1 })?;
        self.nodes.push(node);
        Ok(NodeId(idx))
    }

    /// Reserve room for `additional` nodes up front.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<(), Condition> {
        let fits = self
            .nodes
            .len()
            .checked_add(additional)
            .is_some_and(|total| total <= u32::MAX as usize);
        if !fits {
            return Err(Condition::StorageExhausted { requested: additional });
        }
        self.nodes
            .try_reserve(additional)
            .map_err(|_| Condition::StorageExhausted { requested: additional })
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Handle of the `index`th child of an interior node.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        match self.get(id) {
            Some(Node::Branch(children)) => children.get(index).copied(),
            _ => None,
        }
    }

    /// Shape of the array rooted at `id`, following child 0 at every level.
    ///
    /// Only meaningful for rectangular trees; a jagged tree reports the shape
    /// of its first path.
    pub fn shape(&self, id: NodeId) -> Dimensions {
        debug_assert!(self.is_rectangular(id), "jagged general-array*");
        self.first_path(id)
    }

    /// True if every sibling subtree below `id` has the same shape.
    ///
    /// Checks each reachable node against the shape of the first path, one
    /// level at a time, so deep ranks need no recursion.
    pub fn is_rectangular(&self, id: NodeId) -> bool {
        let dims = self.first_path(id);
        let mut pending = vec![(id, 0usize)];
        while let Some((node, level)) = pending.pop() {
            match self.get(node) {
                Some(Node::Branch(children)) => {
                    if dims.get(level) != Some(&children.len()) {
                        return false;
                    }
                    pending.extend(children.iter().map(|&child| (child, level + 1)));
                }
                Some(Node::Empty(rest)) => {
                    if dims.get(level) != Some(&0) || dims[level + 1..] != rest[..] {
                        return false;
                    }
                }
                Some(Node::Leaf(_)) => {
                    if level != dims.len() {
                        return false;
                    }
                }
                Some(Node::Cons(..)) | None => return false,
            }
        }
        true
    }

    fn first_path(&self, id: NodeId) -> Dimensions {
        let mut dims = Dimensions::new();
        let mut current = id;
        while let Some(node) = self.get(current) {
            match node {
                Node::Branch(children) => {
                    dims.push(children.len());
                    match children.first() {
                        Some(&first) => current = first,
                        None => break,
                    }
                }
                Node::Empty(rest) => {
                    dims.push(0);
                    dims.extend_from_slice(rest);
                    break;
                }
                _ => break,
            }
        }
        dims
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get memory statistics
    pub fn stats(&self) -> ArenaStats {
        let mut stats = ArenaStats {
            total_slots: self.nodes.len(),
            ..ArenaStats::default()
        };
        for node in &self.nodes {
            match node {
                Node::Leaf(_) => stats.leaves += 1,
                Node::Branch(_) | Node::Empty(_) => stats.branches += 1,
                Node::Cons(..) => stats.conses += 1,
            }
        }
        stats
    }
}
