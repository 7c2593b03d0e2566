//! Provides a post-order visitor to allow simple AIG traversal.
//!
//! See [`PostOrder`] for details.

use crate::{Aig, NodeId};

/// A reusable "visited" scratch buffer, indexed by node id.
///
/// Whoever owns the marker owns the traversal: it must be [`reset`] (or rebuilt) before
/// a new traversal starts, and it must not be shared by two traversals at the same time.
///
/// [`reset`]: VisitMarker::reset
#[derive(Debug, Clone, Default)]
pub struct VisitMarker {
    visited: Vec<bool>,
}

impl VisitMarker {
    /// A marker able to hold `len` ids, all unvisited.
    pub fn new(len: usize) -> Self {
        VisitMarker {
            visited: vec![false; len],
        }
    }

    /// Unmark everything, resizing the buffer to `len` ids.
    pub fn reset(&mut self, len: usize) {
        self.visited.clear();
        self.visited.resize(len, false);
    }

    pub fn is_visited(&self, id: NodeId) -> bool {
        self.visited.get(id).copied().unwrap_or(false)
    }

    /// Mark `id`, returns false if it was already marked.
    pub fn visit(&mut self, id: NodeId) -> bool {
        if id >= self.visited.len() {
            self.visited.resize(id + 1, false);
        }
        !std::mem::replace(&mut self.visited[id], true)
    }
}

/// A lazy post-order visitor (fanins before the node itself) over the active nodes.
///
/// Nodes are yielded one at a time and the AIG is only borrowed during the call to [`next`],
/// so the caller may mutate the AIG between two calls. Fanins are read when a node is
/// expanded, which means a node rewired before its expansion is traversed with its new fanins.
/// Nodes deactivated while waiting on the stack are skipped.
///
/// You can:
/// - start from a node using [`from_node`]
/// - or visit all the AIG by starting from the outputs using [`from_outputs`].
///
/// In the latter case the output nodes are yielded too, each one right after its fanin cone.
///
/// [`next`]: PostOrder::next
/// [`from_node`]: PostOrder::from_node
/// [`from_outputs`]: PostOrder::from_outputs
///
/// ```rust
/// use fraig::{Aig, Literal, dfs::PostOrder};
/// let mut aig = Aig::new();
/// let a = aig.add_input();
/// let b = aig.add_input();
/// let g = aig.add_and(Literal::new(a, false), Literal::new(b, false)).unwrap();
/// let o = aig.add_output(Literal::new(g, true)).unwrap();
///
/// let mut order = PostOrder::from_outputs(&aig);
/// let mut visited = Vec::new();
/// while let Some(id) = order.next(&aig) {
///     // You can still borrow mut aig here
///     visited.push(id);
/// }
/// assert_eq!(visited, vec![a, b, g, o]);
/// ```
pub struct PostOrder {
    /// `(id, expanded)`: an expanded node has its fanins above it on the stack
    /// and is yielded when popped again.
    stack: Vec<(NodeId, bool)>,
    marker: VisitMarker,
    /// Remaining starting points, last one first.
    starts: Vec<NodeId>,
}

impl PostOrder {
    /// Traversal of the fanin cone of `start` (included).
    pub fn from_node(aig: &Aig, start: NodeId) -> Self {
        PostOrder {
            stack: vec![(start, false)],
            marker: VisitMarker::new(aig.len()),
            starts: Vec::new(),
        }
    }

    /// Traversal of the whole AIG seen from its outputs, in declaration order.
    pub fn from_outputs(aig: &Aig) -> Self {
        let mut order = PostOrder {
            stack: Vec::new(),
            marker: VisitMarker::new(aig.len()),
            starts: Vec::new(),
        };
        order.reset(aig);
        order
    }

    /// Restart a traversal from the outputs, reusing the marker buffer.
    pub fn reset(&mut self, aig: &Aig) {
        self.stack.clear();
        self.marker.reset(aig.len());
        self.starts = aig.outputs().iter().rev().copied().collect();
    }

    /// Yield the next node of the traversal, or None if it is done.
    pub fn next(&mut self, aig: &Aig) -> Option<NodeId> {
        loop {
            while let Some((id, expanded)) = self.stack.pop() {
                if !aig.is_active(id) {
                    continue;
                }
                if expanded {
                    return Some(id);
                }
                if !self.marker.visit(id) {
                    continue;
                }
                self.stack.push((id, true));
                let fanins = aig.get_node(id).map(|n| n.fanins()).unwrap_or_default();
                for fanin in fanins.into_iter().rev() {
                    if !self.marker.is_visited(fanin.node()) {
                        self.stack.push((fanin.node(), false));
                    }
                }
            }

            // Maybe we can start from a different output?
            let start = self.starts.pop()?;
            self.stack.push((start, false));
        }
    }

    /// Consume the traversal into a list of ids.
    pub fn collect(mut self, aig: &Aig) -> Vec<NodeId> {
        let mut ids = Vec::new();
        while let Some(id) = self.next(aig) {
            ids.push(id);
        }
        ids
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Literal;

    #[test]
    fn from_node_test() {
        let mut aig = Aig::new();
        let n1 = aig.add_input();
        let n2 = aig
            .add_and(Literal::FALSE, Literal::new(n1, false))
            .unwrap();

        let mut order = PostOrder::from_node(&aig, n2);
        assert_eq!(order.next(&aig), Some(0));
        assert_eq!(order.next(&aig), Some(n1));
        assert_eq!(order.next(&aig), Some(n2));
        // Now there shouldn't be anything
        assert!(order.next(&aig).is_none());
        assert!(order.next(&aig).is_none());
    }

    #[test]
    fn shared_fanin_is_yielded_before_all_its_fanouts() {
        // g = and(a, b), h = and(g, a), o = h
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let g = aig
            .add_and(Literal::new(a, false), Literal::new(b, false))
            .unwrap();
        let h = aig
            .add_and(Literal::new(a, true), Literal::new(g, false))
            .unwrap();
        let o = aig.add_output(Literal::new(h, false)).unwrap();

        let ids = PostOrder::from_outputs(&aig).collect(&aig);
        assert_eq!(ids, vec![a, b, g, h, o]);
    }

    #[test]
    fn from_outputs_test() {
        let mut aig = Aig::new();
        let n1 = aig.add_input();
        let n2 = aig
            .add_and(Literal::FALSE, Literal::new(n1, false))
            .unwrap();
        let n3 = aig.add_input();
        let n4 = aig
            .add_and(Literal::new(n2, false), Literal::new(n3, false))
            .unwrap();
        let o1 = aig.add_output(Literal::new(n2, false)).unwrap();
        let o2 = aig.add_output(Literal::new(n4, true)).unwrap();

        let ids = PostOrder::from_outputs(&aig).collect(&aig);
        assert_eq!(ids, vec![0, n1, n2, o1, n3, n4, o2]);
    }

    #[test]
    fn inactive_nodes_are_skipped() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let g = aig
            .add_and(Literal::new(a, false), Literal::new(a, false))
            .unwrap();
        let o = aig.add_output(Literal::new(g, false)).unwrap();

        let mut order = PostOrder::from_outputs(&aig);
        assert_eq!(order.next(&aig), Some(a));
        aig.deactivate(g).unwrap();
        assert_eq!(order.next(&aig), Some(o));
        assert!(order.next(&aig).is_none());

        order.reset(&aig);
        assert_eq!(order.collect(&aig), vec![o]);
    }

    #[test]
    fn marker_test() {
        let mut marker = VisitMarker::new(2);
        assert!(marker.visit(1));
        assert!(!marker.visit(1));
        assert!(marker.visit(5));
        assert!(marker.is_visited(5));
        marker.reset(3);
        assert!(!marker.is_visited(1));
        assert!(!marker.is_visited(5));
    }
}
