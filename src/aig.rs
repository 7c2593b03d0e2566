//! Module defining the [`Aig`] struct, as well as [`AigNode`], [`Literal`] and some others relevant structs.
//!
//! The graph is an arena: every node lives in a dense vector and is addressed by its [`NodeId`].
//! Edges are [`Literal`]s (`2 * id + complement`), and each node keeps the list of its fanouts
//! so that merging two nodes only touches the nodes around them.
//!
//! To start simplifying a circuit, check [`crate::strash`], [`crate::sim`] and [`crate::fraig`].

pub mod dfs;
pub mod error;
mod integrity;
pub mod literal;
pub mod node;
mod parser;
mod rewrite;

pub use error::{AigError, ParserError, Result};
pub use literal::{FaninId, Literal};
pub use node::{AigNode, FecMembership, Node, NodeId};

/// A whole combinational AIG.
///
/// Node 0 is always the constant [`AigNode::False`]. Inputs and AND gates may be created with
/// explicit ids (as read from an AIGER file) or with the next free id. Outputs are nodes too
/// ([`AigNode::Output`]), they get the next free id when declared.
///
/// Nodes are never removed from the arena: merging and sweeping only deactivate them,
/// so ids are stable for the whole lifetime of the AIG.
///
/// ```rust
/// use fraig::{Aig, Literal};
/// let mut aig = Aig::new();
/// let a = aig.add_input();
/// let b = aig.add_input();
/// let g = aig
///     .add_and(Literal::new(a, false), Literal::new(b, true))
///     .unwrap();
/// let o = aig.add_output(Literal::new(g, false)).unwrap();
/// assert_eq!(aig.fanins(g).unwrap(), vec![Literal::new(a, false), Literal::new(b, true)]);
/// assert_eq!(aig.fanouts(b).unwrap(), &[Literal::new(g, true)]);
/// assert_eq!(aig.fanouts(g).unwrap(), &[Literal::new(o, false)]);
/// ```
#[derive(Debug, Clone)]
pub struct Aig {
    /// Slots may be empty when ids are reserved but never defined (sparse AIGER files).
    nodes: Vec<Option<Node>>,
    /// Primary inputs, in declaration order.
    inputs: Vec<NodeId>,
    /// Primary outputs (ids of the [`AigNode::Output`] nodes), in declaration order.
    outputs: Vec<NodeId>,
}

impl Default for Aig {
    fn default() -> Self {
        Aig::new()
    }
}

impl Aig {
    /// Create a brand new AIG (constant node [`AigNode::False`] included).
    pub fn new() -> Self {
        Aig {
            nodes: vec![Some(Node::new(AigNode::False))],
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Reserve the ids `0..=max_index`, so that the next allocated id is at least `max_index + 1`.
    pub fn reserve(&mut self, max_index: NodeId) {
        if self.nodes.len() <= max_index {
            self.nodes.resize(max_index + 1, None);
        }
    }

    /// Number of id slots, ie the largest id plus one.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false, node 0 exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Retrieves a node from its id.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)?.as_ref()
    }

    /// Retrieves a node from its id, failing if it does not exist.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get_node(id).ok_or(AigError::NodeDoesNotExist(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(AigError::NodeDoesNotExist(id))
    }

    /// Ids of all defined nodes, active or not.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|_| id))
    }

    /// Retrieves the primary inputs, in declaration order.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Retrieves the primary output nodes, in declaration order.
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Literal driving the `index`-th output.
    pub fn output_fanin(&self, index: usize) -> Option<Literal> {
        let id = *self.outputs.get(index)?;
        match self.get_node(id)?.kind {
            AigNode::Output { fanin } => Some(fanin),
            _ => None,
        }
    }

    /// Ordered fanins of a node.
    pub fn fanins(&self, id: NodeId) -> Result<Vec<Literal>> {
        Ok(self.node(id)?.fanins())
    }

    /// Unordered fanouts of a node.
    pub fn fanouts(&self, id: NodeId) -> Result<&[Literal]> {
        Ok(self.node(id)?.fanouts())
    }

    /// False for inactive and undefined nodes.
    pub fn is_active(&self, id: NodeId) -> bool {
        self.get_node(id).is_some_and(|n| n.active)
    }

    pub fn is_and(&self, id: NodeId) -> bool {
        self.get_node(id).is_some_and(Node::is_and)
    }

    /// Mark a node as removed. Fanin/fanout links are not touched, use [`Aig::replace`]
    /// or [`Aig::sweep`] to keep the AIG consistent.
    pub fn deactivate(&mut self, id: NodeId) -> Result<()> {
        if id == 0 {
            return Err(AigError::InvalidState(
                "the constant node cannot be deactivated".to_string(),
            ));
        }
        self.node_mut(id)?.active = false;
        Ok(())
    }

    /// Ids of the AND gates still active, in increasing order.
    pub fn active_ands(&self) -> Vec<NodeId> {
        self.ids()
            .filter(|&id| self.is_and(id) && self.is_active(id))
            .collect()
    }

    pub fn num_active_ands(&self) -> usize {
        self.active_ands().len()
    }

    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.label = Some(label.into());
        Ok(())
    }

    pub(crate) fn set_signature(&mut self, id: NodeId, signature: u32) -> Result<()> {
        self.node_mut(id)?.signature = signature;
        Ok(())
    }

    pub(crate) fn set_fec(&mut self, id: NodeId, fec: Option<FecMembership>) -> Result<()> {
        self.node_mut(id)?.fec = fec;
        Ok(())
    }

    /// Claims a slot for a new node, growing the arena if needed.
    fn claim(&mut self, id: NodeId, node: Node) -> Result<NodeId> {
        if id == 0 {
            return Err(AigError::IdZeroButNotFalse);
        }
        self.reserve(id);
        if self.nodes[id].is_some() {
            return Err(AigError::DuplicateId(id));
        }
        self.nodes[id] = Some(node);
        Ok(id)
    }

    /// Checks the driver of an edge exists and registers `consumer` as one of its fanouts.
    fn connect(&mut self, fanin: Literal, consumer: NodeId) -> Result<()> {
        let driver = self.node_mut(fanin.node())?;
        driver
            .fanouts
            .push(Literal::new(consumer, fanin.is_complement()));
        Ok(())
    }

    fn check_fanin(&self, fanin: Literal) -> Result<()> {
        let driver = self.node(fanin.node())?;
        if driver.is_output() {
            return Err(AigError::InvalidState(format!(
                "output {} cannot be used as a fanin",
                fanin.node()
            )));
        }
        Ok(())
    }

    /// Create a new input with the next free id.
    pub fn add_input(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(Node::new(AigNode::Input)));
        self.inputs.push(id);
        id
    }

    /// Create a new input with the given id.
    /// This will fail if a node with the same id already exists in the AIG, or if `id` is 0.
    pub fn add_input_with_id(&mut self, id: NodeId) -> Result<NodeId> {
        self.claim(id, Node::new(AigNode::Input))?;
        self.inputs.push(id);
        Ok(id)
    }

    /// Create a new AND gate with the next free id.
    /// Both fanins must refer to existing nodes.
    pub fn add_and(&mut self, fanin0: Literal, fanin1: Literal) -> Result<NodeId> {
        let id = self.nodes.len();
        self.add_and_with_id(id, fanin0, fanin1)
    }

    /// Create a new AND gate with the given id.
    ///
    /// ```rust
    /// use fraig::{Aig, Literal};
    /// let mut aig = Aig::new();
    /// aig.add_input_with_id(1).unwrap();
    /// aig.add_input_with_id(2).unwrap();
    /// let i1 = Literal::new(1, false);
    /// let i2 = Literal::new(2, false);
    /// aig.add_and_with_id(5, i1, !i2).unwrap();
    ///
    /// // Some stuff we cannot do
    /// // Node with id 0
    /// assert!(aig.add_and_with_id(0, i1, i2).is_err());
    /// // Id 1 is already taken by an input
    /// assert!(aig.add_and_with_id(1, i1, i2).is_err());
    /// // Node 4 does not exist
    /// assert!(aig.add_and_with_id(6, Literal::new(4, false), i2).is_err());
    /// ```
    pub fn add_and_with_id(
        &mut self,
        id: NodeId,
        fanin0: Literal,
        fanin1: Literal,
    ) -> Result<NodeId> {
        self.check_fanin(fanin0)?;
        self.check_fanin(fanin1)?;
        self.claim(id, Node::new(AigNode::And { fanin0, fanin1 }))?;
        self.connect(fanin0, id)?;
        self.connect(fanin1, id)?;
        Ok(id)
    }

    /// Declare a new primary output driven by `fanin`. The output node gets the next free id.
    pub fn add_output(&mut self, fanin: Literal) -> Result<NodeId> {
        self.check_fanin(fanin)?;
        let id = self.nodes.len();
        self.nodes.push(Some(Node::new(AigNode::Output { fanin })));
        self.connect(fanin, id)?;
        self.outputs.push(id);
        Ok(id)
    }

    /// Returns a topological sort (fanins first) of the active nodes reachable from the outputs,
    /// will error if a cycle is detected.
    pub fn get_topological_sort(&self) -> Result<Vec<NodeId>> {
        let mut sort = Vec::new();
        // 0: unseen, 1: on the current path, 2: done
        let mut state = vec![0u8; self.len()];

        for &output in &self.outputs {
            let mut stack: Vec<(NodeId, bool)> = vec![(output, false)];
            while let Some((id, last_time)) = stack.pop() {
                // Post order check
                if last_time {
                    state[id] = 2;
                    sort.push(id);
                    continue;
                }

                match state[id] {
                    2 => continue,
                    1 => return Err(AigError::InvalidState("found a cycle".to_string())),
                    _ => (),
                }

                state[id] = 1;
                stack.push((id, true));
                for fanin in self.node(id)?.fanins() {
                    let child = fanin.node();
                    if !self.is_active(child) {
                        return Err(AigError::InvalidState(format!(
                            "active node {} has inactive fanin {}",
                            id, child
                        )));
                    }
                    match state[child] {
                        2 => (),
                        1 => return Err(AigError::InvalidState("found a cycle".to_string())),
                        _ => stack.push((child, false)),
                    }
                }
            }
        }

        Ok(sort)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_node_test() {
        let mut aig = Aig::new();

        // Adding legit nodes
        let i1 = aig.add_input_with_id(1).unwrap();
        let a2 = aig
            .add_and_with_id(2, Literal::FALSE, Literal::new(i1, false))
            .unwrap();
        assert_eq!(a2, 2);
        assert!(aig.node(0).unwrap().is_false());
        assert!(aig.node(1).unwrap().is_input());
        assert!(aig.node(2).unwrap().is_and());

        // Now, trying to add some illegal nodes
        assert!(matches!(
            aig.add_input_with_id(2),
            Err(AigError::DuplicateId(2))
        ));
        assert!(matches!(
            aig.add_and_with_id(1, Literal::FALSE, Literal::FALSE),
            Err(AigError::DuplicateId(1))
        ));
        assert!(matches!(
            aig.add_input_with_id(0),
            Err(AigError::IdZeroButNotFalse)
        ));
    }

    #[test]
    fn add_node_test_invalid_dependency() {
        let mut aig = Aig::new();
        assert!(matches!(
            aig.add_and(Literal::new(3, false), Literal::FALSE),
            Err(AigError::NodeDoesNotExist(3))
        ));
        assert!(aig.add_output(Literal::new(7, true)).is_err());
        // Nothing was registered
        assert!(aig.fanouts(0).unwrap().is_empty());
        assert!(aig.outputs().is_empty());
    }

    #[test]
    fn output_as_fanin_is_rejected() {
        let mut aig = Aig::new();
        let i = aig.add_input();
        let o = aig.add_output(Literal::new(i, false)).unwrap();
        assert!(aig.add_and(Literal::new(o, false), Literal::new(i, false)).is_err());
    }

    #[test]
    fn fanouts_are_registered() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let g = aig
            .add_and(Literal::new(a, true), Literal::new(a, false))
            .unwrap();
        let h = aig
            .add_and(Literal::new(g, false), Literal::new(b, true))
            .unwrap();
        let o = aig.add_output(Literal::new(h, true)).unwrap();

        assert_eq!(
            aig.fanouts(a).unwrap(),
            &[Literal::new(g, true), Literal::new(g, false)]
        );
        assert_eq!(aig.fanouts(b).unwrap(), &[Literal::new(h, true)]);
        assert_eq!(aig.fanouts(h).unwrap(), &[Literal::new(o, true)]);
        assert_eq!(aig.output_fanin(0), Some(Literal::new(h, true)));
        assert_eq!(aig.output_fanin(1), None);
        assert_eq!(aig.inputs(), &[a, b]);
        assert_eq!(aig.outputs(), &[o]);
        assert_eq!(aig.active_ands(), vec![g, h]);
    }

    #[test]
    fn reserved_ids() {
        let mut aig = Aig::new();
        aig.reserve(4);
        assert_eq!(aig.len(), 5);
        assert!(aig.get_node(3).is_none());
        assert!(!aig.is_active(3));
        let i = aig.add_input();
        assert_eq!(i, 5);
        assert_eq!(aig.ids().collect::<Vec<_>>(), vec![0, 5]);
    }

    #[test]
    fn deactivate_test() {
        let mut aig = Aig::new();
        let i = aig.add_input();
        assert!(aig.is_active(i));
        aig.deactivate(i).unwrap();
        assert!(!aig.is_active(i));
        assert!(aig.deactivate(0).is_err());
        assert!(aig.is_active(0));
        assert!(aig.deactivate(42).is_err());
    }

    #[test]
    fn topological_sort_test() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let g = aig
            .add_and(Literal::new(a, false), Literal::new(b, false))
            .unwrap();
        let h = aig
            .add_and(Literal::new(g, true), Literal::new(a, false))
            .unwrap();
        let o = aig.add_output(Literal::new(h, false)).unwrap();

        let sort = aig.get_topological_sort().unwrap();
        let pos = |id: NodeId| sort.iter().position(|&x| x == id).unwrap();
        assert!(pos(a) < pos(g));
        assert!(pos(b) < pos(g));
        assert!(pos(g) < pos(h));
        assert!(pos(h) < pos(o));
        assert_eq!(sort.len(), 5);
    }

    #[test]
    fn topological_sort_detects_cycle() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let g = aig
            .add_and(Literal::new(a, false), Literal::new(a, true))
            .unwrap();
        let h = aig
            .add_and(Literal::new(g, false), Literal::new(a, false))
            .unwrap();
        aig.add_output(Literal::new(h, false)).unwrap();
        // Creating the cycle g -> h -> g behind the back of the AIG
        *aig.node_mut(g)
            .unwrap()
            .fanin_mut(FaninId::Fanin1)
            .unwrap() = Literal::new(h, false);
        assert!(aig.get_topological_sort().is_err());
    }
}
