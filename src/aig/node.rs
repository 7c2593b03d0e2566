use super::{FaninId, Literal};

/// A node id.
///
/// Ids are dense indices into the arena of the owning [`Aig`].
/// The constant node [`AigNode::False`] has id 0 by convention.
///
/// [`Aig`]: super::Aig
pub type NodeId = usize;

/// The kind of an AIG node, together with its fanins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AigNode {
    /// The constant low/false signal.
    False,
    /// A primary input.
    Input,
    /// An AND gate with two fanins.
    And { fanin0: Literal, fanin1: Literal },
    /// A primary output, driven by a single fanin.
    Output { fanin: Literal },
}

/// Membership of a node in an equivalence class of the [`FecManager`].
///
/// [`FecManager`]: crate::fec::FecManager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FecMembership {
    /// Index of the class in [`FecManager::classes`].
    ///
    /// [`FecManager::classes`]: crate::fec::FecManager::classes
    pub class: usize,
    /// Set if the node is equivalent to the complement of the class pivot.
    pub inverted: bool,
}

/// An AIG node stored in the arena.
///
/// Internal note: nodes carry their fanouts with them. Each fanout is a literal
/// `2 * consumer + complement` where `complement` is the polarity of the consumer's edge
/// pointing to this node. Make sure to update this correctly.
#[derive(Debug, Clone)]
pub struct Node {
    pub(super) kind: AigNode,
    pub(super) fanouts: Vec<Literal>,
    pub(super) active: bool,
    pub(super) label: Option<String>,
    pub(super) signature: u32,
    pub(super) fec: Option<FecMembership>,
}

impl Node {
    pub(super) fn new(kind: AigNode) -> Self {
        Node {
            kind,
            fanouts: Vec::new(),
            active: true,
            label: None,
            signature: 0,
            fec: None,
        }
    }

    pub fn kind(&self) -> &AigNode {
        &self.kind
    }

    pub fn is_false(&self) -> bool {
        matches!(self.kind, AigNode::False)
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, AigNode::Input)
    }

    pub fn is_and(&self) -> bool {
        matches!(self.kind, AigNode::And { .. })
    }

    pub fn is_output(&self) -> bool {
        matches!(self.kind, AigNode::Output { .. })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ordered fanins: two for an AND gate, one for an output, none otherwise.
    pub fn fanins(&self) -> Vec<Literal> {
        match self.kind {
            AigNode::False | AigNode::Input => vec![],
            AigNode::And { fanin0, fanin1 } => vec![fanin0, fanin1],
            AigNode::Output { fanin } => vec![fanin],
        }
    }

    /// Unordered fanouts (see the internal note on [`Node`]).
    pub fn fanouts(&self) -> &[Literal] {
        &self.fanouts
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Signature computed by the last simulated batch.
    pub fn signature(&self) -> u32 {
        self.signature
    }

    pub fn fec(&self) -> Option<FecMembership> {
        self.fec
    }

    /// Mutable access to one of the fanins, `None` if the node has no such fanin.
    /// Outputs only have [`FaninId::Fanin0`].
    pub(super) fn fanin_mut(&mut self, fanin_id: FaninId) -> Option<&mut Literal> {
        match (&mut self.kind, fanin_id) {
            (AigNode::And { fanin0, .. }, FaninId::Fanin0) => Some(fanin0),
            (AigNode::And { fanin1, .. }, FaninId::Fanin1) => Some(fanin1),
            (AigNode::Output { fanin }, FaninId::Fanin0) => Some(fanin),
            _ => None,
        }
    }

    /// Removes every fanout entry pointing at `consumer`, returns how many were removed.
    pub(super) fn remove_fanout(&mut self, consumer: NodeId) -> usize {
        let before = self.fanouts.len();
        self.fanouts.retain(|lit| lit.node() != consumer);
        before - self.fanouts.len()
    }
}
