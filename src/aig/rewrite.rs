//! Graph surgery: merging a node into a literal, and removing dead nodes.
//!
//! Every mutation of the wiring after construction goes through [`Aig::replace`] or
//! [`Aig::sweep`], both keep the fanin/fanout lists consistent.

use crate::{
    Aig, AigError, FaninId, Literal, NodeId, Result,
    dfs::VisitMarker,
    event::{Event, EventSink},
};

impl Aig {
    /// Replace the AND gate `old` by `new` everywhere:
    /// - every consumer of `old` now reads `new` (polarity of the edge XORed in)
    /// - the fanins of `old` forget about it
    /// - the fanouts of `old` are moved to the node of `new` (polarity corrected)
    /// - `old` is deactivated
    ///
    /// Only active AND gates can be replaced. `new` must not lie in the fanout cone of `old`,
    /// otherwise a cycle is created.
    ///
    /// ```rust
    /// use fraig::{Aig, Literal};
    /// let mut aig = Aig::new();
    /// let a = aig.add_input();
    /// let b = aig.add_input();
    /// let g1 = aig.add_and(Literal::new(a, false), Literal::new(b, false)).unwrap();
    /// let g2 = aig.add_and(Literal::new(b, false), Literal::new(a, false)).unwrap();
    /// let o = aig.add_output(Literal::new(g2, true)).unwrap();
    ///
    /// aig.replace(Literal::new(g1, false), g2).unwrap();
    /// assert_eq!(aig.output_fanin(0), Some(Literal::new(g1, true)));
    /// assert_eq!(aig.fanouts(g1).unwrap(), &[Literal::new(o, true)]);
    /// assert!(!aig.is_active(g2));
    /// assert!(aig.check_integrity().is_ok());
    /// ```
    pub fn replace(&mut self, new: Literal, old: NodeId) -> Result<()> {
        if new.node() == old {
            return Err(AigError::InvalidState(format!(
                "cannot replace node {} by itself",
                old
            )));
        }
        let old_node = self.node(old)?;
        if !old_node.is_and() {
            return Err(AigError::NotAnAndGate(old));
        }
        if !old_node.is_active() {
            return Err(AigError::InvalidState(format!(
                "cannot replace inactive node {}",
                old
            )));
        }
        let target = self.node(new.node())?;
        if !target.is_active() || target.is_output() {
            return Err(AigError::InvalidState(format!(
                "cannot replace node {} by {}",
                old, new
            )));
        }

        let fanins = old_node.fanins();
        let fanouts = std::mem::take(&mut self.node_mut(old)?.fanouts);

        // Consumers now read the new literal
        for fanout in &fanouts {
            let consumer = self.node_mut(fanout.node())?;
            for fanin_id in [FaninId::Fanin0, FaninId::Fanin1] {
                if let Some(lit) = consumer.fanin_mut(fanin_id) {
                    if lit.node() == old {
                        *lit = new ^ lit.is_complement();
                    }
                }
            }
        }

        // Fanins of old forget about it
        for fanin in fanins {
            self.node_mut(fanin.node())?.remove_fanout(old);
        }

        // Moving the fanouts
        let target = self.node_mut(new.node())?;
        target
            .fanouts
            .extend(fanouts.into_iter().map(|f| f ^ new.is_complement()));

        self.node_mut(old)?.active = false;
        Ok(())
    }

    /// Deactivate every active AND gate not reachable from the outputs,
    /// and remove the back-links pointing to them. Returns the removed ids, in increasing order.
    /// Inputs and the constant node are never removed.
    ///
    /// Each removal is reported to `sink`, pass [`Silent`](crate::event::Silent) for a quiet sweep.
    pub fn sweep(&mut self, sink: &mut dyn EventSink) -> Result<Vec<NodeId>> {
        let mut reached = VisitMarker::new(self.len());
        for id in self.active_post_order() {
            reached.visit(id);
        }

        let dead: Vec<NodeId> = self
            .active_ands()
            .into_iter()
            .filter(|&id| !reached.is_visited(id))
            .collect();

        for &id in &dead {
            let node = self.node_mut(id)?;
            node.active = false;
            node.fanouts.clear();
            for fanin in node.fanins() {
                self.node_mut(fanin.node())?.remove_fanout(id);
            }
            sink.notify(Event::sweep(id));
        }

        if !dead.is_empty() {
            log::debug!("sweep removed {} and gates", dead.len());
        }
        Ok(dead)
    }

    /// Returns true if `target` is in the fanin cone of `root` (`root` included),
    /// only following active nodes.
    pub fn fanin_cone_contains(&self, root: NodeId, target: NodeId) -> bool {
        let mut marker = VisitMarker::new(self.len());
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !self.is_active(id) || !marker.visit(id) {
                continue;
            }
            if let Some(node) = self.get_node(id) {
                stack.extend(node.fanins().iter().map(Literal::node));
            }
        }
        false
    }

    fn active_post_order(&self) -> Vec<NodeId> {
        crate::dfs::PostOrder::from_outputs(self).collect(self)
    }
}
