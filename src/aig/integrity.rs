use crate::{Aig, AigError, Literal, NodeId, Result};

impl Aig {
    /// Checking if the AIG structure is correct.
    /// This function was written for debug purposes, as the library is supposed to maintain
    /// integrity of the AIG at any moment. It checks that:
    /// - node 0 is the always active `False` node, and only node 0 is
    /// - every fanin of an active node refers to an existing, active node,
    ///   which lists the consumer in its fanouts with the matching polarity
    /// - every fanout of an active node refers to an active node that has it as fanin
    /// - inputs and outputs refer to nodes of the right kind
    /// - the active part reachable from the outputs is acyclic
    pub fn check_integrity(&self) -> Result<()> {
        match self.get_node(0) {
            Some(n) if n.is_false() && n.is_active() => (),
            _ => {
                return Err(AigError::InvalidState(
                    "node 0 must be the active False node".to_string(),
                ));
            }
        }

        for id in self.ids() {
            let node = self.node(id)?;
            if id != 0 && node.is_false() {
                return Err(AigError::IdZeroButNotFalse);
            }
            if node.is_active() {
                self.check_node_integrity(id)?;
            }
        }

        for &input in self.inputs() {
            if !self.node(input)?.is_input() {
                return Err(AigError::InvalidState(format!(
                    "input {} is not an input node",
                    input
                )));
            }
        }
        for &output in self.outputs() {
            if !self.node(output)?.is_output() {
                return Err(AigError::InvalidState(format!(
                    "output {} is not an output node",
                    output
                )));
            }
        }

        // Checks for acyclicity
        self.get_topological_sort()?;

        Ok(())
    }

    /// Check the bidirectional consistency around an individual active node.
    fn check_node_integrity(&self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;

        for fanin in node.fanins() {
            let driver = self
                .get_node(fanin.node())
                .ok_or(AigError::InvalidState(format!(
                    "node {} has fanin {} which is not in the AIG",
                    id, fanin
                )))?;
            if !driver.is_active() {
                return Err(AigError::InvalidState(format!(
                    "node {} has inactive fanin {}",
                    id, fanin
                )));
            }
            let back_link = Literal::new(id, fanin.is_complement());
            if !driver.fanouts().contains(&back_link) {
                return Err(AigError::InvalidState(format!(
                    "node {} has fanin {} but is not one of its fanouts",
                    id, fanin
                )));
            }
        }

        for fanout in node.fanouts() {
            let consumer = self.get_node(fanout.node()).ok_or(AigError::InvalidState(
                format!("node {} has fanout {} which is not in the AIG", id, fanout),
            ))?;
            if !consumer.is_active() {
                return Err(AigError::InvalidState(format!(
                    "node {} has inactive fanout {}",
                    id, fanout
                )));
            }
            let expected = Literal::new(id, fanout.is_complement());
            if !consumer.fanins().contains(&expected) {
                return Err(AigError::InvalidState(format!(
                    "node {} has fanout {} but is not one of its fanins",
                    id, fanout
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, FaninId, Literal};

    fn small_aig() -> (Aig, usize, usize, usize) {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let g = aig
            .add_and(Literal::new(a, false), Literal::new(b, true))
            .unwrap();
        aig.add_output(Literal::new(g, false)).unwrap();
        (aig, a, b, g)
    }

    #[test]
    fn integrity_ok() {
        let (aig, ..) = small_aig();
        assert!(aig.check_integrity().is_ok());
    }

    #[test]
    fn missing_back_link() {
        let (mut aig, _, b, _) = small_aig();
        aig.node_mut(b).unwrap().fanouts.clear();
        assert!(aig.check_integrity().is_err());
    }

    #[test]
    fn wrong_polarity_back_link() {
        let (mut aig, a, _, g) = small_aig();
        aig.node_mut(a).unwrap().fanouts = vec![Literal::new(g, true)];
        assert!(aig.check_integrity().is_err());
    }

    #[test]
    fn inactive_fanin() {
        let (mut aig, a, ..) = small_aig();
        aig.deactivate(a).unwrap();
        assert!(aig.check_integrity().is_err());
    }

    #[test]
    fn dangling_fanout() {
        let (mut aig, _, b, g) = small_aig();
        // g no longer reads b, but b still lists g
        *aig.node_mut(g)
            .unwrap()
            .fanin_mut(FaninId::Fanin1)
            .unwrap() = Literal::TRUE;
        aig.node_mut(0).unwrap().fanouts.push(Literal::new(g, true));
        assert!(!aig.fanouts(b).unwrap().is_empty());
        assert!(aig.check_integrity().is_err());
    }
}
