//! Prove that two literals of an AIG are equivalent with a SAT miter.
//!
//! To prove that `a` and `b` compute the same function:
//! - encode the fanin cones of `a` and `b` as a CNF (one variable per node)
//! - add a miter variable `m = XOR(a, b)`
//! - check that the CNF is **UNSAT** under the assumption `m`.
//!
//! If the CNF is SAT, there is an input assignment for which `a` and `b` differ,
//! so they are **not equivalent**.
//!
//! For background on what is a miter, please check
//! [Verification of large synthesized designs](https://doi.org/10.1109/ICCAD.1993.580110) by D. Brand.

use crate::{
    Aig, AigError, AigNode, Literal, NodeId, Result,
    cnf::{Clause, Lit, SatBackend, SatResult, VarisatBackend},
};

/// The struct used to check the equivalence of two literals of the same AIG.
///
/// Every query starts from a [`reset`](SatBackend::reset) back end and a fresh
/// node to variable map, so nothing leaks from one query to the next one.
///
/// ```rust
/// use fraig::{Aig, Literal, miter::EquivChecker};
/// let mut aig = Aig::new();
/// let x = Literal::new(aig.add_input(), false);
/// let y = Literal::new(aig.add_input(), false);
/// // and(x, y) vs !or(!x, !y) = !and(!!x, !!y) built the long way
/// let direct = Literal::new(aig.add_and(x, y).unwrap(), false);
/// let nx = Literal::new(aig.add_and(!x, Literal::TRUE).unwrap(), false);
/// let ny = Literal::new(aig.add_and(!y, Literal::TRUE).unwrap(), false);
/// let demorgan = Literal::new(aig.add_and(!nx, !ny).unwrap(), false);
///
/// let mut checker = EquivChecker::new();
/// assert!(checker.prove(&aig, direct, demorgan).unwrap());
/// assert!(!checker.prove(&aig, direct, x).unwrap());
/// ```
pub struct EquivChecker<B: SatBackend = VarisatBackend> {
    backend: B,
    /// SAT variable of each node of the current query.
    vars: Vec<Option<Lit>>,
}

impl Default for EquivChecker<VarisatBackend> {
    fn default() -> Self {
        EquivChecker::new()
    }
}

impl EquivChecker<VarisatBackend> {
    pub fn new() -> Self {
        EquivChecker::with_backend(VarisatBackend::new())
    }
}

impl<B: SatBackend> EquivChecker<B> {
    pub fn with_backend(backend: B) -> Self {
        EquivChecker {
            backend,
            vars: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// SAT literal of an AIG literal whose node is already encoded.
    fn sat_lit(&self, lit: Literal) -> Result<Lit> {
        let var = self
            .vars
            .get(lit.node())
            .copied()
            .flatten()
            .ok_or(AigError::InvalidState(format!(
                "node {} is not mapped to any SAT variable",
                lit.node()
            )))?;
        Ok(if lit.is_complement() { !var } else { var })
    }

    /// Encode the fanin cone of `root`, fanins first.
    fn encode(&mut self, aig: &Aig, root: NodeId) -> Result<()> {
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            let node = aig.node(id)?;
            if self.vars[id].is_some() {
                continue;
            }
            if !node.is_active() {
                return Err(AigError::InvalidState(format!(
                    "inactive node {} in the cone of {}",
                    id, root
                )));
            }

            if !expanded {
                stack.push((id, true));
                for fanin in node.fanins() {
                    if !matches!(self.vars.get(fanin.node()), Some(Some(_))) {
                        stack.push((fanin.node(), false));
                    }
                }
                continue;
            }

            let var = match *node.kind() {
                AigNode::False => {
                    let var = self.backend.new_var();
                    self.backend.add_clause(&Clause::from(vec![!var]));
                    var
                }
                AigNode::Input => self.backend.new_var(),
                AigNode::And { fanin0, fanin1 } => {
                    let a = self.sat_lit(fanin0)?;
                    let b = self.sat_lit(fanin1)?;
                    let z = self.backend.new_var();
                    self.backend.add_and(z, a, b);
                    z
                }
                // An output is just a buffer of its fanin
                AigNode::Output { fanin } => self.sat_lit(fanin)?,
            };
            self.vars[id] = Some(var);
        }
        Ok(())
    }

    /// Returns true if `a` and `b` are equivalent (the miter is UNSAT),
    /// false if some input assignment tells them apart.
    pub fn prove(&mut self, aig: &Aig, a: Literal, b: Literal) -> Result<bool> {
        self.backend.reset();
        self.vars = vec![None; aig.len()];

        self.encode(aig, a.node())?;
        self.encode(aig, b.node())?;
        let la = self.sat_lit(a)?;
        let lb = self.sat_lit(b)?;

        let miter = self.backend.new_var();
        self.backend.add_xor(miter, la, lb);
        self.backend.assume(&[miter]);

        let result = self.backend.solve()?;
        log::trace!("miter {} vs {}: {:?}", a, b, result);
        Ok(result == SatResult::Unsat)
    }
}
