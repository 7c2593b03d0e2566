//! SAT literals and clauses, and the SAT back end used to prove equivalences.
//!
//! Clauses are built with the methods of [`Cnf`], then handed to a [`SatBackend`].
//! The default back end is [`VarisatBackend`], which relies on the
//! [varisat](https://docs.rs/varisat) solver.
//!
//! To prove that two AIG literals are equivalent, check [`crate::miter`].

use std::ops::Not;

use thiserror::Error;
use varisat::ExtendFormula;

/// Error returned by a SAT back end.
#[derive(Debug, Error)]
pub enum SatError {
    /// The solver failed for a reason of its own.
    #[error("SAT solver error: {0}")]
    Solver(String),
}

/// Answer of a SAT back end under the current assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
}

/// A SAT literal, in DIMACS format (non-zero, negative if complemented).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit(i64);

impl Lit {
    /// The positive literal of the variable with 0-based index `var`.
    pub fn from_var(var: usize) -> Self {
        Lit(var as i64 + 1)
    }

    /// 0-based index of the variable.
    pub fn var(&self) -> usize {
        (self.0.unsigned_abs() - 1) as usize
    }

    pub fn dimacs(&self) -> i64 {
        self.0
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(-self.0)
    }
}

/// A SAT clause.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clause(Vec<Lit>);

impl Clause {
    pub fn lits(&self) -> &[Lit] {
        &self.0
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(value: Vec<Lit>) -> Self {
        Clause(value)
    }
}

/// A SAT CNF that can be passed to a [`SatBackend`].
///
/// It provides the two gate shapes needed by a miter, [`and_gate`] and [`xor_gate`].
///
/// [`and_gate`]: Cnf::and_gate
/// [`xor_gate`]: Cnf::xor_gate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf(Vec<Clause>);

impl Cnf {
    /// A new empty CNF.
    pub fn new() -> Self {
        Cnf(Vec::new())
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add the given clause to the CNF.
    pub fn add_clause(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Add clauses that encode `z = AND(a, b)`.
    pub fn and_gate(&mut self, z: Lit, a: Lit, b: Lit) {
        self.add_clause(Clause::from(vec![a, !z]));
        self.add_clause(Clause::from(vec![b, !z]));
        self.add_clause(Clause::from(vec![!a, !b, z]));
    }

    /// Add clauses that encode `z = XOR(a, b)`.
    pub fn xor_gate(&mut self, z: Lit, a: Lit, b: Lit) {
        self.add_clause(Clause::from(vec![a, b, !z]));
        self.add_clause(Clause::from(vec![a, !b, z]));
        self.add_clause(Clause::from(vec![!a, b, z]));
        self.add_clause(Clause::from(vec![!a, !b, !z]));
    }
}

/// A SAT solver able to decide a formula under assumptions.
///
/// A back end is used for one query at a time: it is [`reset`] before each query,
/// so no variable or clause leaks from a query to the next one.
///
/// [`reset`]: SatBackend::reset
pub trait SatBackend {
    /// A fresh variable, as its positive literal.
    fn new_var(&mut self) -> Lit;

    fn add_clause(&mut self, clause: &Clause);

    fn add_cnf(&mut self, cnf: &Cnf) {
        for clause in cnf.clauses() {
            self.add_clause(clause);
        }
    }

    /// Add clauses that encode `z = AND(a, b)`.
    fn add_and(&mut self, z: Lit, a: Lit, b: Lit) {
        let mut cnf = Cnf::new();
        cnf.and_gate(z, a, b);
        self.add_cnf(&cnf);
    }

    /// Add clauses that encode `z = XOR(a, b)`.
    fn add_xor(&mut self, z: Lit, a: Lit, b: Lit) {
        let mut cnf = Cnf::new();
        cnf.xor_gate(z, a, b);
        self.add_cnf(&cnf);
    }

    /// Replaces the assumptions used by the following calls to [`SatBackend::solve`].
    fn assume(&mut self, lits: &[Lit]);

    fn solve(&mut self) -> Result<SatResult, SatError>;

    /// Forget every variable, clause and assumption.
    fn reset(&mut self);
}

/// [`SatBackend`] on top of the varisat CDCL solver.
pub struct VarisatBackend {
    solver: varisat::Solver<'static>,
}

impl Default for VarisatBackend {
    fn default() -> Self {
        VarisatBackend::new()
    }
}

impl VarisatBackend {
    pub fn new() -> Self {
        VarisatBackend {
            solver: varisat::Solver::new(),
        }
    }
}

fn to_varisat(lit: Lit) -> varisat::Lit {
    varisat::Lit::from_dimacs(lit.dimacs() as isize)
}

impl SatBackend for VarisatBackend {
    fn new_var(&mut self) -> Lit {
        Lit::from_var(self.solver.new_var().index())
    }

    fn add_clause(&mut self, clause: &Clause) {
        let lits: Vec<varisat::Lit> = clause.lits().iter().copied().map(to_varisat).collect();
        self.solver.add_clause(&lits);
    }

    fn assume(&mut self, lits: &[Lit]) {
        let lits: Vec<varisat::Lit> = lits.iter().copied().map(to_varisat).collect();
        self.solver.assume(&lits);
    }

    fn solve(&mut self) -> Result<SatResult, SatError> {
        match self.solver.solve() {
            Ok(true) => Ok(SatResult::Sat),
            Ok(false) => Ok(SatResult::Unsat),
            Err(e) => Err(SatError::Solver(format!("{:?}", e))),
        }
    }

    fn reset(&mut self) {
        self.solver = varisat::Solver::new();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_lit_test() {
        let l1 = Lit::from_var(0);
        assert_eq!(l1.dimacs(), 1);
        assert_eq!((!l1).dimacs(), -1);
        assert_eq!((!l1).var(), 0);
    }

    #[test]
    fn gate_shapes() {
        let (z, a, b) = (Lit(3), Lit(1), Lit(2));
        let mut cnf = Cnf::new();
        cnf.and_gate(z, a, b);
        assert_eq!(cnf.len(), 3);
        cnf.xor_gate(z, a, b);
        assert_eq!(cnf.len(), 7);

        assert_eq!(cnf.clauses()[2], Clause(vec![!a, !b, z]));
        assert_eq!(cnf.clauses()[6], Clause(vec![!a, !b, !z]));
    }

    #[test]
    fn varisat_and_xor() {
        let mut sat = VarisatBackend::new();
        let a = sat.new_var();
        let b = sat.new_var();
        let z = sat.new_var();
        let x = sat.new_var();
        sat.add_and(z, a, b);
        sat.add_xor(x, a, b);

        // AND and XOR cannot both be true
        sat.assume(&[z, x]);
        assert_eq!(sat.solve().unwrap(), SatResult::Unsat);

        // But AND can be true alone
        sat.assume(&[z]);
        assert_eq!(sat.solve().unwrap(), SatResult::Sat);

        sat.reset();
        let c = sat.new_var();
        sat.add_clause(&Clause::from(vec![c]));
        sat.assume(&[!c]);
        assert_eq!(sat.solve().unwrap(), SatResult::Unsat);
        sat.assume(&[]);
        assert_eq!(sat.solve().unwrap(), SatResult::Sat);
    }
}
