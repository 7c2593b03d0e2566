//! Functional reduction: every candidate equivalence found by simulation is checked
//! with SAT, proven pairs are merged.
//!
//! For more information, check the following paper:
//! FRAIGs: A Unifying Representation for Logic Synthesis and Verification
//! by Alan Mishchenko, Satrajit Chatterjee, Roland Jiang, Robert Brayton.

use crate::{
    Aig, Literal, Result,
    cnf::{SatBackend, VarisatBackend},
    event::{Event, EventKind, EventSink, Silent},
    fec::FecManager,
    miter::EquivChecker,
    sim::{SimOptions, random_sim},
    strash::Strash,
};

#[derive(Debug, Clone)]
pub struct FraigOptions {
    /// Number of disproofs in a row after which a pivot stops looking for equivalent members.
    /// The next pivot of the class starts again from zero.
    pub max_consecutive_failures: usize,
}

impl Default for FraigOptions {
    fn default() -> Self {
        FraigOptions {
            max_consecutive_failures: 8,
        }
    }
}

/// Where a [`Fraig`] stands in the reduction of an AIG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FraigState {
    #[default]
    Idle,
    Simulating,
    Partitioned,
    Verifying,
    Swept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FraigReport {
    /// Pairs proven equivalent.
    pub proofs: usize,
    /// Pairs with a distinguishing input assignment.
    pub disproofs: usize,
    /// Gates removed by a merge.
    pub merges: usize,
}

/// The fraig orchestrator.
///
/// ```rust
/// use fraig::{Aig, Literal, event::Silent, fec::FecManager, fraig::Fraig, sim};
/// let mut aig = Aig::new();
/// let a = Literal::new(aig.add_input(), false);
/// let b = Literal::new(aig.add_input(), false);
/// let g1 = aig.add_and(a, b).unwrap();
/// // !and(!a, !b) = or(a, b), then and(g1, or(a, b)) = g1
/// let g2 = aig.add_and(!a, !b).unwrap();
/// let g3 = aig.add_and(Literal::new(g1, false), Literal::new(g2, true)).unwrap();
/// aig.add_output(Literal::new(g1, false)).unwrap();
/// aig.add_output(Literal::new(g3, false)).unwrap();
///
/// let mut fec = FecManager::new();
/// sim::random_sim(&mut aig, &mut fec, &sim::SimOptions::default(), None).unwrap();
/// let report = Fraig::new().run(&mut aig, &mut fec, &mut Silent).unwrap();
/// assert_eq!(report.merges, 1);
/// assert_eq!(aig.output_fanin(1), Some(Literal::new(g1, false)));
/// ```
pub struct Fraig<B: SatBackend = VarisatBackend> {
    options: FraigOptions,
    checker: EquivChecker<B>,
    state: FraigState,
}

impl Default for Fraig<VarisatBackend> {
    fn default() -> Self {
        Fraig::new()
    }
}

impl Fraig<VarisatBackend> {
    pub fn new() -> Self {
        Fraig::with_checker(FraigOptions::default(), EquivChecker::new())
    }

    pub fn with_options(options: FraigOptions) -> Self {
        Fraig::with_checker(options, EquivChecker::new())
    }
}

impl<B: SatBackend> Fraig<B> {
    pub fn with_checker(options: FraigOptions, checker: EquivChecker<B>) -> Self {
        Fraig {
            options,
            checker,
            state: FraigState::Idle,
        }
    }

    pub fn options(&self) -> &FraigOptions {
        &self.options
    }

    pub fn state(&self) -> FraigState {
        self.state
    }

    /// Merge `b` into `a` (or `a` into `b` if `b` is in the fanin cone of `a`),
    /// the two literals being proven equivalent. Returns false if neither node can be removed.
    fn merge(aig: &mut Aig, a: Literal, b: Literal, sink: &mut dyn EventSink) -> Result<bool> {
        let (keep, drop) = if aig.is_and(b.node()) && !aig.fanin_cone_contains(a.node(), b.node())
        {
            (a, b)
        } else {
            (b, a)
        };
        if !aig.is_and(drop.node()) {
            return Ok(false);
        }
        // drop.node() ^ pol(drop) = keep
        let surviving = keep ^ drop.is_complement();
        log::debug!("fraig: {} merged into {}", drop.node(), surviving);
        aig.replace(surviving, drop.node())?;
        sink.notify(Event::merge(EventKind::Fraig, surviving, drop.node()));
        Ok(true)
    }

    /// Verify the classes of `fec` (as left by a simulation session) and merge
    /// every proven pair. The AIG is swept and `fec` cleared afterwards.
    pub fn run(
        &mut self,
        aig: &mut Aig,
        fec: &mut FecManager,
        sink: &mut dyn EventSink,
    ) -> Result<FraigReport> {
        self.state = FraigState::Verifying;
        let mut report = FraigReport::default();
        let max_failures = self.options.max_consecutive_failures;

        for class in fec.classes() {
            if class.len() < 2 {
                continue;
            }
            let mut resolved = vec![false; class.len()];

            for x in 0..class.len() {
                if resolved[x] || !aig.is_active(class[x].node()) {
                    continue;
                }
                let mut failures = 0;
                for y in x + 1..class.len() {
                    if resolved[y] || !aig.is_active(class[y].node()) {
                        continue;
                    }
                    if failures >= max_failures {
                        break;
                    }

                    let (a, b) = (class[x], class[y]);
                    if !self.checker.prove(aig, a, b)? {
                        report.disproofs += 1;
                        failures += 1;
                        continue;
                    }

                    report.proofs += 1;
                    failures = 0;
                    if !Fraig::<B>::merge(aig, a, b, sink)? {
                        continue;
                    }
                    report.merges += 1;
                    if aig.is_active(b.node()) {
                        // The pivot itself was removed
                        resolved[x] = true;
                        break;
                    }
                    resolved[y] = true;
                }
            }
        }

        aig.sweep(&mut Silent)?;
        fec.clear();
        self.state = FraigState::Swept;

        log::info!(
            "fraig: {} proofs, {} disproofs, {} merges",
            report.proofs,
            report.disproofs,
            report.merges
        );
        Ok(report)
    }

    /// Whole reduction: strash, random simulation, then [`Fraig::run`].
    pub fn reduce(
        &mut self,
        aig: &mut Aig,
        sim_options: &SimOptions,
        sink: &mut dyn EventSink,
    ) -> Result<FraigReport> {
        self.state = FraigState::Idle;
        Strash::new().run(aig, sink)?;

        self.state = FraigState::Simulating;
        let mut fec = FecManager::new();
        random_sim(aig, &mut fec, sim_options, None)?;
        self.state = FraigState::Partitioned;

        self.run(aig, &mut fec, sink)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{NodeId, sim::file_sim};

    /// g1 = and(a, b) and g3 = and(!n1, !n2) with n1 = and(!a, 1), n2 = and(!b, 1).
    /// Outputs are g1 and !g3.
    fn de_morgan() -> (Aig, NodeId, NodeId) {
        let mut aig = Aig::new();
        let a = Literal::new(aig.add_input(), false);
        let b = Literal::new(aig.add_input(), false);
        let g1 = aig.add_and(a, b).unwrap();
        let n1 = aig.add_and(!a, Literal::TRUE).unwrap();
        let n2 = aig.add_and(!b, Literal::TRUE).unwrap();
        let g3 = aig
            .add_and(Literal::new(n1, true), Literal::new(n2, true))
            .unwrap();
        aig.add_output(Literal::new(g1, false)).unwrap();
        aig.add_output(Literal::new(g3, true)).unwrap();
        (aig, g1, g3)
    }

    #[test]
    fn de_morgan_is_reduced() {
        let (mut aig, g1, g3) = de_morgan();
        let mut fec = FecManager::new();
        random_sim(&mut aig, &mut fec, &SimOptions::default(), None).unwrap();
        assert!(fec.class_of(&aig, g1).is_some());

        let mut fraig = Fraig::new();
        assert_eq!(fraig.state(), FraigState::Idle);
        let mut events = Vec::new();
        let report = fraig.run(&mut aig, &mut fec, &mut events).unwrap();
        assert_eq!(fraig.state(), FraigState::Swept);
        assert!(fec.is_empty());

        // Exactly one of g1, g3 survives, and both outputs read it
        assert!(aig.is_active(g1) ^ aig.is_active(g3));
        let survivor = if aig.is_active(g1) { g1 } else { g3 };
        assert_eq!(aig.output_fanin(0), Some(Literal::new(survivor, false)));
        assert_eq!(aig.output_fanin(1), Some(Literal::new(survivor, true)));
        assert!(report.proofs >= 1);
        assert!(report.merges >= 1);
        assert!(
            events
                .iter()
                .any(|e| e.kind == EventKind::Fraig && e.removed != survivor)
        );
        // n1 and n2 are complements of inputs, not merged but swept once unused
        assert_eq!(aig.num_active_ands(), 1);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn constant_gate_is_merged_into_false() {
        let mut aig = Aig::new();
        let a = Literal::new(aig.add_input(), false);
        let b = Literal::new(aig.add_input(), false);
        let g1 = aig.add_and(a, b).unwrap();
        let never = aig.add_and(Literal::new(g1, false), !a).unwrap();
        aig.add_output(Literal::new(never, true)).unwrap();

        let mut fec = FecManager::new();
        random_sim(&mut aig, &mut fec, &SimOptions::default(), None).unwrap();
        let report = Fraig::new().run(&mut aig, &mut fec, &mut Silent).unwrap();
        assert_eq!(report.merges, 1);
        assert_eq!(aig.output_fanin(0), Some(Literal::TRUE));
        assert!(!aig.is_active(never));
        assert!(!aig.is_active(g1));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn false_candidates_are_kept() {
        // A single pattern cannot tell and(a, b) from and(a, !b) apart
        let mut aig = Aig::new();
        let a = Literal::new(aig.add_input(), false);
        let b = Literal::new(aig.add_input(), false);
        let g1 = aig.add_and(a, b).unwrap();
        let g2 = aig.add_and(a, !b).unwrap();
        aig.add_output(Literal::new(g1, false)).unwrap();
        aig.add_output(Literal::new(g2, false)).unwrap();

        let mut fec = FecManager::new();
        file_sim(&mut aig, &mut fec, "00".as_bytes(), None).unwrap();
        assert_eq!(fec.len(), 1);

        let report = Fraig::new().run(&mut aig, &mut fec, &mut Silent).unwrap();
        assert_eq!(report.merges, 0);
        assert_eq!(report.proofs, 0);
        // const vs g1, const vs g2, g1 vs g2
        assert_eq!(report.disproofs, 3);
        assert!(aig.is_active(g1) && aig.is_active(g2));
    }

    /// One class `[0, and(a, b), and(a, !b), and(!a, b), and(!b, a)]`: every gate
    /// is 0 on the single pattern 00.
    fn zero_on_one_pattern() -> (Aig, Vec<NodeId>, FecManager) {
        let mut aig = Aig::new();
        let a = Literal::new(aig.add_input(), false);
        let b = Literal::new(aig.add_input(), false);
        let gates = vec![
            aig.add_and(a, b).unwrap(),
            aig.add_and(a, !b).unwrap(),
            aig.add_and(!a, b).unwrap(),
            aig.add_and(!b, a).unwrap(),
        ];
        for &g in &gates {
            aig.add_output(Literal::new(g, false)).unwrap();
        }
        let mut fec = FecManager::new();
        file_sim(&mut aig, &mut fec, "00".as_bytes(), None).unwrap();
        assert_eq!(fec.classes().len(), 1);
        assert_eq!(fec.classes()[0].len(), 5);
        (aig, gates, fec)
    }

    #[test]
    fn failures_stop_the_scan_of_a_pivot() {
        let (mut aig, _, mut fec) = zero_on_one_pattern();
        let mut fraig = Fraig::with_options(FraigOptions {
            max_consecutive_failures: 1,
        });
        let report = fraig.run(&mut aig, &mut fec, &mut Silent).unwrap();
        // Each of the pivots 0, and(a, b), and(a, !b), and(!a, b) gives up after its first
        // member, and(a, !b) only compares against and(!a, b)
        assert_eq!(report.disproofs, 4);
        assert_eq!(report.proofs, 0);
        assert_eq!(report.merges, 0);
    }

    #[test]
    fn later_pivot_gets_a_fresh_budget() {
        let (mut aig, gates, mut fec) = zero_on_one_pattern();
        let mut fraig = Fraig::with_options(FraigOptions {
            max_consecutive_failures: 2,
        });
        let report = fraig.run(&mut aig, &mut fec, &mut Silent).unwrap();
        // 0 and and(a, b) give up after 2 disproofs each, and(a, !b) fails on and(!a, b)
        // then proves and(!b, a)
        assert_eq!(report.disproofs, 5);
        assert_eq!(report.proofs, 1);
        assert_eq!(report.merges, 1);
        assert!(aig.is_active(gates[1]) ^ aig.is_active(gates[3]));
        assert_eq!(aig.output_fanin(1), aig.output_fanin(3));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn reduce_whole_pipeline() {
        let (mut aig, ..) = de_morgan();
        let mut events = Vec::new();
        let mut fraig = Fraig::new();
        fraig
            .reduce(&mut aig, &SimOptions::default(), &mut events)
            .unwrap();
        assert_eq!(fraig.state(), FraigState::Swept);
        assert_eq!(aig.num_active_ands(), 1);
        assert_eq!(
            aig.output_fanin(0).map(|l| !l),
            aig.output_fanin(1)
        );
        aig.check_integrity().unwrap();
    }
}
