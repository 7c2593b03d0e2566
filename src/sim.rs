//! Bit-parallel simulation: 32 patterns are evaluated at once, one bit per pattern.
//!
//! A simulation session sweeps the AIG, rebuilds the candidate equivalence classes of
//! the [`FecManager`], then refines them after each simulated [`Batch`].
//! See [`random_sim`] and [`file_sim`] for the usual entry points.

pub mod stimulus;

use std::io::{BufRead, Write};

use crate::{
    Aig, AigNode, NodeId, Result,
    dfs::PostOrder,
    event::Silent,
    fec::FecManager,
};

pub use stimulus::{Batch, ExhaustiveStimulus, PatternStimulus, RandomStimulus, Stimulus};

/// Number of patterns simulated in parallel.
pub const PATTERN_WIDTH: usize = 32;

/// Options of a random simulation session.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Lower bound on the number of random patterns.
    pub min_patterns: usize,
    /// Number of random patterns for a tiny circuit, larger circuits get fewer.
    pub max_patterns: usize,
    /// Circuits with at most this many inputs are simulated exhaustively.
    pub exhaustive_input_limit: usize,
    pub seed: u64,
}

impl Default for SimOptions {
    fn default() -> Self {
        SimOptions {
            min_patterns: 2000,
            max_patterns: 5000,
            exhaustive_input_limit: 10,
            seed: 0,
        }
    }
}

impl SimOptions {
    /// `max(min_patterns, max_patterns - 10 * sqrt(node_count))`.
    pub fn session_length(&self, node_count: usize) -> usize {
        let shrink = (10.0 * (node_count as f64).sqrt()) as usize;
        self.max_patterns
            .saturating_sub(shrink)
            .max(self.min_patterns)
    }
}

/// Summary of a simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimReport {
    pub patterns: usize,
    pub batches: usize,
    /// Number of candidate equivalence classes at the end of the session.
    pub classes: usize,
}

/// The bit-parallel simulator.
///
/// It owns the simulation values (one word per node), reallocated for every session.
#[derive(Debug, Default)]
pub struct Simulator {
    values: Vec<u32>,
    /// Active nodes reachable from the outputs, fanins first.
    order: Vec<NodeId>,
}

impl Simulator {
    pub fn new() -> Self {
        Simulator::default()
    }

    /// Values of the last simulated batch, indexed by node id.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Allocate the values and compute the evaluation order for `aig`.
    fn prepare(&mut self, aig: &Aig) {
        self.values = vec![0; aig.len()];
        self.order = PostOrder::from_outputs(aig).collect(aig);
    }

    /// Evaluate one batch, `prepare` must have been called on the same AIG.
    fn simulate(&mut self, aig: &Aig, batch: &Batch) -> Result<()> {
        for (&input, &word) in aig.inputs().iter().zip(batch.words()) {
            self.values[input] = word;
        }
        for &id in &self.order {
            self.values[id] = match *aig.node(id)?.kind() {
                AigNode::False => 0,
                AigNode::Input => continue,
                AigNode::And { fanin0, fanin1 } => {
                    (self.values[fanin0.node()] ^ fanin0.mask())
                        & (self.values[fanin1.node()] ^ fanin1.mask())
                }
                AigNode::Output { fanin } => self.values[fanin.node()] ^ fanin.mask(),
            };
        }
        Ok(())
    }

    /// Evaluate a single batch without touching the equivalence classes.
    /// Returns one word per output, in declaration order.
    pub fn evaluate(&mut self, aig: &Aig, batch: &Batch) -> Result<Vec<u32>> {
        self.prepare(aig);
        self.simulate(aig, batch)?;
        Ok(aig.outputs().iter().map(|&o| self.values[o]).collect())
    }

    /// Writes one line per pattern of the batch: the input bits, a space, the output bits.
    fn write_log(&self, aig: &Aig, batch: &Batch, out: &mut dyn Write) -> Result<()> {
        for lane in 0..batch.len() {
            let bit = |id: &NodeId| if (self.values[*id] >> lane) & 1 == 1 { '1' } else { '0' };
            let inputs: String = aig.inputs().iter().map(bit).collect();
            let outputs: String = aig.outputs().iter().map(bit).collect();
            writeln!(out, "{} {}", inputs, outputs)?;
        }
        Ok(())
    }

    /// Run a whole simulation session:
    /// - dead gates are swept (silently)
    /// - `fec` is reset to a single class holding the constant and every AND gate
    /// - each batch of `stimulus` is simulated, then `fec` is refined
    /// - signatures of the last batch and class memberships are written back into the nodes.
    pub fn run(
        &mut self,
        aig: &mut Aig,
        fec: &mut FecManager,
        stimulus: &mut dyn Stimulus,
        mut sim_log: Option<&mut dyn Write>,
    ) -> Result<SimReport> {
        aig.sweep(&mut Silent)?;
        self.prepare(aig);
        fec.reset(aig);

        let mut patterns = 0;
        let mut batches = 0;
        while let Some(batch) = stimulus.next_batch(aig.inputs().len())? {
            self.simulate(aig, &batch)?;
            fec.refine(&self.values);
            if let Some(out) = sim_log.as_deref_mut() {
                self.write_log(aig, &batch, out)?;
            }
            patterns += batch.len();
            batches += 1;
            log::trace!(
                "batch {}: {} patterns, {} classes",
                batches,
                batch.len(),
                fec.len()
            );
        }

        let inputs = aig.inputs().to_vec();
        for &id in self.order.iter().chain(&inputs) {
            aig.set_signature(id, self.values[id])?;
        }
        fec.finalize(aig)?;

        log::info!("{} patterns simulated", patterns);
        Ok(SimReport {
            patterns,
            batches,
            classes: fec.len(),
        })
    }
}

/// Random simulation session.
///
/// Circuits with few inputs (see [`SimOptions::exhaustive_input_limit`]) are simulated
/// on every input assignment instead.
pub fn random_sim(
    aig: &mut Aig,
    fec: &mut FecManager,
    options: &SimOptions,
    sim_log: Option<&mut dyn Write>,
) -> Result<SimReport> {
    let num_inputs = aig.inputs().len();
    let mut simulator = Simulator::new();
    if num_inputs <= options.exhaustive_input_limit {
        let mut stimulus = ExhaustiveStimulus::new(num_inputs);
        simulator.run(aig, fec, &mut stimulus, sim_log)
    } else {
        let patterns = options.session_length(aig.len());
        let mut stimulus = RandomStimulus::from_seed(options.seed, patterns);
        simulator.run(aig, fec, &mut stimulus, sim_log)
    }
}

/// Simulation session on the patterns read from `patterns` (see [`PatternStimulus`]).
pub fn file_sim(
    aig: &mut Aig,
    fec: &mut FecManager,
    patterns: impl BufRead,
    sim_log: Option<&mut dyn Write>,
) -> Result<SimReport> {
    let mut stimulus = PatternStimulus::new(patterns);
    Simulator::new().run(aig, fec, &mut stimulus, sim_log)
}
