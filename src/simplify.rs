//! Constant propagation through the trivial AND identities.

use crate::{
    Aig, AigNode, Literal, Result,
    dfs::PostOrder,
    event::{Event, EventKind, EventSink},
};

/// What a gate `and(fanin0, fanin1)` reduces to, if it is trivial.
///
/// Rules are tried in this order:
/// - `and(1, x) = x` and `and(x, 1) = x`
/// - `and(0, x) = and(x, 0) = 0`
/// - `and(x, x) = x`
/// - `and(x, !x) = 0`
pub fn simplified(fanin0: Literal, fanin1: Literal) -> Option<Literal> {
    if fanin0.is_cst_true() {
        Some(fanin1)
    } else if fanin1.is_cst_true() {
        Some(fanin0)
    } else if fanin0.is_cst_false() || fanin1.is_cst_false() {
        Some(Literal::FALSE)
    } else if fanin0 == fanin1 {
        Some(fanin0)
    } else if fanin0.is_complement_of(&fanin1) {
        Some(Literal::FALSE)
    } else {
        None
    }
}

/// The algebraic simplifier.
///
/// Gates are visited in post-order from the outputs, so that a simplification
/// can enable another one further up.
#[derive(Debug, Default)]
pub struct Simplifier;

impl Simplifier {
    pub fn new() -> Self {
        Simplifier
    }

    /// Simplify the whole AIG, returns the number of removed gates.
    pub fn run(&mut self, aig: &mut Aig, sink: &mut dyn EventSink) -> Result<usize> {
        let mut merges = 0;

        let mut order = PostOrder::from_outputs(aig);
        while let Some(id) = order.next(aig) {
            let AigNode::And { fanin0, fanin1 } = *aig.node(id)?.kind() else {
                continue;
            };
            if let Some(surviving) = simplified(fanin0, fanin1) {
                log::debug!("simplify: {} becomes {}", id, surviving);
                aig.replace(surviving, id)?;
                sink.notify(Event::merge(EventKind::Simplify, surviving, id));
                merges += 1;
            }
        }

        log::info!("simplify removed {} gates", merges);
        Ok(merges)
    }
}
