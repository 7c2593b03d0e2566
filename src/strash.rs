//! Structural hashing: merges AND gates reading the same pair of literals.
//!
//! For more information on strashing, check the following paper:
//! FRAIGs: A Unifying Representation for Logic Synthesis and Verification
//! by Alan Mishchenko, Satrajit Chatterjee, Roland Jiang, Robert Brayton.

use std::collections::HashMap;

use crate::{
    Aig, AigNode, Literal, NodeId, Result,
    dfs::PostOrder,
    event::{Event, EventKind, EventSink},
};

/// Order-independent key of an AND gate, so that `and(a, b)` and `and(b, a)` collide.
fn strash_key(fanin0: Literal, fanin1: Literal) -> (Literal, Literal) {
    (fanin0.min(fanin1), fanin0.max(fanin1))
}

/// The structural hasher.
///
/// Gates are visited in post-order from the outputs, so the fanins of a gate are already
/// hashed when the gate itself is. The first gate seen for a key is kept,
/// any later gate with the same key is replaced by it.
///
/// ```rust
/// use fraig::{Aig, Literal, event::Silent, strash::Strash};
/// let mut aig = Aig::new();
/// let a = Literal::new(aig.add_input(), false);
/// let b = Literal::new(aig.add_input(), false);
/// let g1 = aig.add_and(a, b).unwrap();
/// let g2 = aig.add_and(b, a).unwrap();
/// aig.add_output(Literal::new(g1, false)).unwrap();
/// aig.add_output(Literal::new(g2, true)).unwrap();
///
/// let mut strash = Strash::new();
/// assert_eq!(strash.run(&mut aig, &mut Silent).unwrap(), 1);
/// assert_eq!(aig.output_fanin(1), Some(Literal::new(g1, true)));
/// assert_eq!(strash.run(&mut aig, &mut Silent).unwrap(), 0);
/// ```
#[derive(Debug, Default)]
pub struct Strash {
    table: HashMap<(Literal, Literal), NodeId>,
}

impl Strash {
    pub fn new() -> Self {
        Strash::default()
    }

    /// Hash the whole AIG, returns the number of merged gates.
    pub fn run(&mut self, aig: &mut Aig, sink: &mut dyn EventSink) -> Result<usize> {
        self.table.clear();
        let mut merges = 0;

        let mut order = PostOrder::from_outputs(aig);
        while let Some(id) = order.next(aig) {
            let AigNode::And { fanin0, fanin1 } = *aig.node(id)?.kind() else {
                continue;
            };
            let key = strash_key(fanin0, fanin1);
            match self.table.get(&key) {
                Some(&first) => {
                    let surviving = Literal::new(first, false);
                    log::debug!("strash: {} is a duplicate of {}", id, first);
                    aig.replace(surviving, id)?;
                    sink.notify(Event::merge(EventKind::Strash, surviving, id));
                    merges += 1;
                }
                None => {
                    self.table.insert(key, id);
                }
            }
        }

        log::info!("strash merged {} gates", merges);
        Ok(merges)
    }
}
