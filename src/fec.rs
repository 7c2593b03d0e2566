//! Candidate functionally equivalent classes (FECs), refined by simulation.
//!
//! A class is a list of member literals `2 * id + inverted`. The first member is the pivot
//! of the class and is never inverted. A member is inverted when its simulated values are
//! the complement of the pivot's ones.

use std::collections::HashMap;

use crate::{Aig, FecMembership, Literal, NodeId, Result};

/// Holds the partition of the candidate nodes into classes.
///
/// Lifecycle, driven by the [`Simulator`](crate::sim::Simulator):
/// - [`reset`] before the first batch of a session
/// - [`refine`] after every batch
/// - [`finalize`] once the session is over.
///
/// [`reset`]: FecManager::reset
/// [`refine`]: FecManager::refine
/// [`finalize`]: FecManager::finalize
#[derive(Debug, Clone, Default)]
pub struct FecManager {
    classes: Vec<Vec<Literal>>,
}

fn value(values: &[u32], id: NodeId) -> u32 {
    values.get(id).copied().unwrap_or(0)
}

impl FecManager {
    pub fn new() -> Self {
        FecManager::default()
    }

    /// The current classes, each holding at least two members.
    pub fn classes(&self) -> &[Vec<Literal>] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }

    /// Single class made of the constant node and every active AND gate,
    /// as nothing distinguishes them yet.
    pub fn reset(&mut self, aig: &Aig) {
        let class: Vec<Literal> = std::iter::once(Literal::FALSE)
            .chain(
                aig.active_ands()
                    .into_iter()
                    .map(|id| Literal::new(id, false)),
            )
            .collect();
        self.classes = if class.len() >= 2 { vec![class] } else { vec![] };
    }

    /// Split the classes according to the simulated `values` (indexed by node id).
    ///
    /// Within a class, a member whose values match the pivot's (up to its inversion flag) stays,
    /// one matching the complement stays with its flag toggled. The others are moved to new
    /// classes grouping equal (or complementary) values, appended after the existing ones.
    /// Classes left with a single member are dropped.
    pub fn refine(&mut self, values: &[u32]) {
        let count = self.classes.len();
        // Values of the pivot of each new class created for the current class
        let mut fresh: HashMap<u32, usize> = HashMap::new();
        let mut evicted = 0;

        for c in 0..count {
            fresh.clear();
            let class = std::mem::take(&mut self.classes[c]);
            let Some((&pivot, members)) = class.split_first() else {
                continue;
            };
            let pivot_value = value(values, pivot.node());
            let mut kept = vec![pivot];

            for &member in members {
                let raw = value(values, member.node());
                let oriented = raw ^ member.mask();
                if oriented == pivot_value {
                    kept.push(member);
                } else if !oriented == pivot_value {
                    kept.push(!member);
                } else {
                    evicted += 1;
                    let id = member.node();
                    if let Some(&target) = fresh.get(&raw) {
                        self.classes[target].push(Literal::new(id, false));
                    } else if let Some(&target) = fresh.get(&!raw) {
                        self.classes[target].push(Literal::new(id, true));
                    } else {
                        fresh.insert(raw, self.classes.len());
                        self.classes.push(vec![Literal::new(id, false)]);
                    }
                }
            }

            self.classes[c] = kept;
        }

        self.classes.retain(|class| class.len() >= 2);
        log::debug!(
            "fec refinement: {} members evicted, {} classes",
            evicted,
            self.classes.len()
        );
    }

    /// Sort the classes and record the membership of each node in the AIG.
    pub fn finalize(&mut self, aig: &mut Aig) -> Result<()> {
        self.classes.sort();

        let ids: Vec<NodeId> = aig.ids().collect();
        for id in ids {
            aig.set_fec(id, None)?;
        }
        for (index, class) in self.classes.iter().enumerate() {
            for member in class {
                aig.set_fec(
                    member.node(),
                    Some(FecMembership {
                        class: index,
                        inverted: member.is_complement(),
                    }),
                )?;
            }
        }
        Ok(())
    }

    /// The class `id` belongs to, as recorded by the last [`FecManager::finalize`].
    pub fn class_of(&self, aig: &Aig, id: NodeId) -> Option<&[Literal]> {
        let membership = aig.get_node(id)?.fec()?;
        self.classes.get(membership.class).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lit(id: NodeId, inverted: bool) -> Literal {
        Literal::new(id, inverted)
    }

    fn manager(classes: Vec<Vec<Literal>>) -> FecManager {
        FecManager { classes }
    }

    #[test]
    fn reset_test() {
        let mut aig = Aig::new();
        let a = Literal::new(aig.add_input(), false);
        let b = Literal::new(aig.add_input(), false);
        let g1 = aig.add_and(a, b).unwrap();
        let g2 = aig.add_and(a, !b).unwrap();
        let mut fec = FecManager::new();
        fec.reset(&aig);
        assert_eq!(fec.classes(), &[vec![Literal::FALSE, lit(g1, false), lit(g2, false)]]);

        // Nothing but the constant
        fec.reset(&Aig::new());
        assert!(fec.is_empty());
    }

    #[test]
    fn refine_keeps_equal_and_complement() {
        let mut fec = manager(vec![vec![lit(1, false), lit(2, false), lit(3, false)]]);
        let values = [0, 0b0110, 0b0110, !0b0110];
        fec.refine(&values);
        assert_eq!(fec.classes(), &[vec![lit(1, false), lit(2, false), lit(3, true)]]);

        // Flags are relative to the pivot: 3 is still the complement
        fec.refine(&values);
        assert_eq!(fec.classes(), &[vec![lit(1, false), lit(2, false), lit(3, true)]]);

        // Now 3 matches the pivot, its flag is toggled back
        fec.refine(&[0, 0b0110, 0b0110, 0b0110]);
        assert_eq!(fec.classes(), &[vec![lit(1, false), lit(2, false), lit(3, false)]]);
    }

    #[test]
    fn refine_groups_evicted_members() {
        let mut fec = manager(vec![vec![
            lit(0, false),
            lit(1, false),
            lit(2, false),
            lit(3, false),
            lit(4, true),
            lit(5, false),
        ]]);
        // 0 and 1 agree, 2 and 3 are complements, 4 is alone, 5 equals 2
        let values = [0, 0, 0b01, !0b01, 0b11, 0b01];
        fec.refine(&values);
        assert_eq!(
            fec.classes(),
            &[
                vec![lit(0, false), lit(1, false)],
                vec![lit(2, false), lit(3, true), lit(5, false)],
            ]
        );
    }

    #[test]
    fn new_classes_wait_for_next_batch() {
        let mut fec = manager(vec![vec![lit(0, false), lit(1, false), lit(2, false)]]);
        // 1 and 2 leave the class of the constant together
        fec.refine(&[0, 0b1, 0b1]);
        assert_eq!(fec.classes(), &[vec![lit(1, false), lit(2, false)]]);
        fec.refine(&[0, 0b1, 0b10]);
        assert!(fec.is_empty());
    }

    #[test]
    fn singletons_are_dropped() {
        let mut fec = manager(vec![
            vec![lit(0, false), lit(1, false)],
            vec![lit(2, false), lit(3, false)],
        ]);
        fec.refine(&[0, 1, 5, 5]);
        assert_eq!(fec.classes(), &[vec![lit(2, false), lit(3, false)]]);
    }

    #[test]
    fn finalize_test() {
        let mut aig = Aig::new();
        let a = Literal::new(aig.add_input(), false);
        let b = Literal::new(aig.add_input(), false);
        let g1 = aig.add_and(a, b).unwrap();
        let g2 = aig.add_and(b, a).unwrap();
        let g3 = aig.add_and(!a, !b).unwrap();

        let mut fec = manager(vec![
            vec![lit(g1, false), lit(g2, false)],
            vec![lit(0, false), lit(g3, true)],
        ]);
        fec.finalize(&mut aig).unwrap();
        assert_eq!(
            fec.classes(),
            &[
                vec![lit(0, false), lit(g3, true)],
                vec![lit(g1, false), lit(g2, false)],
            ]
        );
        assert_eq!(
            aig.node(g3).unwrap().fec(),
            Some(FecMembership {
                class: 0,
                inverted: true
            })
        );
        assert_eq!(fec.class_of(&aig, g2), Some(&fec.classes()[1][..]));
        assert_eq!(fec.class_of(&aig, a.node()), None);
    }
}
