//! Operator-breadth-ordered placement.

use std::cmp::Reverse;
use std::collections::HashSet;

use memplan_core::{ManagedValue, MemAllocation, MemRegion, PlanInputs, ValueId};

use crate::gap::{find_offset, GapPolicy};
use crate::{PlanError, Strategy};

/// Plans the outputs of the widest operators first, best-fit gaps.
///
/// An operator's breadth is the byte sum of its outputs. Committing
/// wide operators early keeps sibling outputs near each other, which
/// cuts fragmentation between operators whose outputs coexist.
///
/// Needs the richer input form: the per-operator output lists supplied
/// through [`PlanInputs::with_operators`].
pub fn greedy_by_breadth(inputs: &PlanInputs) -> Result<Vec<MemAllocation>, PlanError> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }
    if !inputs.has_operators() {
        return Err(PlanError::MissingOperatorContext {
            strategy: Strategy::GreedyByBreadth,
        });
    }

    let mut order: Vec<(i64, usize)> = Vec::with_capacity(inputs.operators().len());
    for (position, op) in inputs.operators().iter().enumerate() {
        let mut breadth = 0i64;
        for out in &op.outputs {
            // Output ids were resolved when the bundle was built.
            let Some(v) = inputs.value(*out) else { continue };
            breadth = breadth.checked_add(v.size).ok_or(PlanError::Overflow {
                offset: breadth,
                size: v.size,
            })?;
        }
        order.push((breadth, position));
    }
    order.sort_unstable_by_key(|&(breadth, position)| (Reverse(breadth), position));

    let mut placed = Vec::with_capacity(inputs.len());
    let mut committed: HashSet<ValueId> = HashSet::with_capacity(inputs.len());
    for (_, position) in order {
        let op = &inputs.operators()[position];
        let mut outputs: Vec<&ManagedValue> = op
            .outputs
            .iter()
            .filter_map(|out| inputs.value(*out))
            .collect();
        outputs.sort_unstable_by_key(|v| (Reverse(v.size), v.lvr, v.id));
        for v in outputs {
            if !committed.insert(v.id) {
                continue; // listed by an earlier, wider operator
            }
            let offset = find_offset(&placed, v.lvr, v.size, GapPolicy::BestFit)?;
            placed.push(MemAllocation::new(v.lvr, MemRegion::new(offset, v.size)));
        }
    }
    Ok(placed)
}
