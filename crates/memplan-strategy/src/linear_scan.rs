//! Start-ordered placement with an active set.

use memplan_core::{intersect_live_range, MemAllocation, MemRegion, PlanInputs};

use crate::PlanError;

/// Plans values in start order, reusing space behind expired lifetimes.
///
/// The active set holds allocations whose live ranges intersect the
/// value being placed; entries are evicted as soon as they stop
/// intersecting, which is final because later values start no earlier.
/// The new value takes the lowest offset that clears every active
/// region, sweeping them in `(offset, size)` order.
pub fn linear_scan(inputs: &PlanInputs) -> Result<Vec<MemAllocation>, PlanError> {
    let mut allocations = Vec::with_capacity(inputs.len());
    let mut active: Vec<MemAllocation> = Vec::new();

    for v in inputs.values() {
        active.retain(|a| intersect_live_range(a.lvr, v.lvr));
        active.sort_unstable_by_key(|a| a.reg);

        let mut offset = 0i64;
        for a in &active {
            let cand_end = offset.checked_add(v.size).ok_or(PlanError::Overflow {
                offset,
                size: v.size,
            })?;
            if cand_end <= a.reg.offset {
                break;
            }
            let end = a.reg.end().ok_or(PlanError::Overflow {
                offset: a.reg.offset,
                size: a.reg.size,
            })?;
            offset = offset.max(end);
        }
        offset.checked_add(v.size).ok_or(PlanError::Overflow {
            offset,
            size: v.size,
        })?;

        let alloc = MemAllocation::new(v.lvr, MemRegion::new(offset, v.size));
        active.push(alloc);
        allocations.push(alloc);
    }
    Ok(allocations)
}
