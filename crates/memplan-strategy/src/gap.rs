//! Gap finding shared by the greedy strategies.
//!
//! A gap is a contiguous unoccupied offset range available to a new
//! value, given the already placed allocations whose live ranges
//! intersect the value's own. Allocations alive at disjoint times are
//! invisible here, which is what lets values share arena space.

use std::cmp::Ordering;

use memplan_core::{intersect_live_range, LiveRange, MemAllocation, MemRegion};

use crate::PlanError;

/// How a strategy chooses among candidate gaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GapPolicy {
    /// Lowest-offset gap that fits.
    FirstFit,
    /// Smallest sufficient gap, ties to the lowest offset.
    BestFit,
}

/// Finds an offset at which `need` bytes can live for the whole of
/// `lvr` without spatially conflicting with any placed allocation
/// whose live range intersects it.
///
/// Sweeps the conflicting regions in `(offset, size)` order, tracking a
/// running ceiling; the space between the ceiling and the next region
/// is a gap, and the space above every conflict is the final, unbounded
/// one. The unbounded gap is used only when no bounded gap fits.
pub(crate) fn find_offset(
    placed: &[MemAllocation],
    lvr: LiveRange,
    need: i64,
    policy: GapPolicy,
) -> Result<i64, PlanError> {
    let mut conflicts: Vec<MemRegion> = placed
        .iter()
        .filter(|a| intersect_live_range(a.lvr, lvr))
        .map(|a| a.reg)
        .collect();
    conflicts.sort_unstable();

    let mut ceiling = 0i64;
    let mut best: Option<MemRegion> = None;
    for reg in &conflicts {
        if reg.offset > ceiling {
            let gap = MemRegion::new(ceiling, reg.offset - ceiling);
            if gap.size >= need {
                match policy {
                    GapPolicy::FirstFit => return admit(gap.offset, need),
                    GapPolicy::BestFit => {
                        if best.map_or(true, |b| gap.cmp_size_then_offset(&b) == Ordering::Less) {
                            best = Some(gap);
                        }
                    }
                }
            }
        }
        let end = reg.end().ok_or(PlanError::Overflow {
            offset: reg.offset,
            size: reg.size,
        })?;
        ceiling = ceiling.max(end);
    }

    match best {
        Some(gap) => admit(gap.offset, need),
        None => admit(ceiling, need),
    }
}

/// Confirms the chosen offset admits `need` bytes within i64.
fn admit(offset: i64, need: i64) -> Result<i64, PlanError> {
    offset
        .checked_add(need)
        .map(|_| offset)
        .ok_or(PlanError::Overflow { offset, size: need })
}
