//! End-to-end baseline placement.

use memplan_core::{MemAllocation, MemRegion, PlanInputs};

use crate::PlanError;

/// Assigns regions end-to-end in start order, without reuse.
///
/// The arena is the sum of all sizes; the worst possible peak but
/// trivially correct. Kept as the baseline and for workloads where
/// compaction is undesirable.
pub fn naive(inputs: &PlanInputs) -> Result<Vec<MemAllocation>, PlanError> {
    let mut allocations = Vec::with_capacity(inputs.len());
    let mut offset = 0i64;
    for v in inputs.values() {
        let next = offset.checked_add(v.size).ok_or(PlanError::Overflow {
            offset,
            size: v.size,
        })?;
        allocations.push(MemAllocation::new(v.lvr, MemRegion::new(offset, v.size)));
        offset = next;
    }
    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena_size;
    use memplan_core::LiveRange;

    #[test]
    fn stacks_everything() {
        let inputs = PlanInputs::from_live_ranges(vec![
            (LiveRange::new(0, 0), 100),
            (LiveRange::new(1, 1), 100),
            (LiveRange::new(2, 2), 100),
        ])
        .unwrap();
        let allocations = naive(&inputs).unwrap();
        let offsets: Vec<_> = allocations.iter().map(|a| a.reg.offset).collect();
        assert_eq!(offsets, vec![0, 100, 200]);
        assert_eq!(arena_size(&allocations), 300);
    }

    #[test]
    fn overflow_is_fatal() {
        let inputs = PlanInputs::from_live_ranges(vec![
            (LiveRange::new(0, 0), i64::MAX - 1),
            (LiveRange::new(1, 1), i64::MAX - 1),
        ])
        .unwrap();
        let err = naive(&inputs).unwrap_err();
        assert!(matches!(err, PlanError::Overflow { .. }));
    }
}
