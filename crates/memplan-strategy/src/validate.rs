//! Post-pack overlap checking.

use memplan_core::MemAllocation;

use crate::PlanError;

/// Whether no two distinct allocations overlap in both time and space.
///
/// Always true for the output of a correct strategy; exposed so tests
/// and downstream consumers can assert the contract.
pub fn validate(allocations: &[MemAllocation]) -> bool {
    check(allocations).is_ok()
}

/// O(n^2) pairwise check naming the offending pair on failure.
///
/// Quadratic on purpose: planning is offline and the managed set stays
/// in the low thousands.
pub(crate) fn check(allocations: &[MemAllocation]) -> Result<(), PlanError> {
    for (i, first) in allocations.iter().enumerate() {
        for second in &allocations[i + 1..] {
            if first == second {
                // Value-identical allocations are one logical placement.
                continue;
            }
            if first.conflicts_with(second) {
                return Err(PlanError::InvariantViolation {
                    first: *first,
                    second: *second,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memplan_core::{LiveRange, MemRegion};

    fn alloc(begin: i64, end: i64, offset: i64, size: i64) -> MemAllocation {
        MemAllocation::new(LiveRange::new(begin, end), MemRegion::new(offset, size))
    }

    #[test]
    fn accepts_empty_and_single() {
        assert!(validate(&[]));
        assert!(validate(&[alloc(0, 9, 0, 64)]));
    }

    #[test]
    fn accepts_time_disjoint_space_sharing() {
        assert!(validate(&[alloc(0, 2, 0, 64), alloc(3, 5, 0, 64)]));
    }

    #[test]
    fn accepts_space_disjoint_time_sharing() {
        assert!(validate(&[alloc(0, 9, 0, 64), alloc(0, 9, 64, 64)]));
    }

    #[test]
    fn rejects_double_booking() {
        assert!(!validate(&[alloc(0, 9, 0, 64), alloc(5, 9, 32, 64)]));
    }

    #[test]
    fn names_the_offending_pair() {
        let bad = [alloc(0, 9, 0, 64), alloc(5, 9, 32, 64)];
        let err = check(&bad).unwrap_err();
        match err {
            PlanError::InvariantViolation { first, second } => {
                assert_eq!(first, bad[0]);
                assert_eq!(second, bad[1]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
