//! Input-domain errors.

use crate::{LiveRange, ValueId};

/// Errors detected while building a [`crate::PlanInputs`] bundle.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A live range outside the input domain.
    #[error("invalid live range {lvr}: expected 0 <= begin <= end")]
    InvalidLiveRange {
        /// The offending range.
        lvr: LiveRange,
    },

    /// A managed value with a non-positive byte size.
    #[error("invalid size {size} for live range {lvr}: sizes must be positive")]
    InvalidSize {
        /// The range the size was supplied for.
        lvr: LiveRange,
        /// The offending size.
        size: i64,
    },

    /// Two managed values share the same id.
    #[error("duplicate value id {id}")]
    DuplicateValue {
        /// The id supplied more than once.
        id: ValueId,
    },

    /// An operator output references a value that is not in the bundle.
    #[error("operator '{op}' outputs unknown value {id}")]
    UnknownValue {
        /// The dangling id.
        id: ValueId,
        /// Label of the operator that referenced it.
        op: String,
    },

    /// Operators were supplied, but none of them produces this value.
    #[error("value {id} is not produced by any supplied operator")]
    UnproducedValue {
        /// The orphaned id.
        id: ValueId,
    },
}
