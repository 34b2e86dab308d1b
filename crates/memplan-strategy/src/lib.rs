//! Packing strategies for static memory planning.
//!
//! Turns a validated [`PlanInputs`] bundle into a [`MemoryPlan`]: one
//! arena region per managed value such that no two values overlap in
//! both time and space. Six strategies share that contract and differ
//! only in packing discipline; [`plan`] is the single dispatch point.

mod gap;
mod greedy_by_breadth;
mod greedy_by_size;
mod linear_scan;
mod naive;
mod validate;

pub use greedy_by_breadth::greedy_by_breadth;
pub use greedy_by_size::{greedy_by_longest_and_size, greedy_by_size, greedy_by_size_with_first_gap};
pub use linear_scan::linear_scan;
pub use naive::naive;
pub use validate::validate;

use std::fmt;

use memplan_core::{MemAllocation, ModelError, PlanInputs};

/// Errors that can occur while packing.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The problem bundle itself was malformed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// 64-bit size arithmetic wrapped while packing.
    #[error("size arithmetic overflow while planning (adding {size} to {offset})")]
    Overflow {
        /// Base the addition started from.
        offset: i64,
        /// Amount that could not be added.
        size: i64,
    },

    /// The planned layout violates the non-overlap contract. This is a
    /// strategy bug, never a user error.
    #[error("allocations overlap: {first} vs {second}")]
    InvariantViolation {
        /// One of the colliding allocations.
        first: MemAllocation,
        /// The other one.
        second: MemAllocation,
    },

    /// A strategy that needs per-operator inputs was run without them.
    #[error("strategy {strategy} requires per-operator inputs, but none were supplied")]
    MissingOperatorContext {
        /// The strategy that was requested.
        strategy: Strategy,
    },
}

/// Selects the packing discipline used by [`plan`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// End-to-end placement, no reuse. The baseline.
    Naive,
    /// Start-ordered placement with an active set.
    LinearScan,
    /// Largest values first, best-fit gaps.
    #[default]
    GreedyBySize,
    /// Largest values first, first-fit gaps.
    GreedyBySizeWithFirstGap,
    /// Longest-lived (then largest) values first, first-fit gaps.
    GreedyByLongestAndSize,
    /// Widest operators first, best-fit gaps.
    GreedyByBreadth,
}

impl Strategy {
    /// Every strategy, in documentation order.
    pub const ALL: [Strategy; 6] = [
        Strategy::Naive,
        Strategy::LinearScan,
        Strategy::GreedyBySize,
        Strategy::GreedyBySizeWithFirstGap,
        Strategy::GreedyByLongestAndSize,
        Strategy::GreedyByBreadth,
    ];

    /// The kebab-case name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::LinearScan => "linear-scan",
            Self::GreedyBySize => "greedy-by-size",
            Self::GreedyBySizeWithFirstGap => "greedy-by-size-with-first-gap",
            Self::GreedyByLongestAndSize => "greedy-by-longest-and-size",
            Self::GreedyByBreadth => "greedy-by-breadth",
        }
    }

    /// Parses a kebab-case strategy name; `None` for unknown names.
    pub fn from_str_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A planned arena layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryPlan {
    /// One placement per managed value.
    pub allocations: Vec<MemAllocation>,
    /// Required arena size: the peak byte offset reached.
    pub arena_size: i64,
}

impl fmt::Display for MemoryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Peak memory: {} bytes", self.arena_size)?;
        writeln!(f, "Buffers: {}", self.allocations.len())?;
        let total = self
            .allocations
            .iter()
            .fold(0i64, |acc, a| acc.saturating_add(a.reg.size));
        writeln!(
            f,
            "Reuse savings: {} bytes",
            total.saturating_sub(self.arena_size)
        )?;
        for (i, alloc) in self.allocations.iter().enumerate() {
            writeln!(f, "  buffer_{i}: {alloc}")?;
        }
        Ok(())
    }
}

/// Plans a memory layout for `inputs` using the given strategy.
///
/// Every non-naive strategy is followed by the O(n^2) overlap check; a
/// failure there surfaces as [`PlanError::InvariantViolation`].
pub fn plan(inputs: &PlanInputs, strategy: Strategy) -> Result<MemoryPlan, PlanError> {
    let allocations = match strategy {
        Strategy::Naive => naive(inputs)?,
        Strategy::LinearScan => linear_scan(inputs)?,
        Strategy::GreedyBySize => greedy_by_size(inputs)?,
        Strategy::GreedyBySizeWithFirstGap => greedy_by_size_with_first_gap(inputs)?,
        Strategy::GreedyByLongestAndSize => greedy_by_longest_and_size(inputs)?,
        Strategy::GreedyByBreadth => greedy_by_breadth(inputs)?,
    };
    if strategy != Strategy::Naive {
        validate::check(&allocations)?;
    }
    let arena_size = arena_size(&allocations);
    log::debug!(
        "{strategy}: {} allocations, peak {} bytes",
        allocations.len(),
        arena_size
    );
    Ok(MemoryPlan {
        allocations,
        arena_size,
    })
}

/// Peak byte offset reached by any allocation; zero when empty.
pub fn arena_size(allocations: &[MemAllocation]) -> i64 {
    allocations
        .iter()
        .map(|a| a.reg.end().unwrap_or(i64::MAX))
        .max()
        .unwrap_or(0)
}
