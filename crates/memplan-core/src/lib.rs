#![warn(missing_docs)]
//! Core data model for static memory planning.
//!
//! Provides the geometric primitives shared by every packing strategy
//! (live ranges over logical timesteps, byte regions inside a flat
//! storage arena) and the validated problem bundle the strategies
//! consume. The strategies themselves live in `memplan-strategy`.

mod error;
mod interval;
mod problem;

pub use error::ModelError;
pub use interval::{
    intersect_area, intersect_live_range, intersect_mem_region, Intersection, LiveRange,
    MemAllocation, MemRegion,
};
pub use problem::{aligned_size, ManagedValue, OpNode, PlanInputs, ValueId, DEFAULT_ALIGNMENT};
