//! Tracing-input adapter for the memory planner.
//!
//! An allocator-interception guard (external to this crate) records
//! every allocate/free of one traced graph execution. This crate pairs
//! those events by pointer token into live ranges, applies the leak
//! tolerance for graph outputs, and hands the result to the packing
//! strategies in `memplan-strategy`.

use std::collections::HashMap;

use memplan_core::{LiveRange, PlanInputs};
use memplan_strategy::{MemoryPlan, PlanError, Strategy};

/// Identifies the operator frame that produced an allocation.
///
/// Opaque to the planner: compared by equality and hashed, never
/// interpreted. Round-tripped so the graph rewriter can attach planned
/// regions back to their producing nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameNodeId {
    /// Program counter of the producing frame.
    pub pc: u64,
    /// Schema string of the producing node.
    pub node_schema: String,
    /// Header string of the producing node.
    pub node_header: String,
    /// Handle of the producing node.
    pub node: u64,
}

/// What a trace event records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Memory was handed out.
    Allocate,
    /// Memory was returned.
    Free,
}

/// One runtime allocator event captured during tracing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEvent {
    /// Logical timestep; the trace is ordered by it.
    pub time: i64,
    /// Opaque pointer token pairing allocates with frees.
    pub ptr: String,
    /// Byte size, already aligned by the tracing allocator.
    pub size: i64,
    /// Allocate or free.
    pub kind: EventKind,
    /// Producing frame; absent only for pre-execution allocations.
    pub frame: Option<FrameNodeId>,
}

impl TraceEvent {
    /// An allocation event.
    pub fn allocate(
        time: i64,
        ptr: impl Into<String>,
        size: i64,
        frame: Option<FrameNodeId>,
    ) -> Self {
        Self {
            time,
            ptr: ptr.into(),
            size,
            kind: EventKind::Allocate,
            frame,
        }
    }

    /// A free event.
    pub fn free(time: i64, ptr: impl Into<String>, size: i64) -> Self {
        Self {
            time,
            ptr: ptr.into(),
            size,
            kind: EventKind::Free,
            frame: None,
        }
    }
}

/// Errors while pairing trace events into live ranges.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// A free with no pending allocation under its pointer token.
    #[error("free at t={time} for {ptr} has no matching allocation")]
    UnmatchedFree {
        /// Pointer token of the free.
        ptr: String,
        /// When it happened.
        time: i64,
    },

    /// A free whose size disagrees with its allocation.
    #[error("free for {ptr} has size {actual}, its allocation had {expected}")]
    SizeMismatch {
        /// Pointer token of the pair.
        ptr: String,
        /// Size recorded at allocation.
        expected: i64,
        /// Size recorded at free.
        actual: i64,
    },

    /// A free that does not happen strictly after its allocation.
    #[error("free at t={free_time} for {ptr} does not follow its allocation at t={alloc_time}")]
    FreeBeforeAllocate {
        /// Pointer token of the pair.
        ptr: String,
        /// When the allocation happened.
        alloc_time: i64,
        /// When the free happened.
        free_time: i64,
    },

    /// A mid-execution allocation with no producing frame.
    #[error("allocation at t={time} for {ptr} carries no frame but is not pre-execution")]
    MissingFrame {
        /// Pointer token of the allocation.
        ptr: String,
        /// When it happened.
        time: i64,
    },

    /// A never-freed allocation whose node does not feed a graph output.
    #[error("allocation at t={time} for {ptr} was never freed and does not feed a graph output")]
    UnexplainedLeak {
        /// Pointer token of the leak.
        ptr: String,
        /// When it was allocated.
        time: i64,
    },

    /// Packing the extracted ranges failed.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The extracted ranges were rejected by the problem model.
    #[error(transparent)]
    Model(#[from] memplan_core::ModelError),
}

/// The problem extracted from a trace.
#[derive(Clone, Debug, Default)]
pub struct TracedInputs {
    /// `(live range, size)` per managed value, in pairing order.
    pub entries: Vec<(LiveRange, i64)>,
    /// The frame that produced each live range, same order.
    pub node_ranges: Vec<(LiveRange, FrameNodeId)>,
}

/// A plan computed from a trace, plus the frame pairings the graph
/// rewriter needs to attach regions back to producing nodes.
#[derive(Clone, Debug)]
pub struct TracedPlan {
    /// The planned layout.
    pub plan: MemoryPlan,
    /// `(live range, producing frame)` pairs in pairing order.
    pub node_ranges: Vec<(LiveRange, FrameNodeId)>,
}

/// Pairs a trace into live ranges.
///
/// Walks the events in order, keying pending allocations by pointer
/// token. Pre-execution allocations (time zero, no frame: weights and
/// graph inputs) are not managed and are dropped. Whatever is still
/// pending at the end leaked; a leak is tolerated only when
/// `is_graph_output` says the producing node feeds the graph outputs.
/// That test is knowingly weak -- connecting traced pointers back to
/// graph values would need out-of-band association -- but a tolerated
/// leak is merely excluded from the managed set, never planned over.
pub fn live_ranges_from_events<F>(
    events: &[TraceEvent],
    is_graph_output: F,
) -> Result<TracedInputs, TraceError>
where
    F: Fn(&FrameNodeId) -> bool,
{
    let mut pending: HashMap<&str, &TraceEvent> = HashMap::new();
    let mut traced = TracedInputs::default();

    for event in events {
        match event.kind {
            EventKind::Allocate => {
                if event.frame.is_some() {
                    pending.insert(&event.ptr, event);
                } else if event.time == 0 {
                    log::debug!("skipping pre-execution allocation {}", event.ptr);
                } else {
                    return Err(TraceError::MissingFrame {
                        ptr: event.ptr.clone(),
                        time: event.time,
                    });
                }
            }
            EventKind::Free => {
                let Some(alloc) = pending.remove(event.ptr.as_str()) else {
                    return Err(TraceError::UnmatchedFree {
                        ptr: event.ptr.clone(),
                        time: event.time,
                    });
                };
                if alloc.size != event.size {
                    return Err(TraceError::SizeMismatch {
                        ptr: event.ptr.clone(),
                        expected: alloc.size,
                        actual: event.size,
                    });
                }
                if alloc.time >= event.time {
                    return Err(TraceError::FreeBeforeAllocate {
                        ptr: event.ptr.clone(),
                        alloc_time: alloc.time,
                        free_time: event.time,
                    });
                }
                let lvr = LiveRange::new(alloc.time, event.time);
                traced.entries.push((lvr, alloc.size));
                if let Some(frame) = &alloc.frame {
                    traced.node_ranges.push((lvr, frame.clone()));
                }
            }
        }
    }

    // Residual pending entries leaked. Examine them in (time, ptr)
    // order so a failing trace always reports the same leak.
    let mut residual: Vec<&TraceEvent> = pending.into_values().collect();
    residual.sort_unstable_by(|a, b| (a.time, &a.ptr).cmp(&(b.time, &b.ptr)));
    for event in residual {
        match &event.frame {
            Some(frame) if is_graph_output(frame) => {
                log::debug!(
                    "tolerating leaked allocation {} at t={}",
                    event.ptr,
                    event.time
                );
            }
            _ => {
                return Err(TraceError::UnexplainedLeak {
                    ptr: event.ptr.clone(),
                    time: event.time,
                })
            }
        }
    }

    Ok(traced)
}

/// Plans a memory layout directly from a trace.
pub fn plan_from_events<F>(
    events: &[TraceEvent],
    is_graph_output: F,
    strategy: Strategy,
) -> Result<TracedPlan, TraceError>
where
    F: Fn(&FrameNodeId) -> bool,
{
    let traced = live_ranges_from_events(events, is_graph_output)?;
    let inputs = PlanInputs::from_live_ranges(traced.entries.iter().copied())?;
    let plan = memplan_strategy::plan(&inputs, strategy)?;
    Ok(TracedPlan {
        plan,
        node_ranges: traced.node_ranges,
    })
}

/// Groups live ranges by producing frame.
///
/// The shape the graph rewriter wants when inserting pre-allocation
/// nodes: frames ordered by `(pc, node)`, ranges within a frame in
/// start order.
pub fn collect_ranges_per_node(
    node_ranges: &[(LiveRange, FrameNodeId)],
) -> Vec<(FrameNodeId, Vec<LiveRange>)> {
    let mut grouped: HashMap<&FrameNodeId, Vec<LiveRange>> = HashMap::new();
    for (lvr, frame) in node_ranges {
        grouped.entry(frame).or_default().push(*lvr);
    }
    let mut collected: Vec<(FrameNodeId, Vec<LiveRange>)> = grouped
        .into_iter()
        .map(|(frame, mut lvrs)| {
            lvrs.sort_unstable();
            (frame.clone(), lvrs)
        })
        .collect();
    collected.sort_unstable_by_key(|(frame, _)| (frame.pc, frame.node));
    collected
}
