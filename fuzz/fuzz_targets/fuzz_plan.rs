#![no_main]

use libfuzzer_sys::fuzz_target;
use memplan_core::{LiveRange, PlanInputs};
use memplan_strategy::{plan, validate, Strategy};

// Decode the input as 12-byte (begin, length, size) records and assert
// that every strategy either rejects the bundle or produces a plan the
// validator accepts. The planner should never panic on any input.
fuzz_target!(|data: &[u8]| {
    let mut entries = Vec::new();
    for chunk in data.chunks_exact(12) {
        let begin = u32::from_le_bytes(chunk[0..4].try_into().unwrap()) as i64;
        let length = u32::from_le_bytes(chunk[4..8].try_into().unwrap()) as i64;
        let size = u32::from_le_bytes(chunk[8..12].try_into().unwrap()) as i64;
        entries.push((LiveRange::new(begin, begin + length), size.max(1)));
    }

    let Ok(inputs) = PlanInputs::from_live_ranges(entries) else {
        return;
    };
    for strategy in [
        Strategy::Naive,
        Strategy::LinearScan,
        Strategy::GreedyBySize,
        Strategy::GreedyBySizeWithFirstGap,
        Strategy::GreedyByLongestAndSize,
    ] {
        if let Ok(plan) = plan(&inputs, strategy) {
            assert!(validate(&plan.allocations));
        }
    }
});
