use memplan_core::LiveRange;
use memplan_strategy::Strategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Strategies that plan from bare `(range, size)` bundles; breadth
/// needs operator context and is exercised separately.
#[allow(dead_code)]
pub const FLAT_STRATEGIES: [Strategy; 5] = [
    Strategy::Naive,
    Strategy::LinearScan,
    Strategy::GreedyBySize,
    Strategy::GreedyBySizeWithFirstGap,
    Strategy::GreedyByLongestAndSize,
];

/// A deterministic pseudo-random workload of `n` values over `steps`
/// timesteps, with 64-byte-aligned sizes up to `max_units * 64`.
#[allow(dead_code)]
pub fn random_workload(seed: u64, n: usize, steps: i64, max_units: i64) -> Vec<(LiveRange, i64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let begin = rng.gen_range(0..steps);
            let end = rng.gen_range(begin..steps);
            let size = rng.gen_range(1..=max_units) * 64;
            (LiveRange::new(begin, end), size)
        })
        .collect()
}
