//! Match-wide search statistics

use rustc_hash::FxHashMap;

/// Candidate moves expanded per search depth, and time spent searching.
/// Accumulates over the whole match; reporting only.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub evaluations_per_depth: FxHashMap<u32, u64>,
    pub total_seconds: f64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` expansions at `depth`
    pub fn record(&mut self, depth: u32, count: usize) {
        *self.evaluations_per_depth.entry(depth).or_insert(0) += count as u64;
    }

    pub fn total_evaluations(&self) -> u64 {
        self.evaluations_per_depth.values().sum()
    }

    /// (depth, count) pairs, shallowest first
    pub fn by_depth(&self) -> Vec<(u32, u64)> {
        let mut entries: Vec<_> = self
            .evaluations_per_depth
            .iter()
            .map(|(&depth, &count)| (depth, count))
            .collect();
        entries.sort_unstable_by_key(|&(depth, _)| depth);
        entries
    }

    /// Thousands of evaluations per second of search, if any time was spent
    pub fn throughput_k_per_sec(&self) -> Option<f64> {
        if self.total_seconds > 0.0 {
            Some(self.total_evaluations() as f64 / self.total_seconds / 1000.0)
        } else {
            None
        }
    }
}
