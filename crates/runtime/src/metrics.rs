use std::collections::BTreeMap;

/// Counters the globe session keeps about its own behavior.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    Picks,
    PickMisses,
    TapsIgnored,
    Selections,
    Deselections,
    UnresolvedIdentifiers,
    FetchesIssued,
    FetchesApplied,
    StaleResultsDropped,
    DegenerateRings,
    ImageFallbacks,
}

impl Counter {
    pub fn name(self) -> &'static str {
        match self {
            Counter::Picks => "picks",
            Counter::PickMisses => "pick_misses",
            Counter::TapsIgnored => "taps_ignored",
            Counter::Selections => "selections",
            Counter::Deselections => "deselections",
            Counter::UnresolvedIdentifiers => "unresolved_identifiers",
            Counter::FetchesIssued => "fetches_issued",
            Counter::FetchesApplied => "fetches_applied",
            Counter::StaleResultsDropped => "stale_results_dropped",
            Counter::DegenerateRings => "degenerate_rings",
            Counter::ImageFallbacks => "image_fallbacks",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    pub count: u64,
    pub sum: u64,
    pub min: u64,
    pub max: u64,
}

impl Histogram {
    pub fn record(&mut self, value: u64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }
}

/// Session metrics with stable (sorted) snapshot order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<Counter, u64>,
    /// Number of candidate countries tested per pick.
    pick_candidates: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn inc(&mut self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&mut self, counter: Counter, by: u64) {
        *self.counters.entry(counter).or_insert(0) += by;
    }

    pub fn record_pick_candidates(&mut self, candidates: usize) {
        self.pick_candidates.record(candidates as u64);
    }

    pub fn pick_candidates(&self) -> Histogram {
        self.pick_candidates
    }

    /// Non-zero counters as `(name, value)` in declaration order.
    pub fn snapshot(&self) -> Vec<(&'static str, u64)> {
        self.counters
            .iter()
            .filter(|(_, v)| **v > 0)
            .map(|(k, v)| (k.name(), *v))
            .collect()
    }
}
