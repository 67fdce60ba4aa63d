//! Generated phase content keyed by phase, scoped to a context epoch.
//!
//! The epoch advances on every material context change. A request is
//! admitted at most once per phase per epoch, and a result is only stored
//! if the epoch it was built from is still current.

use std::collections::{HashMap, HashSet};

use crate::domain::{CourtPhase, ModelOutput};

/// Outcome of asking to generate a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A result already exists for the current epoch
    Cached,

    /// A request for this phase is already running in the current epoch
    InFlight,

    /// The caller must issue a request tagged with `epoch`
    Start { epoch: u64 },
}

/// Outcome of delivering a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Result written to the cache
    Stored,

    /// The context changed since the request was built; result dropped
    Stale { current_epoch: u64 },
}

/// Phase content cache
#[derive(Debug, Clone, Default)]
pub struct PhaseCache {
    results: HashMap<CourtPhase, ModelOutput>,
    in_flight: HashSet<CourtPhase>,
    epoch: u64,
}

impl PhaseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current context epoch
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn get(&self, phase: CourtPhase) -> Option<&ModelOutput> {
        self.results.get(&phase)
    }

    pub fn contains(&self, phase: CourtPhase) -> bool {
        self.results.contains_key(&phase)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether a current-epoch request for `phase` is outstanding
    pub fn is_generating(&self, phase: CourtPhase) -> bool {
        self.in_flight.contains(&phase)
    }

    /// Whether any current-epoch request is outstanding
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Admit a generation request for `phase`
    pub fn begin(&mut self, phase: CourtPhase) -> Admission {
        if self.results.contains_key(&phase) {
            return Admission::Cached;
        }
        if !self.in_flight.insert(phase) {
            return Admission::InFlight;
        }
        Admission::Start { epoch: self.epoch }
    }

    /// Deliver the result of a request built at `epoch`
    pub fn complete(&mut self, phase: CourtPhase, epoch: u64, output: ModelOutput) -> Completion {
        if epoch != self.epoch {
            // Requests of older epochs were already dropped from `in_flight`
            return Completion::Stale {
                current_epoch: self.epoch,
            };
        }
        self.in_flight.remove(&phase);
        self.results.insert(phase, output);
        Completion::Stored
    }

    /// Drop one cached result so the phase generates again
    pub fn evict(&mut self, phase: CourtPhase) -> Option<ModelOutput> {
        self.results.remove(&phase)
    }

    /// Drop everything and start a new epoch
    pub fn invalidate(&mut self) {
        self.results.clear();
        self.in_flight.clear();
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHASE: CourtPhase = CourtPhase::DisputeFocus;

    #[test]
    fn test_single_admission_per_epoch() {
        let mut cache = PhaseCache::new();

        assert_eq!(cache.begin(PHASE), Admission::Start { epoch: 0 });
        assert_eq!(cache.begin(PHASE), Admission::InFlight);
        assert!(cache.is_generating(PHASE));

        assert_eq!(cache.complete(PHASE, 0, ModelOutput::text("focus")), Completion::Stored);
        assert!(!cache.is_busy());
        assert_eq!(cache.begin(PHASE), Admission::Cached);
    }

    #[test]
    fn test_invalidate_rejects_old_results() {
        let mut cache = PhaseCache::new();
        let Admission::Start { epoch } = cache.begin(PHASE) else {
            panic!("expected a fresh admission");
        };

        cache.invalidate();
        assert!(!cache.is_generating(PHASE));

        let result = cache.complete(PHASE, epoch, ModelOutput::text("old"));
        assert_eq!(result, Completion::Stale { current_epoch: 1 });
        assert!(cache.get(PHASE).is_none());
    }

    #[test]
    fn test_stale_result_keeps_newer_request_in_flight() {
        let mut cache = PhaseCache::new();
        assert_eq!(cache.begin(PHASE), Admission::Start { epoch: 0 });
        cache.invalidate();
        assert_eq!(cache.begin(PHASE), Admission::Start { epoch: 1 });

        cache.complete(PHASE, 0, ModelOutput::text("old"));
        assert!(cache.is_generating(PHASE));

        cache.complete(PHASE, 1, ModelOutput::text("new"));
        assert_eq!(cache.get(PHASE).unwrap().display_text(), "new");
    }

    #[test]
    fn test_evict_allows_regeneration() {
        let mut cache = PhaseCache::new();
        cache.begin(PHASE);
        cache.complete(PHASE, 0, ModelOutput::text("first"));

        assert!(cache.evict(PHASE).is_some());
        assert_eq!(cache.begin(PHASE), Admission::Start { epoch: 0 });
    }
}
