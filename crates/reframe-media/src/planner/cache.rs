//! Per-run memo of detection results keyed by sample time.

use std::collections::HashMap;

use reframe_models::Observation;

use crate::error::MediaResult;

/// Sample times are keyed at microsecond resolution so that a timestamp
/// recomputed through slightly different float arithmetic still hits.
const KEY_TICKS_PER_SEC: f64 = 1_000_000.0;

fn key(time: f64) -> i64 {
    (time * KEY_TICKS_PER_SEC).round() as i64
}

/// Observation cache scoped to one planning run.
///
/// The owner clears it before and after every run; it is never shared
/// between clips.
#[derive(Debug, Default)]
pub struct ObservationCache {
    entries: HashMap<i64, Observation>,
    hits: u64,
}

impl ObservationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached observation for `time`, computing and storing it on a miss.
    ///
    /// Failed computations are not stored, so a later request retries.
    pub fn get_or_compute<F>(&mut self, time: f64, compute: F) -> MediaResult<Observation>
    where
        F: FnOnce() -> MediaResult<Observation>,
    {
        let key = key(time);
        if let Some(observation) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(observation.clone());
        }

        let observation = compute()?;
        self.entries.insert(key, observation.clone());
        Ok(observation)
    }

    pub fn contains(&self, time: f64) -> bool {
        self.entries.contains_key(&key(time))
    }

    /// Lookups answered without calling the detector since the last clear.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
    }
}
