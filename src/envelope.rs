//! Per-cell envelope cache.
//!
//! The rejection sampler needs a ceiling for the density in the cell a proposal
//! lands in. Computing it costs \(O(2^N)\) corner reads, so ceilings are memoized
//! by grid cell and only cells that are actually visited get an entry; a cache
//! never holds more than [`Grid::cell_count`](crate::grid::Grid::cell_count)
//! entries.
//!
//! Entries are keyed by the cell of the underlying grid, so one cache serves the
//! full density and every conditional slice of the same grid, whatever the fixed
//! values. It must not be reused with a different grid.

use std::collections::HashMap;

use log::trace;

use crate::density::LatticeDensity;

/// Memoized corner maxima, keyed by grid cell index.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCache {
    entries: HashMap<Vec<usize>, f64>,
    key: Vec<usize>,
    hits: u64,
    misses: u64,
}

impl EnvelopeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ceiling of `density` on its `cell`, computed on first request.
    #[inline]
    pub fn envelope<D: LatticeDensity + ?Sized>(&mut self, density: &D, cell: &[usize]) -> f64 {
        density.grid_cell(cell, &mut self.key);
        if let Some(&ceiling) = self.entries.get(self.key.as_slice()) {
            self.hits += 1;
            return ceiling;
        }
        let ceiling = density.grid_corner_max(&self.key);
        self.misses += 1;
        trace!("envelope miss: grid cell={:?} ceiling={ceiling}", self.key);
        self.entries.insert(self.key.clone(), ceiling);
        ceiling
    }

    /// Number of distinct cells cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no cell has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute a ceiling.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
