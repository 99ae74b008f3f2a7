//! Sampling sessions.
//!
//! A [`Session`] owns a validated [`Grid`] together with the envelope cache built
//! while drawing from it. The cache lives exactly as long as the session and is
//! keyed by grid cell, so full draws and conditional draws at any fixed values
//! share ceilings, and it never grows past [`Grid::cell_count`] entries.
//!
//! Sessions are single-threaded; run one per worker to draw in parallel.

use log::{debug, warn};
use rand::Rng;

use crate::conditional::{sample_conditional_with_rng, PartialPoint};
use crate::envelope::EnvelopeCache;
use crate::error::Result;
use crate::grid::Grid;
use crate::rejection::{RejectionSampler, SamplerConfig};

/// A grid plus the sampling state accumulated against it.
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    sampler: RejectionSampler,
    cache: EnvelopeCache,
}

impl Session {
    /// Session with default [`SamplerConfig`].
    pub fn new(grid: Grid) -> Self {
        Self::with_config(grid, SamplerConfig::default())
    }

    /// Session with explicit settings.
    pub fn with_config(grid: Grid, config: SamplerConfig) -> Self {
        debug!(
            "new sampling session: ndim={} shape={:?} cells={}",
            grid.ndim(),
            grid.shape(),
            grid.cell_count()
        );
        Self {
            grid,
            sampler: RejectionSampler::with_config(config),
            cache: EnvelopeCache::new(),
        }
    }

    /// The grid being sampled.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Sampler settings this session was built with.
    pub fn config(&self) -> &SamplerConfig {
        self.sampler.config()
    }

    /// Grid cells with a cached ceiling, at most [`Grid::cell_count`].
    pub fn cached_cells(&self) -> usize {
        self.cache.len()
    }

    /// Envelope cache `(hits, misses)`.
    pub fn cache_stats(&self) -> (u64, u64) {
        (self.cache.hits(), self.cache.misses())
    }

    /// Draw one point from the full joint density.
    pub fn sample_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<f64>> {
        self.sampler.sample_with_rng(&self.grid, &mut self.cache, rng)
    }

    /// Draw `count` independent points from the full joint density.
    ///
    /// # Errors
    ///
    /// The first error from [`RejectionSampler::sample_with_rng`], i.e. a draw that
    /// hit the retry cap. Every draw sees the same density, so one exhausted draw means the grid is
    /// effectively massless for this cap.
    pub fn draw_with_rng<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<f64>>> {
        let out = (0..count)
            .map(|_| self.sample_with_rng(rng))
            .collect::<Result<Vec<_>>>()?;
        self.log_batch("draw", count);
        Ok(out)
    }

    /// [`Session::draw_with_rng`] with the configured seed, or the thread RNG.
    pub fn draw(&mut self, count: usize) -> Result<Vec<Vec<f64>>> {
        let mut rng = self.sampler.config().rng();
        self.draw_with_rng(count, &mut rng)
    }

    /// Fill the free coordinates of one point.
    ///
    /// # Errors
    ///
    /// As [`sample_conditional_with_rng`]. On error `point` is unchanged and no
    /// cache entry is created.
    pub fn fill_with_rng<R: Rng + ?Sized>(
        &mut self,
        point: &mut PartialPoint,
        rng: &mut R,
    ) -> Result<()> {
        sample_conditional_with_rng(&self.grid, point, &self.sampler, &mut self.cache, rng)
    }

    /// Fill every slot in place, one outcome per slot.
    ///
    /// A failing slot is left unchanged and does not stop the others.
    pub fn draw_into_with_rng<R: Rng + ?Sized>(
        &mut self,
        slots: &mut [PartialPoint],
        rng: &mut R,
    ) -> Vec<Result<()>> {
        let outcomes: Vec<Result<()>> = slots
            .iter_mut()
            .enumerate()
            .map(|(i, slot)| {
                let outcome = self.fill_with_rng(slot, rng);
                if let Err(e) = &outcome {
                    warn!("slot {i} not filled: {e}");
                }
                outcome
            })
            .collect();
        self.log_batch("draw_into", slots.len());
        outcomes
    }

    /// [`Session::draw_into_with_rng`] with the configured seed, or the thread RNG.
    pub fn draw_into(&mut self, slots: &mut [PartialPoint]) -> Vec<Result<()>> {
        let mut rng = self.sampler.config().rng();
        self.draw_into_with_rng(slots, &mut rng)
    }

    fn log_batch(&self, what: &str, n: usize) {
        let (hits, misses) = self.cache_stats();
        debug!(
            "{what}: {n} slots, {} cells cached, {hits} hits / {misses} misses",
            self.cached_cells()
        );
    }
}
