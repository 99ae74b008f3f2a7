//! Rejection sampling against a cell-wise envelope.
//!
//! Each attempt proposes a point uniformly over the whole domain, looks up the
//! ceiling \(U\) of the cell it lands in, draws \(u \sim \mathrm{Uniform}[0, U)\)
//! and accepts iff \(u \le f(x)\). Since \(f \le U\) on every cell, the accepted
//! point has density proportional to \(f\). Cells whose ceiling is zero carry no
//! mass and are rejected without drawing \(u\).
//!
//! The expected number of attempts is at most
//! \(\mathrm{vol}(D) \cdot \max w / \int f\), finite for any grid with a positive
//! weight. The loop is still capped (see [`SamplerConfig::max_attempts`]) so that a
//! grid with vanishingly little mass reports [`Error::SamplingExhausted`] instead of
//! spinning forever.
//!
//! ## References
//!
//! - von Neumann (1951): *Various techniques used in connection with random digits*.
//! - Devroye (1986): *Non-Uniform Random Variate Generation*, ch. II.3.

use log::warn;
use rand::prelude::*;

use crate::density::LatticeDensity;
use crate::envelope::EnvelopeCache;
use crate::error::{Error, Result};

/// Default safety cap on proposals per accepted sample.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 10_000_000;

/// Sampler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Proposals allowed per sample before giving up.
    pub max_attempts: u64,
    /// Seed for the convenience entrypoints; `None` uses the thread RNG.
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerConfig {
    /// Default settings: [`DEFAULT_MAX_ATTEMPTS`], unseeded.
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }

    /// Set the per-sample proposal cap.
    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// RNG for the convenience entrypoints.
    pub(crate) fn rng(&self) -> Box<dyn RngCore> {
        match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        }
    }
}

/// Propose/evaluate/accept loop over any [`LatticeDensity`].
#[derive(Debug, Clone, Default)]
pub struct RejectionSampler {
    config: SamplerConfig,
}

impl RejectionSampler {
    /// Sampler with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sampler with explicit settings.
    pub fn with_config(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Current settings.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Draw one point from `density`.
    ///
    /// `cache` must only ever have been used with densities over the same grid.
    ///
    /// # Errors
    ///
    /// [`Error::SamplingExhausted`] if `max_attempts` proposals are all rejected.
    pub fn sample_with_rng<D, R>(
        &self,
        density: &D,
        cache: &mut EnvelopeCache,
        rng: &mut R,
    ) -> Result<Vec<f64>>
    where
        D: LatticeDensity + ?Sized,
        R: Rng + ?Sized,
    {
        let bounds: Vec<(f64, f64)> = (0..density.ndim()).map(|a| density.bounds(a)).collect();
        let mut point = vec![0.0; bounds.len()];

        for _ in 0..self.config.max_attempts {
            for (x, &(lo, hi)) in point.iter_mut().zip(&bounds) {
                *x = (lo + (hi - lo) * rng.random::<f64>()).min(hi);
            }

            let location = density.locate(&point)?;
            let ceiling = cache.envelope(density, &location.cell);
            if ceiling <= 0.0 {
                continue;
            }

            let u = rng.random::<f64>() * ceiling;
            let value = density.density_at(&location);
            if value > 0.0 && u <= value {
                return Ok(point);
            }
        }

        warn!(
            "rejection sampling gave up after {} proposals ({} cells cached)",
            self.config.max_attempts,
            cache.len()
        );
        Err(Error::SamplingExhausted {
            attempts: self.config.max_attempts,
        })
    }

    /// Draw one point using the configured seed, or the thread RNG.
    pub fn sample<D: LatticeDensity + ?Sized>(
        &self,
        density: &D,
        cache: &mut EnvelopeCache,
    ) -> Result<Vec<f64>> {
        let mut rng = self.config.rng();
        self.sample_with_rng(density, cache, &mut rng)
    }
}
