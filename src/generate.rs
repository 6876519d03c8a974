//! Random instance generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{FloorplanError, Result};
use crate::spec::{HardModule, ProblemInstance, SoftModule};

/// Configuration for [`generate`].
///
/// # Examples
///
/// ```
/// use u_floorplan::generate::{generate, GeneratorConfig};
///
/// let config = GeneratorConfig::for_blocks(30).with_seed(7);
/// let instance = generate(&config).unwrap();
/// assert_eq!(instance.len(), 30);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorConfig {
    /// Number of hard modules.
    pub hard: usize,
    /// Number of soft modules.
    pub soft: usize,

    /// Inclusive range of integer hard-module sides.
    pub side_range: (u32, u32),

    /// Inclusive range of integer soft-module areas.
    pub area_range: (u32, u32),

    /// Range of the lower aspect bound.
    pub min_aspect_range: (f64, f64),

    /// Range of `max_aspect / min_aspect`, at least 1.
    pub aspect_spread_range: (f64, f64),

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            hard: 15,
            soft: 15,
            side_range: (1, 10),
            area_range: (4, 100),
            min_aspect_range: (0.25, 1.0),
            aspect_spread_range: (1.0, 4.0),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// `n` modules, the first half (rounded down) hard.
    pub fn for_blocks(n: usize) -> Self {
        Self::default().with_counts(n / 2, n - n / 2)
    }

    pub fn with_counts(mut self, hard: usize, soft: usize) -> Self {
        self.hard = hard;
        self.soft = soft;
        self
    }

    pub fn with_side_range(mut self, lo: u32, hi: u32) -> Self {
        self.side_range = (lo, hi);
        self
    }

    pub fn with_area_range(mut self, lo: u32, hi: u32) -> Self {
        self.area_range = (lo, hi);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.hard + self.soft == 0 {
            return Err("at least one module must be generated".into());
        }
        let (lo, hi) = self.side_range;
        if lo == 0 || lo > hi {
            return Err(format!("side_range must satisfy 1 <= lo <= hi, got ({lo}, {hi})"));
        }
        let (lo, hi) = self.area_range;
        if lo == 0 || lo > hi {
            return Err(format!("area_range must satisfy 1 <= lo <= hi, got ({lo}, {hi})"));
        }
        let (lo, hi) = self.min_aspect_range;
        if lo <= 0.0 || lo > hi {
            return Err(format!("min_aspect_range must satisfy 0 < lo <= hi, got ({lo}, {hi})"));
        }
        let (lo, hi) = self.aspect_spread_range;
        if lo < 1.0 || lo > hi {
            return Err(format!("aspect_spread_range must satisfy 1 <= lo <= hi, got ({lo}, {hi})"));
        }
        Ok(())
    }
}

/// Draws a random instance.
///
/// Aspect bounds are rounded to two decimals so the instance prints
/// compactly in spec text.
pub fn generate(config: &GeneratorConfig) -> Result<ProblemInstance> {
    config.validate().map_err(FloorplanError::Config)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let (side_lo, side_hi) = config.side_range;
    let hard = (0..config.hard)
        .map(|_| {
            HardModule::new(
                f64::from(rng.random_range(side_lo..=side_hi)),
                f64::from(rng.random_range(side_lo..=side_hi)),
            )
        })
        .collect();

    let (area_lo, area_hi) = config.area_range;
    let soft = (0..config.soft)
        .map(|_| {
            let area = f64::from(rng.random_range(area_lo..=area_hi));
            let min_aspect = round2(sample(&mut rng, config.min_aspect_range));
            let spread = sample(&mut rng, config.aspect_spread_range);
            let max_aspect = round2(min_aspect * spread).max(min_aspect);
            SoftModule::new(area, min_aspect, max_aspect)
        })
        .collect();

    ProblemInstance::new(hard, soft)
}

fn sample(rng: &mut StdRng, (lo, hi): (f64, f64)) -> f64 {
    if lo < hi {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
