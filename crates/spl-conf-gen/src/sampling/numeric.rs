//! Numeric sampling strategies
//!
//! All numeric strategies enumerate or draw per-feature value lists and
//! emit the Cartesian product across features. The statistical strategies
//! (`CentralNormal`, `NRandom`) are seedable for reproducibility.

use crate::error::{Error, Result};
use crate::model::FeatureModel;
use crate::sampling::{cartesian, NumericAssignment, NumericStrategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Low median of the integer sequence `min..=max`
fn median_low(min: i64, max: i64) -> i64 {
    min + (max - min) / 2
}

fn rng_from(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Enumerates every value from `min` to `max` inclusive in steps of `step`,
/// per feature; Cartesian product across features.
#[derive(Debug, Clone, Default)]
pub struct AllCombinations {
    model: Option<Arc<FeatureModel>>,
}

impl AllCombinations {
    /// Create an unbound strategy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the feature model
    #[must_use]
    pub fn bind(mut self, model: Arc<FeatureModel>) -> Self {
        self.model = Some(model);
        self
    }
}

impl NumericStrategy for AllCombinations {
    fn sample(&self) -> Result<Vec<NumericAssignment>> {
        let model = self.model.as_deref().ok_or(Error::UnboundStrategy)?;
        let features = model.numeric_features();
        debug!(strategy = self.name(), features = features.len(), "numeric sampling");

        let mut axes = Vec::with_capacity(features.len());
        for feature in features {
            let Some(range) = model.range_of(&feature) else {
                continue;
            };
            let step = (range.step.unwrap_or(1.0) as i64).max(1);
            let mut values = Vec::new();
            let mut v = range.min as i64;
            while v <= range.max as i64 {
                values.push(v as f64);
                v += step;
            }
            axes.push((feature, values));
        }
        Ok(cartesian(&axes))
    }

    fn name(&self) -> &'static str {
        "all-combinations"
    }
}

/// Three-point design per feature: `{min, max, low median}`; Cartesian
/// product across features.
#[derive(Debug, Clone, Default)]
pub struct CentralComposite {
    model: Option<Arc<FeatureModel>>,
}

impl CentralComposite {
    /// Create an unbound strategy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the feature model
    #[must_use]
    pub fn bind(mut self, model: Arc<FeatureModel>) -> Self {
        self.model = Some(model);
        self
    }
}

impl NumericStrategy for CentralComposite {
    fn sample(&self) -> Result<Vec<NumericAssignment>> {
        let model = self.model.as_deref().ok_or(Error::UnboundStrategy)?;
        let features = model.numeric_features();
        debug!(strategy = self.name(), features = features.len(), "numeric sampling");

        let mut axes = Vec::with_capacity(features.len());
        for feature in features {
            let Some(range) = model.range_of(&feature) else {
                continue;
            };
            let median = median_low(range.min as i64, range.max as i64);
            let values = vec![range.min, range.max, median as f64];
            axes.push((feature, values));
        }
        Ok(cartesian(&axes))
    }

    fn name(&self) -> &'static str {
        "central-composite"
    }
}

/// Normal draws around mean locations found by recursive low-median
/// bisection of each integer range.
///
/// The mean-location set always includes the range endpoints. Each of the
/// `n` draws per feature picks a mean uniformly at random and samples
/// `round(Normal(mean, scale))`; a draw outside the range falls back to
/// the mean location itself. The per-feature lists form a Cartesian
/// product. Features with non-integer ranges are skipped.
#[derive(Debug, Clone)]
pub struct CentralNormal {
    model: Option<Arc<FeatureModel>>,
    samples_per_feature: usize,
    num_means: Option<usize>,
    scale: Option<f64>,
    seed: Option<u64>,
}

impl CentralNormal {
    /// Create an unbound strategy drawing 3 samples per feature
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: None,
            samples_per_feature: 3,
            num_means: None,
            scale: None,
            seed: None,
        }
    }

    /// Bind the feature model
    #[must_use]
    pub fn bind(mut self, model: Arc<FeatureModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the number of draws per feature
    #[must_use]
    pub const fn with_samples(mut self, n: usize) -> Self {
        self.samples_per_feature = n;
        self
    }

    /// Set the bisection depth; defaults to `floor(log10(range length))`
    /// with a minimum of 1
    #[must_use]
    pub const fn with_means(mut self, num_means: usize) -> Self {
        self.num_means = Some(num_means);
        self
    }

    /// Set the normal scale; defaults to `2 * floor(log2(range length))`
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Seed the random source for reproducible draws
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Recursive bisection at the low median, collecting mean locations
    fn split_means(min: i64, max: i64, levels: usize, out: &mut BTreeSet<i64>) {
        if levels == 0 {
            return;
        }
        let median = median_low(min, max);
        out.insert(median);
        Self::split_means(min, median, levels - 1, out);
        Self::split_means(median, max, levels - 1, out);
    }
}

impl Default for CentralNormal {
    fn default() -> Self {
        Self::new()
    }
}

impl NumericStrategy for CentralNormal {
    fn sample(&self) -> Result<Vec<NumericAssignment>> {
        let model = self.model.as_deref().ok_or(Error::UnboundStrategy)?;
        let features = model.numeric_features();
        debug!(strategy = self.name(), features = features.len(), "numeric sampling");

        if features.is_empty() {
            return Ok(Vec::new());
        }

        let mut rng = rng_from(self.seed);
        let mut axes = Vec::with_capacity(features.len());
        for feature in features {
            let Some(range) = model.range_of(&feature) else {
                continue;
            };
            if !range.is_integer() {
                continue;
            }
            let (min, max) = (range.min as i64, range.max as i64);
            let length = range.length() as f64;

            let mut mean_locs = BTreeSet::new();
            let levels = self
                .num_means
                .unwrap_or_else(|| (length.log10().floor() as usize).max(1));
            Self::split_means(min, max, levels, &mut mean_locs);
            mean_locs.insert(min);
            mean_locs.insert(max);
            let mean_locs: Vec<i64> = mean_locs.into_iter().collect();

            let scale = self
                .scale
                .unwrap_or_else(|| 2.0 * length.log2().floor());

            let mut values = Vec::with_capacity(self.samples_per_feature);
            for _ in 0..self.samples_per_feature {
                let mean = mean_locs[rng.gen_range(0..mean_locs.len())];
                let drawn = Normal::new(mean as f64, scale)
                    .map_or(mean as f64, |normal| normal.sample(&mut rng).round());
                let value = if range.contains(drawn) {
                    drawn
                } else {
                    // Out-of-range draws fall back to the mean location
                    mean as f64
                };
                values.push(value);
            }
            axes.push((feature, values));
        }
        Ok(cartesian(&axes))
    }

    fn name(&self) -> &'static str {
        "central-normal"
    }
}

/// Uniform rejection sampling: one candidate per round drawing a uniform
/// integer per integer-range feature, adjacent duplicates collapsed, until
/// `n` candidates are collected.
///
/// Retries are bounded; exceeding the ceiling is
/// [`Error::SamplingExhausted`] rather than a non-terminating loop.
#[derive(Debug, Clone)]
pub struct NRandom {
    model: Option<Arc<FeatureModel>>,
    n: usize,
    seed: Option<u64>,
}

/// Draw ceiling per requested candidate
const RETRY_FACTOR: usize = 1_000;

impl NRandom {
    /// Create an unbound strategy collecting `n` candidates
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            model: None,
            n,
            seed: None,
        }
    }

    /// Bind the feature model
    #[must_use]
    pub fn bind(mut self, model: Arc<FeatureModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Seed the random source for reproducible draws
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl NumericStrategy for NRandom {
    fn sample(&self) -> Result<Vec<NumericAssignment>> {
        let model = self.model.as_deref().ok_or(Error::UnboundStrategy)?;
        let features = model.numeric_features();
        debug!(strategy = self.name(), features = features.len(), "numeric sampling");

        if features.is_empty() {
            return Ok(Vec::new());
        }

        let mut rng = rng_from(self.seed);
        let max_attempts = self.n.saturating_mul(RETRY_FACTOR).max(RETRY_FACTOR);
        let mut attempts = 0;
        let mut samples: Vec<NumericAssignment> = Vec::with_capacity(self.n);

        while samples.len() != self.n {
            if attempts == max_attempts {
                return Err(Error::SamplingExhausted {
                    requested: self.n,
                    collected: samples.len(),
                    attempts,
                });
            }
            attempts += 1;

            let mut assignment = NumericAssignment::new();
            for feature in &features {
                let Some(range) = model.range_of(feature) else {
                    continue;
                };
                if range.is_integer() {
                    let drawn = rng.gen_range(range.min as i64..=range.max as i64) as f64;
                    if range.contains(drawn) {
                        assignment.insert(feature.clone(), drawn);
                    }
                }
            }

            if !assignment.is_empty() && samples.last() != Some(&assignment) {
                samples.push(assignment);
            }
        }
        Ok(samples)
    }

    fn name(&self) -> &'static str {
        "n-random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(doc: &serde_json::Value) -> Arc<FeatureModel> {
        Arc::new(FeatureModel::from_json(&doc.to_string()).unwrap())
    }

    fn zero_to_ten(step: &str) -> Arc<FeatureModel> {
        model(&json!({
            "name": "demo",
            "numericOptions": [
                { "name": "n", "minValue": 0.0, "maxValue": 10.0, "stepFunction": step }
            ]
        }))
    }

    #[test]
    fn test_median_low() {
        assert_eq!(median_low(0, 10), 5);
        assert_eq!(median_low(0, 9), 4);
        assert_eq!(median_low(3, 3), 3);
    }

    #[test]
    fn test_all_combinations_enumerates_steps() {
        let samples = AllCombinations::new()
            .bind(zero_to_ten("n + 2"))
            .sample()
            .unwrap();

        let values: Vec<f64> = samples.iter().map(|s| s["n"]).collect();
        assert_eq!(values, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_all_combinations_product_across_features() {
        let m = model(&json!({
            "name": "demo",
            "numericOptions": [
                { "name": "a", "minValue": 0.0, "maxValue": 1.0, "stepFunction": "a + 1" },
                { "name": "b", "minValue": 0.0, "maxValue": 2.0, "stepFunction": "b + 1" },
            ]
        }));

        let samples = AllCombinations::new().bind(m).sample().unwrap();
        assert_eq!(samples.len(), 6);
    }

    #[test]
    fn test_central_composite_three_point_design() {
        let samples = CentralComposite::new()
            .bind(zero_to_ten("n + 2"))
            .sample()
            .unwrap();

        let values: Vec<f64> = samples.iter().map(|s| s["n"]).collect();
        // min, max, low median of 0..10
        assert_eq!(values, vec![0.0, 10.0, 5.0]);
    }

    #[test]
    fn test_central_normal_draws_stay_in_range() {
        let range_model = zero_to_ten("n + 1");
        let strategy = CentralNormal::new()
            .with_samples(16)
            .with_seed(7)
            .bind(Arc::clone(&range_model));

        let samples = strategy.sample().unwrap();
        assert_eq!(samples.len(), 16);
        let range = range_model.range_of("n").unwrap();
        for sample in &samples {
            assert!(range.contains(sample["n"]), "value {} out of range", sample["n"]);
        }
    }

    #[test]
    fn test_central_normal_zero_scale_hits_mean_locations() {
        // With scale 0 every draw lands exactly on a mean location: the
        // low-median bisection points plus the endpoints.
        let samples = CentralNormal::new()
            .with_samples(32)
            .with_means(1)
            .with_scale(0.0)
            .with_seed(11)
            .bind(zero_to_ten("n + 1"))
            .sample()
            .unwrap();

        for sample in &samples {
            assert!(
                [0.0, 5.0, 10.0].contains(&sample["n"]),
                "unexpected value {}",
                sample["n"]
            );
        }
    }

    #[test]
    fn test_central_normal_product_size() {
        let m = model(&json!({
            "name": "demo",
            "numericOptions": [
                { "name": "a", "minValue": 0.0, "maxValue": 10.0, "stepFunction": "a + 1" },
                { "name": "b", "minValue": 0.0, "maxValue": 10.0, "stepFunction": "b + 1" },
            ]
        }));

        let samples = CentralNormal::new().with_seed(3).bind(m).sample().unwrap();
        // 3 draws per feature, two features
        assert_eq!(samples.len(), 9);
    }

    #[test]
    fn test_central_normal_empty_without_numeric_features() {
        let m = model(&json!({
            "name": "demo",
            "binaryOptions": [{ "name": "a", "prefix": "binary" }]
        }));
        assert!(CentralNormal::new().bind(m).sample().unwrap().is_empty());
    }

    #[test]
    fn test_n_random_collects_n_candidates() {
        let samples = NRandom::new(5)
            .with_seed(42)
            .bind(zero_to_ten("n + 1"))
            .sample()
            .unwrap();

        assert_eq!(samples.len(), 5);
        for pair in samples.windows(2) {
            // Adjacent candidates are distinct by construction
            assert_ne!(pair[0], pair[1]);
        }
        for sample in &samples {
            let v = sample["n"];
            assert!((0.0..=10.0).contains(&v));
            assert_eq!(v.fract(), 0.0);
        }
    }

    #[test]
    fn test_n_random_exhaustion() {
        // A single-value range can never yield two distinct adjacent
        // candidates.
        let m = model(&json!({
            "name": "demo",
            "numericOptions": [
                { "name": "n", "minValue": 4.0, "maxValue": 4.0, "stepFunction": "n + 1" }
            ]
        }));

        let err = NRandom::new(3).with_seed(0).bind(m).sample().unwrap_err();
        assert!(matches!(err, Error::SamplingExhausted { collected: 1, .. }));
    }

    #[test]
    fn test_n_random_zero_requested() {
        let samples = NRandom::new(0)
            .bind(zero_to_ten("n + 1"))
            .sample()
            .unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_unbound_strategies_fail() {
        assert!(matches!(
            AllCombinations::new().sample().unwrap_err(),
            Error::UnboundStrategy
        ));
        assert!(matches!(
            CentralComposite::new().sample().unwrap_err(),
            Error::UnboundStrategy
        ));
        assert!(matches!(
            CentralNormal::new().sample().unwrap_err(),
            Error::UnboundStrategy
        ));
        assert!(matches!(
            NRandom::new(3).sample().unwrap_err(),
            Error::UnboundStrategy
        ));
    }

    #[test]
    fn test_seeded_strategies_are_reproducible() {
        let m = zero_to_ten("n + 1");
        let a = NRandom::new(4).with_seed(9).bind(Arc::clone(&m)).sample().unwrap();
        let b = NRandom::new(4).with_seed(9).bind(Arc::clone(&m)).sample().unwrap();
        assert_eq!(a, b);

        let a = CentralNormal::new().with_seed(9).bind(Arc::clone(&m)).sample().unwrap();
        let b = CentralNormal::new().with_seed(9).bind(m).sample().unwrap();
        assert_eq!(a, b);
    }
}
