//! Sampling strategies
//!
//! Strategies generate raw candidate assignments from the feature metadata
//! of a bound model; they never filter for validity themselves. The two
//! families are independent: binary strategies assign booleans to
//! binary/abstract features, numeric strategies assign values to numeric
//! features. The [`crate::Sampler`] merges one strategy of each family and
//! filters through the model's validity oracle.

pub mod binary;
pub mod numeric;

use crate::error::Result;
use std::collections::BTreeMap;

/// Raw assignment produced by a binary strategy
pub type BinaryAssignment = BTreeMap<String, bool>;

/// Raw assignment produced by a numeric strategy
pub type NumericAssignment = BTreeMap<String, f64>;

/// Generator of raw boolean assignments over the binary/abstract features
pub trait BinaryStrategy {
    /// Produce the candidate assignments
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnboundStrategy`] when no feature model is bound.
    fn sample(&self) -> Result<Vec<BinaryAssignment>>;

    /// Strategy name, for diagnostics
    fn name(&self) -> &'static str;
}

/// Generator of raw numeric assignments over the numeric features
pub trait NumericStrategy {
    /// Produce the candidate assignments
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnboundStrategy`] when no feature model is bound;
    /// [`crate::Error::SamplingExhausted`] from bounded-retry strategies.
    fn sample(&self) -> Result<Vec<NumericAssignment>>;

    /// Strategy name, for diagnostics
    fn name(&self) -> &'static str;
}

/// Cartesian product across per-feature value axes.
///
/// The product over zero axes is a single empty assignment; an axis with no
/// values annihilates the product.
pub(crate) fn cartesian<V: Copy>(axes: &[(String, Vec<V>)]) -> Vec<BTreeMap<String, V>> {
    let mut assignments = vec![BTreeMap::new()];
    for (feature, values) in axes {
        let mut extended = Vec::with_capacity(assignments.len() * values.len());
        for partial in &assignments {
            for value in values {
                let mut assignment = partial.clone();
                assignment.insert(feature.clone(), *value);
                extended.push(assignment);
            }
        }
        assignments = extended;
    }
    assignments
}
