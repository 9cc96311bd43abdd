//! Binary sampling strategies

use crate::error::{Error, Result};
use crate::model::FeatureModel;
use crate::sampling::{cartesian, BinaryAssignment, BinaryStrategy};
use std::sync::Arc;
use tracing::debug;

/// Full Cartesian product `{false, true}^k` over the binary/abstract
/// features: `2^k` assignments, one per feature subset.
///
/// Exponential in the feature count; intended for small `k` only.
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

impl BinaryStrategy for AllCombinations {
    fn sample(&self) -> Result<Vec<BinaryAssignment>> {
        let model = self.model.as_deref().ok_or(Error::UnboundStrategy)?;
        let features = model.binary_features();
        debug!(strategy = self.name(), features = features.len(), "binary sampling");

        let axes: Vec<(String, Vec<bool>)> = features
            .into_iter()
            .map(|feature| (feature, vec![false, true]))
            .collect();
        Ok(cartesian(&axes))
    }

    fn name(&self) -> &'static str {
        "all-combinations"
    }
}

/// One assignment per feature, each with exactly that feature asserted,
/// repaired through [`FeatureModel::make_binary_valid`].
///
/// Consecutive duplicate assignments are collapsed; duplicates produced
/// non-adjacently by the repair survive.
#[derive(Debug, Clone, Default)]
pub struct FeatureWise {
    model: Option<Arc<FeatureModel>>,
}

impl FeatureWise {
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

impl BinaryStrategy for FeatureWise {
    fn sample(&self) -> Result<Vec<BinaryAssignment>> {
        let model = self.model.as_deref().ok_or(Error::UnboundStrategy)?;
        let features = model.binary_features();
        debug!(strategy = self.name(), features = features.len(), "binary sampling");

        let mut samples: Vec<BinaryAssignment> = Vec::with_capacity(features.len());
        for asserted in &features {
            let mut assignment: BinaryAssignment = features
                .iter()
                .map(|feature| (feature.clone(), false))
                .collect();
            assignment.insert(asserted.clone(), true);

            let repaired = model.make_binary_valid(assignment);
            if samples.last() != Some(&repaired) {
                samples.push(repaired);
            }
        }
        Ok(samples)
    }

    fn name(&self) -> &'static str {
        "feature-wise"
    }
}
