//! Combining sampler
//!
//! Merges the raw assignments of one binary and one numeric strategy into
//! candidate configurations and keeps the ones the feature model accepts.

use crate::config::{Configuration, FeatureValue};
use crate::error::Result;
use crate::model::FeatureModel;
use crate::sampling::{BinaryAssignment, BinaryStrategy, NumericAssignment, NumericStrategy};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Combines one binary and one numeric strategy over a shared feature model
pub struct Sampler {
    model: Arc<FeatureModel>,
    binary: Box<dyn BinaryStrategy>,
    numeric: Box<dyn NumericStrategy>,
}

impl Sampler {
    /// Create a sampler over bound strategies
    #[must_use]
    pub fn new(
        model: Arc<FeatureModel>,
        binary: Box<dyn BinaryStrategy>,
        numeric: Box<dyn NumericStrategy>,
    ) -> Self {
        Self {
            model,
            binary,
            numeric,
        }
    }

    /// Produce the valid configurations
    ///
    /// When both strategy families yield candidates, every (binary, numeric)
    /// pair is merged into one assignment (the key sets are disjoint); when
    /// only one family yields candidates, that family alone is used. Each
    /// candidate survives iff the model's validity oracle accepts it. Order
    /// is preserved and the Cartesian product is not deduplicated.
    ///
    /// # Errors
    ///
    /// Propagates strategy errors ([`crate::Error::UnboundStrategy`],
    /// [`crate::Error::SamplingExhausted`]).
    pub fn sample(&self) -> Result<Vec<Configuration>> {
        info!(
            binary = self.binary.name(),
            numeric = self.numeric.name(),
            "start sampling"
        );
        let binary = self.binary.sample()?;
        let numeric = self.numeric.sample()?;

        let mut configs = Vec::new();
        match (binary.is_empty(), numeric.is_empty()) {
            (false, false) => {
                for bin in &binary {
                    for num in &numeric {
                        self.keep_if_valid(merge(bin, num), &mut configs);
                    }
                }
            }
            (false, true) => {
                for bin in &binary {
                    self.keep_if_valid(merge(bin, &NumericAssignment::new()), &mut configs);
                }
            }
            (true, false) => {
                for num in &numeric {
                    self.keep_if_valid(merge(&BinaryAssignment::new(), num), &mut configs);
                }
            }
            (true, true) => {}
        }

        info!(count = configs.len(), "sampling complete");
        Ok(configs)
    }

    fn keep_if_valid(
        &self,
        values: BTreeMap<String, FeatureValue>,
        configs: &mut Vec<Configuration>,
    ) {
        let candidate = Configuration::new(self.model.feature_table(), values);
        if self.model.is_valid(&candidate) {
            configs.push(candidate);
        }
    }
}

/// Merge a binary and a numeric assignment; the key sets do not overlap.
fn merge(bin: &BinaryAssignment, num: &NumericAssignment) -> BTreeMap<String, FeatureValue> {
    let mut values: BTreeMap<String, FeatureValue> = bin
        .iter()
        .map(|(name, on)| (name.clone(), FeatureValue::Bool(*on)))
        .collect();
    values.extend(
        num.iter()
            .map(|(name, v)| (name.clone(), FeatureValue::Numeric(*v))),
    );
    values
}
