//! Configuration value objects
//!
//! A `Configuration` is one concrete assignment of values to a subset of
//! features, immutable after construction. Its identity hash is a
//! deterministic fingerprint of the full assignment, used as a natural
//! deduplication key by the external persistence layer.

use crate::model::{FeatureKind, FeatureTable};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Value assigned to a feature, tagged by kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Boolean value of a binary or abstract feature
    Bool(bool),
    /// Real value of a numeric feature
    Numeric(f64),
}

impl FeatureValue {
    /// Boolean view, if boolean
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Numeric(_) => None,
        }
    }

    /// Numeric view, if numeric
    #[must_use]
    pub const fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Bool(_) => None,
            Self::Numeric(v) => Some(*v),
        }
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Numeric(v) => write!(f, "{v}"),
        }
    }
}

/// One concrete feature-value assignment
#[derive(Debug, Clone)]
pub struct Configuration {
    features: Arc<FeatureTable>,
    values: BTreeMap<String, FeatureValue>,
    identity_hash: String,
}

impl Configuration {
    /// Build a configuration from a raw assignment
    ///
    /// Only features with an explicit assignment are present in `values`.
    #[must_use]
    pub fn new(features: Arc<FeatureTable>, values: BTreeMap<String, FeatureValue>) -> Self {
        let identity_hash = identity_hash(&values);
        Self {
            features,
            values,
            identity_hash,
        }
    }

    /// The full assignment, keyed by feature name
    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, FeatureValue> {
        &self.values
    }

    /// Value of a single feature, if assigned
    #[must_use]
    pub fn value_of(&self, feature: &str) -> Option<&FeatureValue> {
        self.values.get(feature)
    }

    /// Kind of a feature per the owning model
    #[must_use]
    pub fn kind_of(&self, feature: &str) -> Option<FeatureKind> {
        self.features.kind_of(feature)
    }

    /// Deterministic fingerprint of the assignment
    ///
    /// Stable for equal assignments regardless of construction order.
    #[must_use]
    pub fn identity_hash(&self) -> &str {
        &self.identity_hash
    }

    /// Boolean-valued subset of the assignment
    #[must_use]
    pub fn binary_values(&self) -> BTreeMap<String, bool> {
        self.values
            .iter()
            .filter(|(name, _)| {
                self.features
                    .kind_of(name)
                    .is_some_and(|kind| kind.is_boolean())
            })
            .filter_map(|(name, value)| value.as_bool().map(|b| (name.clone(), b)))
            .collect()
    }

    /// Numeric-valued subset of the assignment
    #[must_use]
    pub fn numeric_values(&self) -> BTreeMap<String, f64> {
        self.values
            .iter()
            .filter(|(name, _)| self.features.kind_of(name) == Some(FeatureKind::Numeric))
            .filter_map(|(name, value)| value.as_numeric().map(|v| (name.clone(), v)))
            .collect()
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

/// SHA-256 over the assignment in lexicographic feature order, hex-encoded
/// and truncated to 16 chars (enough for a deduplication key).
fn identity_hash(values: &BTreeMap<String, FeatureValue>) -> String {
    let mut hasher = Sha256::new();
    for (name, value) in values {
        hasher.update(name.as_bytes());
        match value {
            FeatureValue::Bool(b) => hasher.update([0x01, u8::from(*b)]),
            FeatureValue::Numeric(v) => {
                hasher.update([0x02]);
                hasher.update(v.to_le_bytes());
            }
        }
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}
