//! Feature model parsing and the configuration validity oracle
//!
//! A feature model is a constraint graph over named features: implication
//! clauses (OR-groups that must hold when a feature is asserted), exclusions
//! (features that must not be asserted alongside), mandatory features, and
//! numeric ranges. The implication/exclusion graph is kept as adjacency
//! mappings keyed by feature name, not as an object graph.

use crate::config::{Configuration, FeatureValue};
use crate::error::{Error, Result};
use crate::range::NumericRange;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Kind of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Directly executable boolean feature
    Binary,
    /// Grouping feature; boolean, validated identically to binary
    Abstract,
    /// Real-valued feature constrained by a numeric range
    Numeric,
}

impl FeatureKind {
    /// True for the boolean-valued kinds (binary and abstract)
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Binary | Self::Abstract)
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Abstract => write!(f, "abstract"),
            Self::Numeric => write!(f, "numeric"),
        }
    }
}

/// Feature name to kind mapping with stable insertion order
///
/// Shared between the owning [`FeatureModel`] and every [`Configuration`]
/// built against it.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    order: Vec<String>,
    kinds: HashMap<String, FeatureKind>,
}

impl FeatureTable {
    /// Register a feature, preserving first-insertion order
    pub fn insert(&mut self, name: String, kind: FeatureKind) {
        if self.kinds.insert(name.clone(), kind).is_none() {
            self.order.push(name);
        }
    }

    /// Kind of a feature, if known
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<FeatureKind> {
        self.kinds.get(name).copied()
    }

    /// Whether the feature exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Iterate features in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, FeatureKind)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.kinds[name]))
    }

    /// Number of features
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Normalize a feature name: underscores become hyphens
pub(crate) fn normalize_name(name: &str) -> String {
    name.replace('_', "-")
}

// ============================================================
// Document schema
// ============================================================

fn default_optional() -> bool {
    true
}

/// Block carrying an optional list of textual constraint clauses
#[derive(Debug, Default, Deserialize)]
struct ConstraintBlock {
    #[serde(default)]
    options: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BinaryOption {
    name: String,
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default = "default_optional")]
    optional: bool,
    #[serde(rename = "impliedOptions", default)]
    implied_options: ConstraintBlock,
    #[serde(rename = "excludedOptions", default)]
    excluded_options: ConstraintBlock,
}

#[derive(Debug, Deserialize)]
struct NumericOption {
    name: String,
    #[serde(default = "default_optional")]
    optional: bool,
    #[serde(rename = "impliedOptions", default)]
    implied_options: ConstraintBlock,
    #[serde(rename = "excludedOptions", default)]
    excluded_options: ConstraintBlock,
    #[serde(rename = "minValue")]
    min_value: f64,
    #[serde(rename = "maxValue")]
    max_value: f64,
    #[serde(rename = "stepFunction")]
    step_function: String,
}

#[derive(Debug, Deserialize)]
struct ModelDocument {
    name: Option<String>,
    #[serde(rename = "binaryOptions", default)]
    binary_options: Vec<BinaryOption>,
    #[serde(rename = "numericOptions", default)]
    numeric_options: Vec<NumericOption>,
}

/// Step magnitude is the value following `" + "` in the step expression,
/// e.g. `"value + 2"` steps by 2.
fn parse_step(expression: &str) -> Option<f64> {
    expression.split(" + ").nth(1)?.trim().parse().ok()
}

// ============================================================
// FeatureModel
// ============================================================

/// Parsed constraint graph over named features
///
/// Read-only after construction and safe to share across concurrent
/// samplers.
#[derive(Debug, Clone)]
pub struct FeatureModel {
    name: String,
    features: Arc<FeatureTable>,
    /// Feature -> implication clauses; each clause is an OR-group of
    /// alternative feature names
    implied: HashMap<String, Vec<Vec<String>>>,
    /// Feature -> features that must not be asserted alongside it
    excluded: HashMap<String, Vec<String>>,
    /// Features that must be asserted in every valid configuration
    mandatory: Vec<String>,
    ranges: HashMap<String, NumericRange>,
}

impl FeatureModel {
    /// Parse a feature-model document from a file
    ///
    /// # Errors
    ///
    /// [`Error::ModelParse`] when the file cannot be read or the document
    /// is malformed; the offending path is reported.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        info!(path = %origin, "parsing feature model");
        let text = fs::read_to_string(path).map_err(|err| Error::ModelParse {
            path: origin.clone(),
            reason: err.to_string(),
        })?;
        Self::parse(&text, &origin)
    }

    /// Parse a feature-model document from a JSON string
    ///
    /// # Errors
    ///
    /// [`Error::ModelParse`] when the document is malformed.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        let malformed = |reason: String| Error::ModelParse {
            path: origin.to_string(),
            reason,
        };

        let doc: ModelDocument =
            serde_json::from_str(text).map_err(|err| malformed(err.to_string()))?;
        let name = doc
            .name
            .ok_or_else(|| malformed("document root carries no name attribute".to_string()))?;

        let mut features = FeatureTable::default();
        let mut implied: HashMap<String, Vec<Vec<String>>> = HashMap::new();
        let mut excluded: HashMap<String, Vec<String>> = HashMap::new();
        let mut mandatory = Vec::new();
        let mut ranges = HashMap::new();

        let mut collect_constraints =
            |feature: &str, implied_block: &ConstraintBlock, excluded_block: &ConstraintBlock| {
                for clause in &implied_block.options {
                    let alternatives: Vec<String> =
                        clause.split(" | ").map(normalize_name).collect();
                    implied
                        .entry(feature.to_string())
                        .or_default()
                        .push(alternatives);
                }
                for other in &excluded_block.options {
                    excluded
                        .entry(feature.to_string())
                        .or_default()
                        .push(normalize_name(other));
                }
            };

        for option in &doc.binary_options {
            let feature = normalize_name(&option.name);
            let kind = if option.prefix.as_deref() == Some("abstract") {
                FeatureKind::Abstract
            } else {
                FeatureKind::Binary
            };
            features.insert(feature.clone(), kind);
            collect_constraints(&feature, &option.implied_options, &option.excluded_options);
            if !option.optional {
                mandatory.push(feature);
            }
        }

        for option in &doc.numeric_options {
            let feature = normalize_name(&option.name);
            features.insert(feature.clone(), FeatureKind::Numeric);
            collect_constraints(&feature, &option.implied_options, &option.excluded_options);
            if !option.optional {
                mandatory.push(feature.clone());
            }

            let step = parse_step(&option.step_function).ok_or_else(|| {
                malformed(format!(
                    "malformed stepFunction {:?} for feature {feature}",
                    option.step_function
                ))
            })?;
            ranges.insert(
                feature,
                NumericRange::new(option.min_value, option.max_value).with_step(step),
            );
        }

        // Every name referenced by a constraint must exist in the model.
        let referenced = implied
            .values()
            .flatten()
            .flatten()
            .chain(excluded.values().flatten())
            .chain(mandatory.iter());
        for reference in referenced {
            if !features.contains(reference) {
                return Err(malformed(format!(
                    "constraint references unknown feature {reference}"
                )));
            }
        }

        info!(
            model = %name,
            features = features.len(),
            "feature model parsed"
        );

        Ok(Self {
            name,
            features: Arc::new(features),
            implied,
            excluded,
            mandatory,
            ranges,
        })
    }

    /// Model name from the document root
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared feature table, for constructing [`Configuration`]s
    #[must_use]
    pub fn feature_table(&self) -> Arc<FeatureTable> {
        Arc::clone(&self.features)
    }

    /// Numeric range of a feature, if it is numeric
    #[must_use]
    pub fn range_of(&self, feature: &str) -> Option<&NumericRange> {
        self.ranges.get(feature)
    }

    /// Names of the mandatory features
    #[must_use]
    pub fn mandatory_features(&self) -> &[String] {
        &self.mandatory
    }

    /// Binary and abstract feature names, in insertion order
    #[must_use]
    pub fn binary_features(&self) -> Vec<String> {
        self.features
            .iter()
            .filter(|(_, kind)| kind.is_boolean())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Numeric feature names, in insertion order
    #[must_use]
    pub fn numeric_features(&self) -> Vec<String> {
        self.features
            .iter()
            .filter(|(_, kind)| *kind == FeatureKind::Numeric)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Validity oracle
    ///
    /// Checks every present assignment against the feature kinds, numeric
    /// ranges, implication clauses and exclusions, then checks that every
    /// mandatory feature is satisfied. Returns a boolean signal, never an
    /// error: invalid candidates are expected, high-frequency control flow.
    #[must_use]
    pub fn is_valid(&self, config: &Configuration) -> bool {
        for (feature, value) in config.values() {
            let Some(kind) = self.features.kind_of(feature) else {
                // Feature does not exist in the model
                return false;
            };

            match kind {
                FeatureKind::Binary | FeatureKind::Abstract => {
                    let FeatureValue::Bool(asserted) = value else {
                        return false;
                    };
                    if *asserted && !self.constraints_hold(feature, config) {
                        return false;
                    }
                }
                FeatureKind::Numeric => {
                    let FeatureValue::Numeric(v) = value else {
                        return false;
                    };
                    let in_range = self
                        .ranges
                        .get(feature)
                        .is_some_and(|range| range.contains(*v));
                    if !in_range {
                        return false;
                    }
                    // Constraints are keyed off the feature being present,
                    // regardless of its value.
                    if !self.constraints_hold(feature, config) {
                        return false;
                    }
                }
            }
        }

        for feature in &self.mandatory {
            let satisfied = match self.features.kind_of(feature) {
                Some(kind) if kind.is_boolean() => {
                    matches!(config.value_of(feature), Some(FeatureValue::Bool(true)))
                }
                _ => config.value_of(feature).is_some(),
            };
            if !satisfied {
                return false;
            }
        }

        true
    }

    /// Check the implication clauses and exclusions registered for an
    /// asserted feature.
    fn constraints_hold(&self, feature: &str, config: &Configuration) -> bool {
        if let Some(clauses) = self.implied.get(feature) {
            if !clauses
                .iter()
                .all(|clause| self.clause_satisfied(clause, config))
            {
                return false;
            }
        }

        if let Some(exclusions) = self.excluded.get(feature) {
            for other in exclusions {
                let Some(value) = config.value_of(other) else {
                    continue;
                };
                match self.features.kind_of(other) {
                    Some(kind) if kind.is_boolean() => {
                        if matches!(value, FeatureValue::Bool(true)) {
                            return false;
                        }
                    }
                    // An excluded numeric feature must be absent entirely.
                    _ => return false,
                }
            }
        }

        true
    }

    /// An OR-group holds when some numeric alternative is present (its value
    /// is irrelevant) or some binary/abstract alternative is present and
    /// true.
    fn clause_satisfied(&self, clause: &[String], config: &Configuration) -> bool {
        clause
            .iter()
            .any(|alternative| match self.features.kind_of(alternative) {
                Some(FeatureKind::Numeric) => config.value_of(alternative).is_some(),
                _ => matches!(
                    config.value_of(alternative),
                    Some(FeatureValue::Bool(true))
                ),
            })
    }

    /// Best-effort repair of a binary assignment
    ///
    /// For every asserted feature, forces the first alternative of each of
    /// its implication clauses to true and each of its excluded features to
    /// false, then forces every mandatory binary/abstract feature to true.
    /// Single pass: chained implications are not resolved.
    #[must_use]
    pub fn make_binary_valid(
        &self,
        mut assignment: BTreeMap<String, bool>,
    ) -> BTreeMap<String, bool> {
        let asserted: Vec<String> = assignment
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.clone())
            .collect();

        for feature in asserted {
            if let Some(clauses) = self.implied.get(&feature) {
                for clause in clauses {
                    if let Some(first) = clause.first() {
                        assignment.insert(first.clone(), true);
                    }
                }
            }
            if let Some(exclusions) = self.excluded.get(&feature) {
                for other in exclusions {
                    assignment.insert(other.clone(), false);
                }
            }
        }

        for feature in &self.mandatory {
            if self
                .features
                .kind_of(feature)
                .is_some_and(|kind| kind.is_boolean())
            {
                assignment.insert(feature.clone(), true);
            }
        }

        assignment
    }
}
