//! Proptest strategies for the crate's value types
//!
//! Used by the property suite below and available to downstream fuzzing.

use crate::config::FeatureValue;
use crate::range::NumericRange;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Strategy for generating feature names
pub fn feature_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}(-[a-z0-9]{1,4})?"
}

/// Strategy for generating feature values of either kind
pub fn feature_value_strategy() -> impl Strategy<Value = FeatureValue> {
    prop_oneof![
        any::<bool>().prop_map(FeatureValue::Bool),
        (-1000.0f64..1000.0).prop_map(FeatureValue::Numeric),
    ]
}

/// Strategy for generating raw assignments
pub fn assignment_strategy() -> impl Strategy<Value = BTreeMap<String, FeatureValue>> {
    prop::collection::btree_map(feature_name_strategy(), feature_value_strategy(), 0..8)
}

/// Strategy for generating well-formed integer ranges (`min <= max`)
pub fn integer_range_strategy() -> impl Strategy<Value = NumericRange> {
    (-100i64..100, 0i64..50, 1i64..5).prop_map(|(min, span, step)| {
        NumericRange::new(min as f64, (min + span) as f64).with_step(step as f64)
    })
}
