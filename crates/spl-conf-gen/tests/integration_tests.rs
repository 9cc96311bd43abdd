//! Integration tests for spl-conf-gen
//!
//! Tests the full pipeline from feature-model document through sampling to
//! the final list of valid configurations.

use serde_json::json;
use spl_conf_gen::sampling::{binary, numeric};
use spl_conf_gen::{
    read_configuration_table, Error, FeatureModel, FeatureValue, Sampler,
};
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

fn compression_model() -> Arc<FeatureModel> {
    let doc = json!({
        "name": "compressor",
        "binaryOptions": [
            { "name": "root", "prefix": "abstract", "optional": false },
            {
                "name": "fast_mode",
                "prefix": "binary",
                "excludedOptions": { "options": ["best_mode"] }
            },
            {
                "name": "best_mode",
                "prefix": "binary",
                "excludedOptions": { "options": ["fast_mode"] }
            },
        ],
        "numericOptions": [
            {
                "name": "level",
                "minValue": 1.0,
                "maxValue": 9.0,
                "stepFunction": "level + 4"
            }
        ]
    });
    Arc::new(FeatureModel::from_json(&doc.to_string()).unwrap())
}

/// Full pipeline: all-combinations over both families, filtered through the
/// validity oracle.
#[test]
fn test_sampling_pipeline_filters_invalid_products() {
    let model = compression_model();
    let sampler = Sampler::new(
        Arc::clone(&model),
        Box::new(binary::AllCombinations::new().bind(Arc::clone(&model))),
        Box::new(numeric::AllCombinations::new().bind(Arc::clone(&model))),
    );

    let configs = sampler.sample().unwrap();

    // 2^3 binary candidates x 3 level values (1, 5, 9), minus the ones
    // where root is off (mandatory) or both modes are on (mutual
    // exclusion): 3 surviving binary vectors x 3 levels.
    assert_eq!(configs.len(), 9);
    for config in &configs {
        assert_eq!(config.value_of("root"), Some(&FeatureValue::Bool(true)));
        let fast = config.value_of("fast-mode").and_then(FeatureValue::as_bool);
        let best = config.value_of("best-mode").and_then(FeatureValue::as_bool);
        assert!(!(fast == Some(true) && best == Some(true)));
        assert!(config.value_of("level").is_some());
    }

    // Identity hashes are distinct across distinct assignments
    let hashes: BTreeSet<&str> = configs.iter().map(|c| c.identity_hash()).collect();
    assert_eq!(hashes.len(), configs.len());
}

/// Feature-wise binary sampling with a statistical numeric strategy stays
/// inside the model's ranges and constraints.
#[test]
fn test_feature_wise_with_central_normal() {
    let model = compression_model();
    let sampler = Sampler::new(
        Arc::clone(&model),
        Box::new(binary::FeatureWise::new().bind(Arc::clone(&model))),
        Box::new(
            numeric::CentralNormal::new()
                .with_seed(17)
                .bind(Arc::clone(&model)),
        ),
    );

    let configs = sampler.sample().unwrap();
    assert!(!configs.is_empty());

    let range = *model.range_of("level").unwrap();
    for config in &configs {
        let level = config
            .value_of("level")
            .and_then(FeatureValue::as_numeric)
            .unwrap();
        assert!(range.contains(level));
        assert_eq!(config.value_of("root"), Some(&FeatureValue::Bool(true)));
    }
}

/// Externally supplied configurations hydrate from a `;`-delimited table
/// and validate like sampled ones.
#[test]
fn test_configuration_table_round_trip() {
    let model = compression_model();

    let mut table = tempfile::NamedTempFile::new().unwrap();
    write!(
        table,
        "root;fast_mode;best_mode;level\n1;1;0;5\n1;0;0;9\n1;1;1;5\n"
    )
    .unwrap();

    let configs = read_configuration_table(&model, table.path()).unwrap();
    assert_eq!(configs.len(), 3);

    assert!(model.is_valid(&configs[0]));
    assert!(model.is_valid(&configs[1]));
    // Both modes asserted violates the mutual exclusion
    assert!(!model.is_valid(&configs[2]));

    // Equal assignments from different sources share an identity hash
    let resampled = read_configuration_table(&model, table.path()).unwrap();
    assert_eq!(configs[0].identity_hash(), resampled[0].identity_hash());
}

/// Rejection sampling reports exhaustion instead of looping forever.
#[test]
fn test_n_random_exhaustion_surfaces_from_sampler() {
    let doc = json!({
        "name": "tiny",
        "numericOptions": [
            { "name": "n", "minValue": 2.0, "maxValue": 2.0, "stepFunction": "n + 1" }
        ]
    });
    let model = Arc::new(FeatureModel::from_json(&doc.to_string()).unwrap());

    let sampler = Sampler::new(
        Arc::clone(&model),
        Box::new(binary::AllCombinations::new().bind(Arc::clone(&model))),
        Box::new(numeric::NRandom::new(4).with_seed(1).bind(Arc::clone(&model))),
    );

    let err = sampler.sample().unwrap_err();
    assert!(matches!(err, Error::SamplingExhausted { requested: 4, .. }));
}
