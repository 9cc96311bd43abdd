//! Example: Sampling valid configurations
//!
//! This example parses a small feature model and samples valid
//! configurations with a feature-wise binary strategy and a central
//! composite numeric strategy.
//!
//! Run with: `cargo run --example sample_configurations -p spl-conf-gen`

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use serde_json::json;
use spl_conf_gen::sampling::{binary, numeric};
use spl_conf_gen::{FeatureModel, Sampler};
use std::sync::Arc;

fn main() {
    let document = json!({
        "name": "encoder",
        "binaryOptions": [
            { "name": "root", "prefix": "abstract", "optional": false },
            {
                "name": "two_pass",
                "prefix": "binary",
                "excludedOptions": { "options": ["realtime"] }
            },
            { "name": "realtime", "prefix": "binary" },
        ],
        "numericOptions": [
            {
                "name": "threads",
                "minValue": 1.0,
                "maxValue": 16.0,
                "stepFunction": "threads + 1"
            }
        ]
    });

    let model = Arc::new(FeatureModel::from_json(&document.to_string()).unwrap());
    println!("Feature model: {}", model.name());
    println!("  binary features:  {:?}", model.binary_features());
    println!("  numeric features: {:?}", model.numeric_features());
    println!();

    let sampler = Sampler::new(
        Arc::clone(&model),
        Box::new(binary::FeatureWise::new().bind(Arc::clone(&model))),
        Box::new(numeric::CentralComposite::new().bind(Arc::clone(&model))),
    );

    let configs = sampler.sample().unwrap();
    println!("Sampled {} valid configurations:", configs.len());

    for config in &configs {
        println!(
            "  {}  binary={:?}  numeric={:?}",
            config.identity_hash(),
            config.binary_values(),
            config.numeric_values()
        );
    }
}
