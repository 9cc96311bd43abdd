//! Feature-Model Configuration Engine
//!
//! Samples valid configurations of a software product line defined by a
//! feature model, for use as inputs to downstream benchmarking. The engine
//! parses a constraint-bearing feature-model document, validates arbitrary
//! configurations against it, and generates sets of valid configurations
//! via pluggable combinatorial and statistical sampling strategies.
//!
//! # Pipeline
//!
//! A feature-model document becomes a [`FeatureModel`]; a [`Sampler`]
//! combines one binary and one numeric [sampling strategy](sampling) over
//! it, merges their raw assignments into [`Configuration`]s, and keeps the
//! ones the model's validity oracle accepts. The resulting list is handed
//! to external orchestration; the engine itself executes no benchmarks and
//! persists no state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::bool_assert_comparison, clippy::float_cmp))]

pub mod config;
pub mod error;
pub mod model;
pub mod proptest_impl;
pub mod range;
pub mod sampler;
pub mod sampling;
pub mod table;

pub use config::{Configuration, FeatureValue};
pub use error::{Error, Result};
pub use model::{FeatureKind, FeatureModel, FeatureTable};
pub use range::NumericRange;
pub use sampler::Sampler;
pub use sampling::{BinaryAssignment, BinaryStrategy, NumericAssignment, NumericStrategy};
pub use table::read_configuration_table;
