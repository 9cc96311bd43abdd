//! Raw configuration-table hydration
//!
//! Externally supplied configurations arrive as a `;`-delimited table: a
//! header row naming features, then one row per configuration with `1`/`0`
//! (or the literal boolean token) for binary features and decimal text for
//! numeric ones. Rows are typed against a feature model and wrapped as
//! [`Configuration`]s.

use crate::config::{Configuration, FeatureValue};
use crate::error::{Error, Result};
use crate::model::{normalize_name, FeatureModel};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn parse_bool(cell: &str) -> bool {
    cell == "1" || cell.eq_ignore_ascii_case("true")
}

/// Read a configuration table, typing each cell by the model's feature kind
///
/// # Errors
///
/// [`Error::TableParse`] when the file cannot be read, a header names an
/// unknown feature, or a cell cannot be parsed.
pub fn read_configuration_table(
    model: &FeatureModel,
    path: impl AsRef<Path>,
) -> Result<Vec<Configuration>> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    info!(path = %origin, "reading configuration table");
    let malformed = |reason: String| Error::TableParse {
        path: origin.clone(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(path)
        .map_err(|err| malformed(err.to_string()))?;

    let table = model.feature_table();
    let features: Vec<String> = reader
        .headers()
        .map_err(|err| malformed(err.to_string()))?
        .iter()
        .map(normalize_name)
        .collect();
    for feature in &features {
        if !table.contains(feature) {
            return Err(malformed(format!("header names unknown feature {feature}")));
        }
    }

    let mut configs = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| malformed(err.to_string()))?;
        let mut values = BTreeMap::new();
        for (feature, cell) in features.iter().zip(record.iter()) {
            let value = match table.kind_of(feature) {
                Some(kind) if kind.is_boolean() => FeatureValue::Bool(parse_bool(cell)),
                _ => FeatureValue::Numeric(cell.parse().map_err(|_| {
                    malformed(format!("cell {cell:?} for feature {feature} is not numeric"))
                })?),
            };
            values.insert(feature.clone(), value);
        }
        configs.push(Configuration::new(Arc::clone(&table), values));
    }

    info!(count = configs.len(), "configuration table read");
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn model() -> FeatureModel {
        let doc = json!({
            "name": "demo",
            "binaryOptions": [
                { "name": "compress", "prefix": "binary" },
                { "name": "fast_mode", "prefix": "binary" },
            ],
            "numericOptions": [
                {
                    "name": "threads",
                    "minValue": 1.0,
                    "maxValue": 8.0,
                    "stepFunction": "threads + 1"
                }
            ]
        });
        FeatureModel::from_json(&doc.to_string()).unwrap()
    }

    fn write_table(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_typed_rows() {
        let table = write_table("compress;fast_mode;threads\n1;0;4\n0;1;2.5\n");
        let configs = read_configuration_table(&model(), table.path()).unwrap();

        assert_eq!(configs.len(), 2);
        assert_eq!(
            configs[0].value_of("compress"),
            Some(&FeatureValue::Bool(true))
        );
        // Header names normalize like model names
        assert_eq!(
            configs[0].value_of("fast-mode"),
            Some(&FeatureValue::Bool(false))
        );
        assert_eq!(
            configs[0].value_of("threads"),
            Some(&FeatureValue::Numeric(4.0))
        );
        assert_eq!(
            configs[1].value_of("threads"),
            Some(&FeatureValue::Numeric(2.5))
        );
    }

    #[test]
    fn test_literal_boolean_tokens() {
        let table = write_table("compress;threads\nTrue;4\n");
        let configs = read_configuration_table(&model(), table.path()).unwrap();
        assert_eq!(
            configs[0].value_of("compress"),
            Some(&FeatureValue::Bool(true))
        );
    }

    #[test]
    fn test_unknown_header_fails() {
        let table = write_table("ghost;threads\n1;4\n");
        let err = read_configuration_table(&model(), table.path()).unwrap_err();
        assert!(err.to_string().contains("unknown feature ghost"));
    }

    #[test]
    fn test_bad_numeric_cell_fails() {
        let table = write_table("threads\nmany\n");
        let err = read_configuration_table(&model(), table.path()).unwrap_err();
        assert!(err.to_string().contains("not numeric"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_configuration_table(&model(), "/nonexistent/table.csv").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/table.csv"));
    }
}
