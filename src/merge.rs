//! Fill-gaps merge of freshly computed defaults into caller supplied options.
//!
//! Both sides are walked as serde JSON trees, so any `Serialize + DeserializeOwned`
//! type can be merged without hand-written per-field code. A leaf counts as unset when
//! it is `null`, `false`, zero, an empty string, an empty array or an empty object.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map as JsonMap, Value as JsonValue};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Defaults only populate unset fields of the existing value.
    #[default]
    FillGaps,
    /// Set fields of the defaults replace the existing value.
    Override,
}

#[derive(Debug, Error)]
pub enum MergeShapeError {
    #[error("mismatched shape at `{path}`: existing value is {existing}, defaults value is {defaults}")]
    Mismatch {
        path: String,
        existing: &'static str,
        defaults: &'static str,
    },
    #[error("value cannot be represented for merging: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Merge `defaults` into a copy of `existing` and return the result.
pub fn merge_defaults<T>(
    existing: &T,
    defaults: &T,
    strategy: MergeStrategy,
) -> Result<T, MergeShapeError>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = serde_json::to_value(existing)?;
    let defaults = serde_json::to_value(defaults)?;
    merge_values(&mut merged, &defaults, strategy)?;
    Ok(serde_json::from_value(merged)?)
}

/// Merge `defaults` into `existing` in place. `existing` is left partially merged on error.
pub fn merge_values(
    existing: &mut JsonValue,
    defaults: &JsonValue,
    strategy: MergeStrategy,
) -> Result<(), MergeShapeError> {
    let mut path = Vec::new();
    merge_at(existing, defaults, strategy, &mut path)
}

fn merge_at(
    dst: &mut JsonValue,
    src: &JsonValue,
    strategy: MergeStrategy,
    path: &mut Vec<String>,
) -> Result<(), MergeShapeError> {
    if src.is_null() {
        return Ok(());
    }
    if dst.is_null() {
        *dst = src.clone();
        return Ok(());
    }
    match (dst, src) {
        (JsonValue::Object(dst_map), JsonValue::Object(src_map)) => {
            merge_maps(dst_map, src_map, strategy, path)
        }
        (dst, src) if type_name(dst) != type_name(src) => Err(MergeShapeError::Mismatch {
            path: display_path(path),
            existing: type_name(dst),
            defaults: type_name(src),
        }),
        (dst, src) => {
            let replace = match strategy {
                MergeStrategy::FillGaps => is_unset(dst),
                MergeStrategy::Override => !is_unset(src),
            };
            if replace {
                *dst = src.clone();
            }
            Ok(())
        }
    }
}

fn merge_maps(
    dst: &mut JsonMap<String, JsonValue>,
    src: &JsonMap<String, JsonValue>,
    strategy: MergeStrategy,
    path: &mut Vec<String>,
) -> Result<(), MergeShapeError> {
    for (key, src_value) in src {
        match dst.get_mut(key) {
            Some(dst_value) => {
                path.push(key.clone());
                let result = merge_at(dst_value, src_value, strategy, path);
                path.pop();
                result?;
            }
            None => {
                dst.insert(key.clone(), src_value.clone());
            }
        }
    }
    Ok(())
}

fn is_unset(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(value) => !value,
        JsonValue::Number(number) => number.as_f64() == Some(0.0),
        JsonValue::String(value) => value.is_empty(),
        JsonValue::Array(values) => values.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
