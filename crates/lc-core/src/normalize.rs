//! Response normalization.
//!
//! TAP services and the wrappers around them return result tables in several
//! JSON layouts. [`normalize`] turns any of them into flat rows keyed by
//! column name and reports which layout it recognized.
//!
//! Detection order, first match wins:
//!
//! ```text
//! [ {...}, ... ]                   -> Bare
//! { "result": [ {...} ] }          -> ResultWrapper
//! { "data": [ {...} ] }            -> DataWrapper   (only without "fields")
//! { "rows": [ {...} ] }            -> RowsWrapper
//! { "fields": [{name}], "data": [[...]] } -> Columnar
//! anything else                    -> Unrecognized (no rows)
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One result row: column name to value.
pub type Row = Map<String, Value>;

/// The response layout a payload was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    Bare,
    ResultWrapper,
    DataWrapper,
    RowsWrapper,
    Columnar,
    Unrecognized,
}

impl ResponseShape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::ResultWrapper => "result_wrapper",
            Self::DataWrapper => "data_wrapper",
            Self::RowsWrapper => "rows_wrapper",
            Self::Columnar => "columnar",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows extracted from a response together with the detected layout.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRows {
    pub shape: ResponseShape,
    pub rows: Vec<Row>,
}

impl NormalizedRows {
    const fn unrecognized() -> Self {
        Self {
            shape: ResponseShape::Unrecognized,
            rows: Vec::new(),
        }
    }
}

/// Normalize an arbitrary JSON payload into flat rows.
///
/// An unrecognized payload yields no rows and [`ResponseShape::Unrecognized`]
/// so callers can tell it apart from a valid empty result.
#[must_use]
pub fn normalize(value: &Value) -> NormalizedRows {
    let normalized = match value {
        Value::Array(items) => NormalizedRows {
            shape: ResponseShape::Bare,
            rows: object_rows(items),
        },
        Value::Object(map) => normalize_wrapper(map),
        _ => NormalizedRows::unrecognized(),
    };

    if normalized.shape == ResponseShape::Unrecognized {
        tracing::warn!(
            kind = json_kind(value),
            "unrecognized response shape; treating as empty result"
        );
    } else {
        tracing::debug!(shape = %normalized.shape, rows = normalized.rows.len(), "normalized response");
    }
    normalized
}

fn normalize_wrapper(map: &Map<String, Value>) -> NormalizedRows {
    let array = |key: &str| map.get(key).and_then(Value::as_array);

    if let Some(items) = array("result") {
        return NormalizedRows {
            shape: ResponseShape::ResultWrapper,
            rows: object_rows(items),
        };
    }
    let fields = array("fields");
    if fields.is_none()
        && let Some(items) = array("data")
    {
        return NormalizedRows {
            shape: ResponseShape::DataWrapper,
            rows: object_rows(items),
        };
    }
    if let Some(items) = array("rows") {
        return NormalizedRows {
            shape: ResponseShape::RowsWrapper,
            rows: object_rows(items),
        };
    }
    if let (Some(fields), Some(data)) = (fields, array("data")) {
        return NormalizedRows {
            shape: ResponseShape::Columnar,
            rows: zip_columnar(fields, data),
        };
    }
    NormalizedRows::unrecognized()
}

/// Keep the object entries of a row array; anything else is not a row.
fn object_rows(items: &[Value]) -> Vec<Row> {
    let rows: Vec<Row> = items.iter().filter_map(Value::as_object).cloned().collect();
    let dropped = items.len() - rows.len();
    if dropped > 0 {
        tracing::debug!(dropped, "ignored non-object entries in row array");
    }
    rows
}

/// Zip positional rows against field descriptors.
///
/// A field without a string `name` is named by its column position. Short
/// rows simply lack the trailing columns; extra values are ignored.
fn zip_columnar(fields: &[Value], data: &[Value]) -> Vec<Row> {
    let names: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            field
                .get("name")
                .and_then(Value::as_str)
                .map_or_else(|| i.to_string(), str::to_string)
        })
        .collect();

    data.iter()
        .filter_map(Value::as_array)
        .map(|values| {
            names
                .iter()
                .zip(values)
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        })
        .collect()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
