//! Grouping of flat rows into per-object light curves.
//!
//! Column names differ between catalog releases, so identifier and coordinate
//! lookups go through ordered candidate-key lists. Each list is tried with
//! exact key matches first, then case-insensitively.

use std::collections::HashMap;

use serde_json::Value;

use crate::entities::{Annotations, Measurement, ObservedObject};
use crate::normalize::Row;

/// Candidate columns for the object identifier, in priority order.
pub const IDENTIFIER_KEYS: &[&str] = &["objectId", "objid", "id", "object id"];
/// Candidate columns for right ascension.
pub const RA_KEYS: &[&str] = &["ra", "coord_ra"];
/// Candidate columns for declination.
pub const DEC_KEYS: &[&str] = &["dec", "coord_dec"];

const TIME_KEY: &str = "mjd";
const MAGNITUDE_KEY: &str = "mag";
const MAGNITUDE_ERROR_KEY: &str = "magerr";
const FILTER_KEY: &str = "filter";

/// Resolve the first non-null value among `keys`.
#[must_use]
pub fn resolve_field<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a Value> {
    resolve_field_by(row, keys, |value| !value.is_null())
}

/// Resolve the first value among `keys` that `accept` admits.
///
/// All candidates are tried as exact keys before any case-insensitive match
/// is considered.
pub fn resolve_field_by<'a>(
    row: &'a Row,
    keys: &[&str],
    accept: impl Fn(&Value) -> bool,
) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| row.get(*key).filter(|value| accept(value)))
        .or_else(|| {
            keys.iter().find_map(|key| {
                row.iter()
                    .find(|(column, value)| column.eq_ignore_ascii_case(key) && accept(value))
                    .map(|(_, value)| value)
            })
        })
}

/// Resolve the object identifier of a row as text.
///
/// Numeric identifiers keep their exact decimal form. Empty strings do not
/// count as an identifier.
#[must_use]
pub fn resolve_identifier(row: &Row) -> Option<String> {
    let value = resolve_field_by(row, IDENTIFIER_KEYS, |value| identifier_text(value).is_some())?;
    identifier_text(value)
}

/// Identifier text of a single JSON value: trimmed strings and the exact
/// decimal form of numbers. Anything else, including `""`, is `None`.
#[must_use]
pub fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a JSON value to a finite number.
///
/// Numbers pass through, numeric strings are parsed, booleans map to 1/0, and
/// an empty string is 0. Null, missing, and unparseable values yield `None`.
#[must_use]
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    number.is_finite().then_some(number)
}

fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn measurement_from_row(row: &Row) -> Option<Measurement> {
    Some(Measurement {
        time: coerce_number(row.get(TIME_KEY))?,
        magnitude: coerce_number(row.get(MAGNITUDE_KEY))?,
        magnitude_error: coerce_number(row.get(MAGNITUDE_ERROR_KEY)),
        filter: coerce_text(row.get(FILTER_KEY)),
    })
}

/// Group rows into objects, sort each light curve by time, and keep the first
/// `limit` objects in first-seen order.
///
/// Coordinates come from the first row seen for each identifier. Rows without
/// an identifier are skipped; rows without a usable time or magnitude still
/// register their object but contribute no measurement.
#[must_use]
pub fn group_by_object(rows: &[Row], limit: usize) -> Vec<ObservedObject> {
    let mut objects: Vec<ObservedObject> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    let mut without_id = 0_usize;
    let mut without_measurement = 0_usize;

    for row in rows {
        let Some(id) = resolve_identifier(row) else {
            without_id += 1;
            continue;
        };

        let slot = *index_by_id.entry(id).or_insert_with_key(|id| {
            objects.push(ObservedObject::new(
                id.clone(),
                coerce_number(resolve_field(row, RA_KEYS)),
                coerce_number(resolve_field(row, DEC_KEYS)),
            ));
            objects.len() - 1
        });

        match measurement_from_row(row) {
            Some(measurement) => objects[slot].measurements.push(measurement),
            None => without_measurement += 1,
        }
    }

    if without_id > 0 {
        tracing::warn!(rows = without_id, "skipped rows without an object identifier");
    }
    if without_measurement > 0 {
        tracing::debug!(
            rows = without_measurement,
            "rows without numeric mjd/mag contributed no measurement"
        );
    }

    for object in &mut objects {
        object
            .measurements
            .sort_by(|a, b| a.time.total_cmp(&b.time));
    }
    objects.truncate(limit);
    objects
}

/// Carry annotations forward from `previous` onto objects with the same id.
///
/// Objects without a previous counterpart start with empty annotations.
#[must_use]
pub fn merge_annotations(
    objects: Vec<ObservedObject>,
    previous: &[ObservedObject],
) -> Vec<ObservedObject> {
    let carried: HashMap<&str, &Annotations> = previous
        .iter()
        .map(|object| (object.id.as_str(), &object.annotations))
        .collect();

    objects
        .into_iter()
        .map(|mut object| {
            object.annotations = carried
                .get(object.id.as_str())
                .map_or_else(Annotations::default, |annotations| (*annotations).clone());
            object
        })
        .collect()
}
