//! Entity structs for Lightcurve Explorer.
//!
//! Serialized keys follow the column names the catalog returns (`objectId`,
//! `mjd`, `mag`, `magerr`) so a persisted collection reads the same as the
//! rows it was built from.
//!
//! Reading is lenient where older slots differ: `objectId` may be a JSON
//! number, and measurements whose `mjd` or `mag` was stored as `null` (a NaN
//! on the way in) are dropped instead of failing the whole collection.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::CoreError;
use crate::group::identifier_text;

/// A single brightness sample of one object.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Measurement {
    /// Modified Julian date of the exposure.
    #[serde(rename = "mjd")]
    pub time: f64,
    #[serde(rename = "mag")]
    pub magnitude: f64,
    #[serde(rename = "magerr", default)]
    pub magnitude_error: Option<f64>,
    #[serde(default)]
    pub filter: Option<String>,
}

/// Free-text annotations a user attaches to an object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Annotations {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub note: String,
}

impl Annotations {
    /// Merge the fields present in `update`, leaving the others untouched.
    pub fn apply(&mut self, update: AnnotationUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(note) = update.note {
            self.note = note;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.category.is_empty() && self.note.is_empty()
    }
}

/// Partial annotation edit. `None` fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnnotationUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
}

impl AnnotationUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.note.is_none()
    }
}

/// One celestial source with its light curve.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ObservedObject {
    #[serde(rename = "objectId", deserialize_with = "deserialize_identifier")]
    #[schemars(with = "String")]
    pub id: String,
    /// First-seen right ascension in degrees.
    #[serde(default)]
    pub ra: Option<f64>,
    /// First-seen declination in degrees.
    #[serde(default)]
    pub dec: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_measurements")]
    #[schemars(with = "Vec<Measurement>")]
    pub measurements: Vec<Measurement>,
    #[serde(default)]
    pub annotations: Annotations,
    /// Captured chart image as a data URL.
    #[serde(rename = "png", default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

fn deserialize_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    identifier_text(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("objectId must be a string or number, got {value}"))
    })
}

/// Stored measurement with every field optional.
#[derive(Deserialize)]
struct StoredMeasurement {
    #[serde(default)]
    mjd: Option<f64>,
    #[serde(default)]
    mag: Option<f64>,
    #[serde(default)]
    magerr: Option<f64>,
    #[serde(default)]
    filter: Option<String>,
}

fn deserialize_measurements<'de, D>(deserializer: D) -> Result<Vec<Measurement>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Option::<Vec<StoredMeasurement>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(stored
        .into_iter()
        .filter_map(|point| {
            Some(Measurement {
                time: point.mjd?,
                magnitude: point.mag?,
                magnitude_error: point.magerr,
                filter: point.filter,
            })
        })
        .collect())
}

impl ObservedObject {
    #[must_use]
    pub fn new(id: impl Into<String>, ra: Option<f64>, dec: Option<f64>) -> Self {
        Self {
            id: id.into(),
            ra,
            dec,
            measurements: Vec::new(),
            annotations: Annotations::default(),
            snapshot: None,
        }
    }

    /// Label shown in listings: the annotated name if set, else the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.annotations.name.is_empty() {
            &self.id
        } else {
            &self.annotations.name
        }
    }
}

/// Region query input. Transient, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct QueryParameters {
    pub ra: f64,
    pub dec: f64,
    pub radius_deg: f64,
    pub object_limit: u32,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            ra: 150.0,
            dec: 2.0,
            radius_deg: 0.2,
            object_limit: 20,
        }
    }
}

impl QueryParameters {
    /// Reject values that cannot be templated into a meaningful cone search.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for non-finite coordinates, a
    /// declination outside ±90°, a non-positive radius, or a zero limit.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.ra.is_finite() || !self.dec.is_finite() || !self.radius_deg.is_finite() {
            return Err(CoreError::Validation(
                "coordinates and radius must be finite numbers".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.dec) {
            return Err(CoreError::Validation(format!(
                "declination {} outside [-90, 90]",
                self.dec
            )));
        }
        if self.radius_deg <= 0.0 {
            return Err(CoreError::Validation(format!(
                "radius must be positive, got {}",
                self.radius_deg
            )));
        }
        if self.object_limit == 0 {
            return Err(CoreError::Validation("object limit must be at least 1".into()));
        }
        Ok(())
    }
}
