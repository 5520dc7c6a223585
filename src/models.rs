//! Request and response types of the HTTP API

use crate::hpi::{Hpi, MetalDetail, Quality};
use crate::sample::{Sample, LATITUDE, LOCATION, LONGITUDE};

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Fields that must be present in a new sample
pub const REQUIRED_FIELDS: [&str; 3] = [LOCATION, LONGITUDE, LATITUDE];

/// Response to a request for the known sampling locations
#[derive(Debug, PartialEq, Serialize)]
pub struct Locations {
    /// Distinct locations in the order they first appear in the dataset
    pub locations: Vec<String>,
}

/// HPI of the most recent sample taken at a location
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationHpi {
    pub location: String,
    /// Year of the sample as stored, or null if the dataset has no year column
    pub year: Option<String>,
    pub hpi: f64,
    pub quality: Quality,
    pub calculation_details: Vec<MetalDetail>,
    /// All fields of the sample the HPI was calculated from
    pub raw_data: Sample,
}

/// A sample together with its HPI
///
/// Serialises as the sample's fields followed by `hpi` and `quality`.
#[derive(Debug, PartialEq)]
pub struct SampleWithHpi {
    pub sample: Sample,
    pub hpi: f64,
    pub quality: Quality,
}

impl SampleWithHpi {
    pub fn new(sample: Sample, hpi: &Hpi) -> Self {
        Self {
            sample,
            hpi: hpi.hpi,
            quality: hpi.quality,
        }
    }
}

impl Serialize for SampleWithHpi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        // Computed values take precedence over columns of the same name.
        for (column, value) in self
            .sample
            .fields()
            .filter(|(column, _)| *column != "hpi" && *column != "quality")
        {
            map.serialize_entry(column, value)?;
        }
        map.serialize_entry("hpi", &self.hpi)?;
        map.serialize_entry("quality", &self.quality)?;
        map.end()
    }
}

/// Request data for adding a sample
///
/// An arbitrary JSON object mapping column names to values. Columns that the dataset does not
/// have are ignored when the sample is stored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct NewSample {
    pub fields: Map<String, Value>,
}

impl NewSample {
    /// Returns the value of a field rendered as text, or `None` if the field is absent.
    ///
    /// A field is absent when it is missing, `null`, or an empty string. Strings are returned
    /// verbatim and any other JSON value as its JSON text.
    pub fn value(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NewSample {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Validate for NewSample {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in REQUIRED_FIELDS {
            if self.value(field).is_none() {
                let mut error = ValidationError::new("required");
                error.message = Some(Cow::from(format!("{field} is required")));
                errors.add(field, error);
            }
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hpi::calculate_hpi;
    use crate::sample::YEAR;
    use crate::test_utils;

    use serde_json::json;

    fn new_sample(value: Value) -> NewSample {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_new_sample() {
        let sample = new_sample(json!({"Location": "Lake, North", "Longitude": 77.2, "Latitude": "28.6"}));
        sample.validate().unwrap();
        assert_eq!(sample.value("Longitude").as_deref(), Some("77.2"));
        assert_eq!(sample.value("Latitude").as_deref(), Some("28.6"));
    }

    #[test]
    fn test_zero_coordinates_are_present() {
        let sample = new_sample(json!({"Location": "Null Island", "Longitude": 0, "Latitude": 0}));
        sample.validate().unwrap();
        assert_eq!(sample.value("Longitude").as_deref(), Some("0"));
    }

    #[test]
    #[should_panic(expected = "Location is required")]
    fn test_missing_location() {
        let sample = new_sample(json!({"Longitude": 77.2, "Latitude": 28.6}));
        sample.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "Longitude is required")]
    fn test_empty_longitude() {
        let sample = new_sample(json!({"Location": "Well 7", "Longitude": "", "Latitude": 28.6}));
        sample.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "Latitude is required")]
    fn test_null_latitude() {
        let sample = new_sample(json!({"Location": "Well 7", "Longitude": 77.2, "Latitude": null}));
        sample.validate().unwrap()
    }

    #[test]
    fn test_all_required_fields_reported() {
        let errors = NewSample::default().validate().unwrap_err();
        let fields = errors.field_errors();
        for field in REQUIRED_FIELDS {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_value_rendering() {
        let sample = new_sample(json!({"a": true, "b": [1, 2], "c": "text", "d": 1.5e-3}));
        assert_eq!(sample.value("a").as_deref(), Some("true"));
        assert_eq!(sample.value("b").as_deref(), Some("[1,2]"));
        assert_eq!(sample.value("c").as_deref(), Some("text"));
        assert_eq!(sample.value("d").as_deref(), Some("0.0015"));
        assert_eq!(sample.value("e"), None);
    }

    #[test]
    fn test_new_sample_must_be_object() {
        assert!(serde_json::from_value::<NewSample>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_sample_with_hpi_json() {
        let sample = test_utils::sample(&[("Location", "Well 7"), ("Pb", "5"), ("quality", "x")]);
        let hpi = Hpi {
            hpi: 50.0,
            quality: Quality::Good,
            details: vec![],
        };
        let json = serde_json::to_string(&SampleWithHpi::new(sample, &hpi)).unwrap();
        assert_eq!(
            json,
            r#"{"Location":"Well 7","Pb":"5","hpi":50.0,"quality":"Good"}"#
        );
    }

    #[test]
    fn test_location_hpi_json() {
        let sample = test_utils::sample(&[("Location", "Well 7"), ("Year", "2022.0")]);
        let hpi = calculate_hpi(&sample);
        let response = LocationHpi {
            location: "Well 7".to_string(),
            year: sample.get(YEAR).map(str::to_string),
            hpi: hpi.hpi,
            quality: hpi.quality,
            calculation_details: hpi.details,
            raw_data: sample,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "location": "Well 7",
                "year": "2022.0",
                "hpi": 0.0,
                "quality": "Excellent",
                "calculationDetails": [],
                "rawData": {"Location": "Well 7", "Year": "2022.0"},
            })
        );
    }
}
