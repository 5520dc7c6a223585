//! Queries over the sample store

use crate::error::HpiError;
use crate::hpi::calculate_hpi;
use crate::models::{LocationHpi, NewSample, SampleWithHpi};
use crate::sample::{Sample, YEAR};
use crate::store::DataStore;

use hashbrown::HashSet;
use std::cmp::Reverse;
use tracing::info;
use validator::Validate;

/// Read and append operations over a [DataStore], which the service owns.
#[derive(Debug)]
pub struct QueryService {
    store: DataStore,
}

impl QueryService {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Returns the distinct sampling locations, in the order they first appear.
    pub fn unique_locations(&self) -> Vec<String> {
        let dataset = self.store.snapshot();
        let mut seen = HashSet::new();
        dataset
            .samples()
            .iter()
            .filter_map(Sample::location)
            .filter(|location| seen.insert(*location))
            .map(str::to_string)
            .collect()
    }

    /// Calculate the HPI of the latest sample taken at a location.
    ///
    /// The latest sample is the one with the greatest integer year. Among samples with the same
    /// year the earliest in the dataset wins, and samples without an integer year are only used
    /// if no other sample exists.
    ///
    /// # Arguments
    ///
    /// * `location`: Exact value of the location column
    pub fn hpi_for_location(&self, location: &str) -> Result<LocationHpi, HpiError> {
        let dataset = self.store.snapshot();
        let latest = dataset
            .samples()
            .iter()
            .filter(|sample| sample.location() == Some(location))
            // min_by_key keeps the first of several equal elements.
            .min_by_key(|sample| Reverse(sample.year()))
            .ok_or_else(|| HpiError::LocationNotFound {
                location: location.to_string(),
            })?;

        let hpi = calculate_hpi(latest);
        Ok(LocationHpi {
            location: location.to_string(),
            year: latest.get(YEAR).map(str::to_string),
            hpi: hpi.hpi,
            quality: hpi.quality,
            calculation_details: hpi.details,
            raw_data: latest.clone(),
        })
    }

    /// Returns every sample with its HPI, in dataset order.
    pub fn all_samples_with_hpi(&self) -> Vec<SampleWithHpi> {
        self.store
            .snapshot()
            .samples()
            .iter()
            .map(|sample| SampleWithHpi::new(sample.clone(), &calculate_hpi(sample)))
            .collect()
    }

    /// Validate and store a new sample.
    ///
    /// Returns the stored sample with its HPI.
    ///
    /// # Arguments
    ///
    /// * `input`: Field values of the new sample. `Location`, `Longitude` and `Latitude` are
    ///   required.
    pub async fn append_sample(&self, input: &NewSample) -> Result<SampleWithHpi, HpiError> {
        input.validate()?;
        let sample = self.store.append(input).await?;
        let hpi = calculate_hpi(&sample);
        info!(
            location = sample.location().unwrap_or_default(),
            hpi = hpi.hpi,
            quality = %hpi.quality,
            "added sample"
        );
        Ok(SampleWithHpi::new(sample, &hpi))
    }
}
