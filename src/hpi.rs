//! Heavy Metal Pollution Index (HPI) calculation
//!
//! The HPI is a weighted mean of per-metal sub-indices. Each metal's sub-index measures how far
//! its concentration has moved from the ideal value towards the permissible limit, where 0 is
//! the ideal concentration and 100 is exactly at the limit. Weights are inversely proportional
//! to the permissible limit, so the more toxic metals dominate the index.

use crate::sample::Sample;

use serde::Serialize;
use strum_macros::Display;

/// Heavy metals that contribute to the index
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum Metal {
    /// Arsenic
    As,
    /// Iron
    Fe,
    /// Uranium
    U,
    /// Lead
    Pb,
    /// Cadmium
    Cd,
    /// Nickel
    Ni,
    /// Chromium
    Cr,
}

impl Metal {
    /// Returns the name of the dataset column holding this metal's concentration.
    pub fn column(self) -> &'static str {
        match self {
            Self::As => "As",
            Self::Fe => "Fe",
            Self::U => "U",
            Self::Pb => "Pb",
            Self::Cd => "Cd",
            Self::Ni => "Ni",
            Self::Cr => "Cr",
        }
    }
}

/// Reference concentrations for a metal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Standard {
    pub metal: Metal,
    /// Maximum permissible concentration
    pub permissible: f64,
    /// Ideal (background) concentration
    pub ideal: f64,
}

/// Reference concentrations of every metal, in the order metals are processed.
#[rustfmt::skip]
pub const STANDARDS: [Standard; 7] = [
    Standard { metal: Metal::As, permissible: 10.0, ideal: 0.01 },
    Standard { metal: Metal::Fe, permissible: 300.0, ideal: 0.0 },
    Standard { metal: Metal::U, permissible: 30.0, ideal: 0.0 },
    Standard { metal: Metal::Pb, permissible: 10.0, ideal: 0.0 },
    Standard { metal: Metal::Cd, permissible: 3.0, ideal: 0.0 },
    Standard { metal: Metal::Ni, permissible: 20.0, ideal: 0.0 },
    Standard { metal: Metal::Cr, permissible: 50.0, ideal: 0.0 },
];

/// Drinking water quality band derived from the HPI
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum Quality {
    /// HPI below 50
    Excellent,
    /// HPI from 50 up to 100
    Good,
    /// HPI from 100 up to 200
    #[serde(rename = "Slightly Polluted")]
    #[strum(serialize = "Slightly Polluted")]
    SlightlyPolluted,
    /// HPI of 200 or more
    #[serde(rename = "Unsuitable for drinking")]
    #[strum(serialize = "Unsuitable for drinking")]
    Unsuitable,
}

impl Quality {
    /// Classify an HPI value.
    pub fn from_hpi(hpi: f64) -> Self {
        if hpi < 50.0 {
            Self::Excellent
        } else if hpi < 100.0 {
            Self::Good
        } else if hpi < 200.0 {
            Self::SlightlyPolluted
        } else {
            Self::Unsuitable
        }
    }
}

/// Contribution of a single metal to the index
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalDetail {
    pub metal: Metal,
    pub concentration: f64,
    pub standard_value: f64,
    pub ideal_value: f64,
    pub sub_index: f64,
}

/// Result of an HPI calculation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hpi {
    pub hpi: f64,
    pub quality: Quality,
    /// One entry per metal with a usable concentration, in [STANDARDS] order
    pub details: Vec<MetalDetail>,
}

/// Calculate the HPI of a sample.
///
/// Metals whose concentration is missing or not a finite number are left out of both the
/// weighted sum and the total weight. A sample without any usable concentration has an HPI
/// of 0.
pub fn calculate_hpi(sample: &Sample) -> Hpi {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut details = Vec::with_capacity(STANDARDS.len());

    for standard in &STANDARDS {
        let Some(concentration) = sample
            .get(standard.metal.column())
            .and_then(parse_concentration)
        else {
            continue;
        };
        let weight = 1.0 / standard.permissible;
        let sub_index =
            (concentration - standard.ideal) / (standard.permissible - standard.ideal) * 100.0;
        weighted_sum += sub_index * weight;
        total_weight += weight;
        details.push(MetalDetail {
            metal: standard.metal,
            concentration,
            standard_value: standard.permissible,
            ideal_value: standard.ideal,
            sub_index,
        });
    }

    let hpi = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };
    Hpi {
        hpi,
        quality: Quality::from_hpi(hpi),
        details,
    }
}

fn parse_concentration(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
