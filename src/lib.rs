//! This crate provides a groundwater quality server. It serves heavy-metal contamination samples
//! from a CSV file and computes the Heavy Metal Pollution Index (HPI) of each sample, which
//! summarises the concentrations of arsenic, iron, uranium, lead, cadmium, nickel and chromium
//! relative to their permissible limits for drinking water.
//!
//! Samples are held in memory for the lifetime of the process. New samples may be added through
//! the API; these are appended to the CSV file before they become visible to queries.
//!
//! The server is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of JSON request and response data.
//! * [csv] reads and writes the backing data file.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod error;
pub mod hpi;
pub mod metrics;
pub mod models;
pub mod query;
pub mod sample;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod validated_json;
