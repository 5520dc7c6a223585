use crate::cli::CommandLineArgs;
use crate::sample::{Sample, Schema};

use clap::Parser;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// A small data file with two locations, one of them sampled in two different years.
pub(crate) const TEST_CSV: &str = "\
Location,Longitude,Latitude,Year,As,Fe,U,Pb,Cd,Ni,Cr
Well 7,77.2,28.6,2020,6.004,180,18,6,1.8,12,30
\"Lake, North\",77.3,28.7,2021,0.01,0,0,0,0,0,0
Well 7,77.2,28.6,2022,14.995,450,45,15,4.5,30,75";

/// Create a Sample with its own schema from `(column, value)` pairs.
pub(crate) fn sample(fields: &[(&str, &str)]) -> Sample {
    let schema = Schema::new(fields.iter().map(|(k, _)| k.to_string()).collect());
    Sample::new(
        Arc::new(schema),
        fields.iter().map(|(_, v)| v.to_string()).collect(),
    )
}

/// Write `contents` to a new temporary data file.
pub(crate) fn data_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Command line arguments pointing at the given data file, with defaults for everything else.
pub(crate) fn args(data_file: &Path) -> CommandLineArgs {
    CommandLineArgs::parse_from([
        "groundwater-hpi",
        "--data-file",
        data_file.to_str().unwrap(),
    ])
}
