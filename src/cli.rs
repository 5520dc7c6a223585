//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// Groundwater HPI server command line interface
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "HPI_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8080, env = "HPI_PORT")]
    pub port: u16,
    /// Path to the CSV file holding the groundwater samples. New samples are appended to it.
    #[arg(long, default_value = "data/groundwater_data.csv", env = "HPI_DATA_FILE")]
    pub data_file: String,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "HPI_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/groundwater-hpi/certs/cert.pem",
        env = "HPI_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/groundwater-hpi/certs/key.pem",
        env = "HPI_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for requests to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "HPI_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
