use crate::cli::CommandLineArgs;
use crate::query::QueryService;
use crate::store::DataStore;

use expanduser::expanduser;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to each request handler.
#[derive(Debug)]
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Queries over the sample store.
    pub query: QueryService,
}

impl AppState {
    /// Create and return an [AppState], loading the sample store from the configured data file.
    pub fn new(args: &CommandLineArgs) -> Self {
        let data_file =
            expanduser(&args.data_file).unwrap_or_else(|_| PathBuf::from(&args.data_file));
        let store = DataStore::load(data_file);

        Self {
            args: args.clone(),
            query: QueryService::new(store),
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
