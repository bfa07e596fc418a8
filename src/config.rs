//! Process-wide configuration, passed explicitly to the components that
//! need it.

use std::path::PathBuf;

/// Where the snapshot lives and which collaborators to talk to.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the persistent index snapshot.
    pub snapshot_path: PathBuf,
    /// Base URL of the external document store.
    pub store_url: String,
    /// URL of the LaTeX preprocessor endpoint.
    pub preprocessor_url: String,
}
