use std::path::PathBuf;

use thiserror::Error;

use crate::object::ObjectId;

/// Errors emitted while assembling, compiling or persisting manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// An I/O error while reading applied state or writing compiled manifests.
    #[error("An io error occurred while handling manifests: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization error while rendering objects or parsing applied manifests.
    #[error("An error occurred in serde when dealing with manifests: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An object without `metadata.name` was added to a chart.
    #[error("A {kind} object without a name cannot be added to chart `{chart}`")]
    MissingName { kind: &'static str, chart: String },

    /// Two objects with the same identity were added to one chart.
    #[error("The object {0} is defined more than once")]
    DuplicateObject(ObjectId),

    /// A document in a previously applied manifest file has no kind or name.
    #[error("The applied manifest {path} contains an object without kind or name")]
    InvalidAppliedManifest { path: PathBuf },
}
