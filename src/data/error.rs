use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of a single data source load.
///
/// Each source is its own failure domain: an error here puts only the
/// panel fed by that source into its error state.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The resource could not be read at all.
    #[error("could not fetch {}: {source}", path.display())]
    Network {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text was read but is not a usable CSV table.
    #[error("malformed CSV in {resource}: {reason}")]
    Parse { resource: String, reason: String },

    /// Parsing succeeded but no row survived the validity filter.
    #[error("{resource} contains no usable rows")]
    EmptyDataset { resource: String },
}

impl LoadError {
    pub fn parse(resource: &str, reason: impl Into<String>) -> Self {
        LoadError::Parse {
            resource: resource.to_string(),
            reason: reason.into(),
        }
    }

    pub fn empty(resource: &str) -> Self {
        LoadError::EmptyDataset {
            resource: resource.to_string(),
        }
    }
}
