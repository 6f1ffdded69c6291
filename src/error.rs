use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{}: missing required field `{field}`", path.display())]
    MissingData { path: PathBuf, field: String },

    #[error("{}: {reason}", path.display())]
    MalformedData { path: PathBuf, reason: String },

    #[error("no particles to frame: no snapshots found or every snapshot is empty")]
    EmptyDataset,

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[cfg(feature = "hdf5")]
    #[error("HDF5 error in {}: {source}", path.display())]
    Hdf5 {
        path: PathBuf,
        #[source]
        source: hdf5::Error,
    },

    #[error("image error at {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{encoder} could not encode the sequence: {reason}")]
    Encode { encoder: String, reason: String },

    #[error("invalid configuration in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }

    /// Whether the run can continue with a degraded output.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Encode { .. })
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
