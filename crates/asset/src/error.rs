//! Asset error taxonomy. Per-line parse problems are not errors: they are
//! skipped with a `log::warn!` diagnostic and parsing continues.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    /// Geometry or material stream unreadable or missing; fatal to the load
    /// call that touched it.
    #[error("failed to read resource {path}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An image file could not be decoded (skybox face).
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type AssetResult<T> = Result<T, AssetError>;
