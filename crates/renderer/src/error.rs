//! Renderer errors. A failed GPU build call never produces a partial handle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A face referenced a position past the end of the position stream.
    #[error("face references position {index} but the mesh has {len} positions")]
    IndexOutOfBounds { index: u32, len: usize },
}
