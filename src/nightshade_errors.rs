use thiserror::Error;

/// Errors surfaced by the `nightshade` core.
///
/// Per the crate's failure policy nothing here is fatal to a running overlay:
/// tile transport and decode errors are absorbed by the cache manager (the
/// failed slot stays blank), and the variants below are only seen by callers
/// of the fallible façade methods and the tile fetcher internals.
#[derive(Error, Debug)]
pub enum NightshadeError {
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Tile image decode error: {0}")]
    ImageDecodeError(#[from] image::ImageError),

    #[error("Eclipse dataset table is not strictly ordered by t0: {0}")]
    UnorderedDatasetTable(String),

    #[error("Invalid viewport for tile footprint: {0}")]
    InvalidViewport(String),
}
