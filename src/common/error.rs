//! Error types shared across the compressor

use thiserror::Error;

/// Top-level error for page processing and I/O
#[derive(Debug, Error)]
pub enum CompressorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("page too short for a readout header: {0} bytes")]
    ShortPage(usize),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal in-event decode failures. The event's compressed output is
/// discarded and the rest of the page is abandoned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected DRM common header, found 0x{found:08x} at byte {offset}")]
    MissingDrmCommonHeader { found: u32, offset: usize },

    #[error("expected DRM global header, found 0x{found:08x} at byte {offset}")]
    MissingDrmGlobalHeader { found: u32, offset: usize },

    #[error("page ended mid-event at byte {offset} (payload boundary {limit})")]
    UnexpectedEndOfPage { offset: usize, limit: usize },
}
