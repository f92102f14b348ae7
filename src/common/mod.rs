//! Shared infrastructure: errors and CLI

pub mod cli;
pub mod error;

pub use cli::CompressorArgs;
pub use error::{CompressorError, DecodeError};
