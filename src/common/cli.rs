//! CLI argument parsing for the compressor binary

use std::path::PathBuf;

use clap::Parser;

use crate::compressor::io::DEFAULT_PAGE_SIZE;

/// Arguments for the raw-to-compressed converter
#[derive(Parser, Debug, Clone)]
#[command(name = "compressor", about = "Compress crate raw readout pages")]
pub struct CompressorArgs {
    /// Raw input file (fixed-size pages)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Compressed output file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Raw page size in bytes
    #[arg(long = "page-size", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Input pages carry two payload words per 128-bit link frame
    #[arg(long = "gbt-words")]
    pub gbt_words: bool,

    /// Print the check summary every N seconds while running
    #[arg(long = "report-interval")]
    pub report_interval: Option<u64>,

    /// Write the final counters as JSON to this path
    #[arg(long = "stats-json")]
    pub stats_json: Option<PathBuf>,
}
