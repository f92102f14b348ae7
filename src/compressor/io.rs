//! Fixed-size page I/O
//!
//! Raw input files are a flat sequence of fixed-size pages; each page is
//! self-describing through its readout header. Output is a plain byte
//! stream of compressed words.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::warn;

use crate::common::error::CompressorError;

/// Default raw page size in bytes
pub const DEFAULT_PAGE_SIZE: usize = 8192;

/// Reads fixed-size pages from a raw file
#[derive(Debug)]
pub struct PageReader {
    file: File,
    buf: Vec<u8>,
    pages: u64,
}

impl PageReader {
    pub fn open(path: &Path, page_size: usize) -> Result<Self, CompressorError> {
        let file = File::open(path)?;
        Ok(Self {
            file,
            buf: vec![0; page_size],
            pages: 0,
        })
    }

    /// Pages read so far
    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Read the next page, or None at end of file. A trailing fragment
    /// shorter than one page is dropped with a warning.
    pub fn next_page(&mut self) -> Result<Option<&[u8]>, CompressorError> {
        let mut filled = 0;
        while filled < self.buf.len() {
            let n = self.file.read(&mut self.buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < self.buf.len() {
            warn!(
                bytes = filled,
                page_size = self.buf.len(),
                "dropping truncated page at end of input"
            );
            return Ok(None);
        }
        self.pages += 1;
        Ok(Some(&self.buf))
    }
}

/// Buffered writer for the compressed byte stream
pub struct PageWriter {
    out: BufWriter<File>,
    bytes: u64,
}

impl PageWriter {
    pub fn create(path: &Path) -> Result<Self, CompressorError> {
        let file = File::create(path)?;
        Ok(Self {
            out: BufWriter::new(file),
            bytes: 0,
        })
    }

    /// Bytes written so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn write(&mut self, data: &[u8]) -> Result<(), CompressorError> {
        self.out.write_all(data)?;
        self.bytes += data.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), CompressorError> {
        self.out.flush()?;
        Ok(())
    }
}
