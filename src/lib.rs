//! Crate raw readout compression
//!
//! Decodes the hierarchical raw readout of one front-end crate (DRM,
//! LTM, TRM slots, TDC chains), matches leading and trailing edge
//! measurements into hits, checks structural consistency, and writes the
//! compressed crate format.

pub mod common;
pub mod compressor;
