//! Readout page header (RDH)
//!
//! Every page opens with four 128-bit header words. The decoder only acts
//! on `memory_size` (the byte length of valid payload in the page); the
//! remaining fields are carried through as telemetry.

use serde::Serialize;

use crate::common::error::CompressorError;

/// RDH length in bytes (4 x 128 bits)
pub const RDH_BYTES: usize = 64;

/// Parsed page header
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Rdh {
    pub header_version: u8,
    pub header_size: u8,
    pub block_length: u16,
    pub fee_id: u16,
    pub packet_counter: u8,
    /// Byte length of valid payload in this page, counted from the start
    /// of the page. This is the decode boundary.
    pub memory_size: u16,
    pub trigger_orbit: u32,
    pub heartbeat_orbit: u32,
    pub trigger_bc: u16,
    pub heartbeat_bc: u16,
    pub trigger_type: u32,
    pub detector_field: u16,
    pub stop_bit: u8,
    pub pages_counter: u16,
}

impl Rdh {
    /// Parse the four header quartets from the start of a page
    pub fn parse(page: &[u8]) -> Result<Self, CompressorError> {
        if page.len() < RDH_BYTES {
            return Err(CompressorError::ShortPage(page.len()));
        }

        let word = |i: usize| -> u32 {
            let b = &page[4 * i..4 * i + 4];
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        };

        // Quartet 0: version/size/length, FEE id, memory size, counters
        let q0w0 = word(0);
        let q0w1 = word(1);
        let q0w2 = word(2);
        let q0w3 = word(3);
        // Quartet 1: trigger and heartbeat orbits
        let q1w0 = word(4);
        let q1w1 = word(5);
        // Quartet 2: bunch crossings and trigger type
        let q2w0 = word(8);
        let q2w1 = word(9);
        // Quartet 3: detector field, stop bit, pages counter
        let q3w0 = word(12);
        let q3w1 = word(13);

        Ok(Self {
            header_version: (q0w0 & 0xFF) as u8,
            header_size: ((q0w0 >> 8) & 0xFF) as u8,
            block_length: ((q0w0 >> 16) & 0xFFFF) as u16,
            fee_id: (q0w1 & 0xFFFF) as u16,
            packet_counter: ((q0w3 >> 8) & 0xFF) as u8,
            memory_size: ((q0w2 >> 16) & 0xFFFF) as u16,
            trigger_orbit: q1w0,
            heartbeat_orbit: q1w1,
            trigger_bc: (q2w0 & 0xFFF) as u16,
            heartbeat_bc: ((q2w0 >> 16) & 0xFFF) as u16,
            trigger_type: q2w1,
            detector_field: (q3w0 & 0xFFFF) as u16,
            stop_bit: (q3w1 & 0xFF) as u8,
            pages_counter: ((q3w1 >> 8) & 0xFFFF) as u16,
        })
    }
}
