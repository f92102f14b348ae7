//! Compressed output words
//!
//! Per event the compressed stream is, in order: Crate Header, Crate Orbit,
//! one { Frame Header, Packed Hit x N } group per non-empty time frame, a
//! Crate Trailer, then 0-11 Diagnostic words. All words are 32 bits; field
//! layouts are LSB-first:
//!
//! - Crate Header:  BunchID:12 | SlotEnableMask:11 | rsv:1 | DRMID:7 | MustBeOne:1
//! - Crate Orbit:   OrbitID:32
//! - Frame Header:  NumberOfHits:16 | FrameID:8 | TRMID:4 | DeltaBC:3 | MustBeZero:1
//! - Packed Hit:    TOT:11 | Time:13 | Channel:3 | TDCID:4 | Chain:1
//! - Crate Trailer: NumberOfDiagnostics:4 | EventCounter:12 | rsv:3 | MustBeOne:1
//! - Diagnostic:    SlotID:4 | FaultBits:28

// ---------------------------------------------------------------------------
// Word builders
// ---------------------------------------------------------------------------

#[inline]
pub fn crate_header_word(bunch_id: u32, slot_enable_mask: u32, drm_id: u32) -> u32 {
    0x8000_0000 | (bunch_id & 0xFFF) | (slot_enable_mask & 0x7FF) << 12 | (drm_id & 0x7F) << 24
}

#[inline]
pub fn frame_header_word(trm_slot_id: u32, frame_id: u32, n_hits: u32) -> u32 {
    (n_hits & 0xFFFF) | (frame_id & 0xFF) << 16 | (trm_slot_id & 0xF) << 24
}

#[inline]
pub fn packed_hit_word(chain: u32, tdc_id: u32, channel: u32, time: u32, tot: u32) -> u32 {
    (tot & 0x7FF) | (time & 0x1FFF) << 11 | (channel & 0x7) << 24 | (tdc_id & 0xF) << 27
        | (chain & 0x1) << 31
}

#[inline]
pub fn crate_trailer_word(n_diagnostics: u32, event_counter: u32) -> u32 {
    0x8000_0000 | (n_diagnostics & 0xF) | (event_counter & 0xFFF) << 4
}

#[inline]
pub fn diagnostic_word(slot_id: u32, fault_bits: u32) -> u32 {
    (slot_id & 0xF) | (fault_bits & 0xFFFF_FFF0)
}

// ---------------------------------------------------------------------------
// Readback accessors (monitoring and tests)
// ---------------------------------------------------------------------------

#[inline]
pub fn crate_header_bunch_id(w: u32) -> u32 {
    w & 0xFFF
}

#[inline]
pub fn crate_header_slot_enable_mask(w: u32) -> u32 {
    (w >> 12) & 0x7FF
}

#[inline]
pub fn crate_header_drm_id(w: u32) -> u32 {
    (w >> 24) & 0x7F
}

#[inline]
pub fn frame_header_n_hits(w: u32) -> u32 {
    w & 0xFFFF
}

#[inline]
pub fn frame_header_frame_id(w: u32) -> u32 {
    (w >> 16) & 0xFF
}

#[inline]
pub fn frame_header_trm_id(w: u32) -> u32 {
    (w >> 24) & 0xF
}

#[inline]
pub fn packed_hit_tot(w: u32) -> u32 {
    w & 0x7FF
}

#[inline]
pub fn packed_hit_time(w: u32) -> u32 {
    (w >> 11) & 0x1FFF
}

#[inline]
pub fn packed_hit_channel(w: u32) -> u32 {
    (w >> 24) & 0x7
}

#[inline]
pub fn packed_hit_tdc_id(w: u32) -> u32 {
    (w >> 27) & 0xF
}

#[inline]
pub fn packed_hit_chain(w: u32) -> u32 {
    (w >> 31) & 0x1
}

#[inline]
pub fn crate_trailer_n_diagnostics(w: u32) -> u32 {
    w & 0xF
}

#[inline]
pub fn crate_trailer_event_counter(w: u32) -> u32 {
    (w >> 4) & 0xFFF
}

#[inline]
pub fn diagnostic_slot_id(w: u32) -> u32 {
    w & 0xF
}

// ---------------------------------------------------------------------------
// Output cursor
// ---------------------------------------------------------------------------

/// Append-only cursor for compressed words. Pure serializer: the decoder
/// decides what to emit and when.
#[derive(Debug, Default)]
pub struct CompressedWriter {
    words: Vec<u32>,
}

impl CompressedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Drop everything emitted after `mark` (used to discard the partial
    /// output of an event that failed fatally).
    pub fn truncate(&mut self, mark: usize) {
        self.words.truncate(mark);
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    #[inline]
    pub fn push_word(&mut self, w: u32) {
        self.words.push(w);
    }

    pub fn push_crate_header(&mut self, bunch_id: u32, slot_enable_mask: u32, drm_id: u32) {
        self.words
            .push(crate_header_word(bunch_id, slot_enable_mask, drm_id));
    }

    pub fn push_crate_orbit(&mut self, orbit: u32) {
        self.words.push(orbit);
    }

    pub fn push_frame_header(&mut self, trm_slot_id: u32, frame_id: u32, n_hits: u32) {
        self.words
            .push(frame_header_word(trm_slot_id, frame_id, n_hits));
    }

    pub fn push_crate_trailer(&mut self, n_diagnostics: u32, event_counter: u32) {
        self.words
            .push(crate_trailer_word(n_diagnostics, event_counter));
    }

    /// Serialize the accumulated words into `out` as little-endian bytes
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.reserve(self.words.len() * 4);
        for w in &self.words {
            out.extend_from_slice(&w.to_le_bytes());
        }
    }
}
