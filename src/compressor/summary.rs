//! Per-event summary store
//!
//! One live instance, cleared at the start of every event. The decoder
//! fills it while walking the raw stream; the spider and the checker
//! consume it. Raw header fields hold either the literal word read from
//! the stream or zero when that structural element was never seen, so
//! absence stays detectable downstream.

use crate::compressor::raw::{TDCS_PER_CHAIN, TRM_CHAINS, TRM_SLOTS};

/// Time frames per event (hit time is 21 bits, frames are 8192 units wide)
pub const TIME_FRAMES: usize = 256;
/// Capacity of one (chain, TDC) unpacked-hit bucket
pub const MAX_UNPACKED_HITS: usize = 256;
/// Capacity of one time-frame packed-hit bucket
pub const MAX_PACKED_HITS: usize = 256;
/// Diagnostic buffer capacity (1 DRM word + up to 10 slot words, padded)
pub const MAX_DIAGNOSTIC_WORDS: usize = 12;

/// Event summary store
#[derive(Debug)]
pub struct EventSummary {
    // Raw header copies, zero when absent
    pub drm_common_header: u32,
    pub drm_orbit_header: u32,
    pub drm_global_header: u32,
    pub drm_status_header: [u32; 5],
    pub drm_global_trailer: u32,

    // Per TRM slot (index = hardware slot id - 3)
    pub trm_global_header: [u32; TRM_SLOTS],
    pub trm_global_trailer: [u32; TRM_SLOTS],
    pub has_hits: [bool; TRM_SLOTS],

    // Per (slot, chain)
    pub trm_chain_header: [[u32; TRM_CHAINS]; TRM_SLOTS],
    pub trm_chain_trailer: [[u32; TRM_CHAINS]; TRM_SLOTS],
    pub has_errors: [[bool; TRM_CHAINS]; TRM_SLOTS],

    // Unpacked hits for the slot currently being decoded, keyed by
    // (chain, TDC id). Buckets saturate at MAX_UNPACKED_HITS.
    pub tdc_unpacked_hits: [[Vec<u32>; TDCS_PER_CHAIN]; TRM_CHAINS],

    // Packed hits per time frame, filled by the spider
    pub frame_packed_hits: [Vec<u32>; TIME_FRAMES],
    pub first_filled_frame: usize,
    pub last_filled_frame: usize,

    // Checker output
    pub fault_flags: u32,
    pub diagnostic_words: Vec<u32>,

    // Overflow accounting (saturate-and-count policy)
    pub dropped_unpacked_hits: u32,
    pub dropped_packed_hits: u32,
}

impl EventSummary {
    pub fn new() -> Self {
        Self {
            drm_common_header: 0,
            drm_orbit_header: 0,
            drm_global_header: 0,
            drm_status_header: [0; 5],
            drm_global_trailer: 0,
            trm_global_header: [0; TRM_SLOTS],
            trm_global_trailer: [0; TRM_SLOTS],
            has_hits: [false; TRM_SLOTS],
            trm_chain_header: [[0; TRM_CHAINS]; TRM_SLOTS],
            trm_chain_trailer: [[0; TRM_CHAINS]; TRM_SLOTS],
            has_errors: [[false; TRM_CHAINS]; TRM_SLOTS],
            tdc_unpacked_hits: std::array::from_fn(|_| {
                std::array::from_fn(|_| Vec::with_capacity(MAX_UNPACKED_HITS))
            }),
            frame_packed_hits: std::array::from_fn(|_| Vec::new()),
            first_filled_frame: TIME_FRAMES - 1,
            last_filled_frame: 0,
            fault_flags: 0,
            diagnostic_words: Vec::with_capacity(MAX_DIAGNOSTIC_WORDS),
            dropped_unpacked_hits: 0,
            dropped_packed_hits: 0,
        }
    }

    /// Reset for the next event. Buffer allocations are kept.
    pub fn clear(&mut self) {
        self.drm_common_header = 0;
        self.drm_orbit_header = 0;
        self.drm_global_header = 0;
        self.drm_status_header = [0; 5];
        self.drm_global_trailer = 0;
        self.trm_global_header = [0; TRM_SLOTS];
        self.trm_global_trailer = [0; TRM_SLOTS];
        self.has_hits = [false; TRM_SLOTS];
        self.trm_chain_header = [[0; TRM_CHAINS]; TRM_SLOTS];
        self.trm_chain_trailer = [[0; TRM_CHAINS]; TRM_SLOTS];
        self.has_errors = [[false; TRM_CHAINS]; TRM_SLOTS];
        for chain in &mut self.tdc_unpacked_hits {
            for bucket in chain.iter_mut() {
                bucket.clear();
            }
        }
        for frame in &mut self.frame_packed_hits {
            frame.clear();
        }
        self.first_filled_frame = TIME_FRAMES - 1;
        self.last_filled_frame = 0;
        self.fault_flags = 0;
        self.diagnostic_words.clear();
        self.dropped_unpacked_hits = 0;
        self.dropped_packed_hits = 0;
    }

    /// Record a raw TDC hit word for the current TRM block. Saturates at
    /// bucket capacity and counts the overflow instead of dropping it
    /// silently.
    #[inline]
    pub fn push_unpacked_hit(&mut self, chain: usize, tdc: usize, word: u32) {
        let bucket = &mut self.tdc_unpacked_hits[chain][tdc];
        if bucket.len() < MAX_UNPACKED_HITS {
            bucket.push(word);
        } else {
            self.dropped_unpacked_hits += 1;
        }
    }

    /// Bucket a packed hit into its time frame, tracking the filled range
    #[inline]
    pub fn push_packed_hit(&mut self, frame: usize, word: u32) {
        let bucket = &mut self.frame_packed_hits[frame];
        if bucket.len() < MAX_PACKED_HITS {
            bucket.push(word);
            if frame < self.first_filled_frame {
                self.first_filled_frame = frame;
            }
            if frame > self.last_filled_frame {
                self.last_filled_frame = frame;
            }
        } else {
            self.dropped_packed_hits += 1;
        }
    }

    /// Append a diagnostic word, saturating at the wire-format capacity
    pub fn push_diagnostic(&mut self, word: u32) {
        if self.diagnostic_words.len() < MAX_DIAGNOSTIC_WORDS {
            self.diagnostic_words.push(word);
        }
    }
}

impl Default for EventSummary {
    fn default() -> Self {
        Self::new()
    }
}
