//! Raw word classification and field access
//!
//! The raw readout stream is a sequence of 32-bit words tagged by their
//! most-significant nibble(s). Each hierarchy level (DRM, LTM, TRM,
//! TRM chain, TDC) has its own tag patterns:
//!
//! | Role                    | Mask       | Value      |
//! |-------------------------|------------|------------|
//! | DRM common header       | 0xF0000000 | 0x40000000 |
//! | DRM global header       | 0xF000000F | 0x40000001 |
//! | DRM global trailer      | 0xF000000F | 0x50000001 |
//! | LTM global header       | 0xF000000F | 0x40000002 |
//! | LTM global trailer      | 0xF000000F | 0x50000002 |
//! | TRM global header       | 0xF0000000 | 0x40000000 |
//! | TRM global trailer      | 0xF0000003 | 0x50000003 |
//! | TRM chain-A hdr/trailer | 0xF0000000 | 0x00000000 / 0x10000000 |
//! | TRM chain-B hdr/trailer | 0xF0000000 | 0x20000000 / 0x30000000 |
//! | TDC error               | 0xF0000000 | 0x60000000 |
//! | Filler                  | 0xFFFFFFFF | 0x70000000 |
//! | TDC hit                 | 0x80000000 | 0x80000000 |
//!
//! Some patterns overlap across levels (a DRM common header and a TRM
//! global header share the 0x4 top nibble); the decoder disambiguates by
//! stream position, never by the predicate alone.

/// Number of TRM slots handled per crate (hardware slot ids 3..=12)
pub const TRM_SLOTS: usize = 10;
/// Chains per TRM (A and B)
pub const TRM_CHAINS: usize = 2;
/// TDCs per chain
pub const TDCS_PER_CHAIN: usize = 15;
/// Lowest valid TRM hardware slot id (slots 0-2 are DRM/LTM territory)
pub const FIRST_TRM_SLOT_ID: u32 = 3;

/// PS-bits value marking a leading-edge measurement
pub const PS_LEADING: u32 = 0x1;
/// PS-bits value marking a trailing-edge measurement
pub const PS_TRAILING: u32 = 0x2;

// ---------------------------------------------------------------------------
// Classifier predicates
// ---------------------------------------------------------------------------

#[inline]
pub fn is_drm_common_header(w: u32) -> bool {
    w & 0xF000_0000 == 0x4000_0000
}

#[inline]
pub fn is_drm_global_header(w: u32) -> bool {
    w & 0xF000_000F == 0x4000_0001
}

#[inline]
pub fn is_drm_global_trailer(w: u32) -> bool {
    w & 0xF000_000F == 0x5000_0001
}

#[inline]
pub fn is_ltm_global_header(w: u32) -> bool {
    w & 0xF000_000F == 0x4000_0002
}

#[inline]
pub fn is_ltm_global_trailer(w: u32) -> bool {
    w & 0xF000_000F == 0x5000_0002
}

#[inline]
pub fn is_trm_global_header(w: u32) -> bool {
    w & 0xF000_0000 == 0x4000_0000
}

#[inline]
pub fn is_trm_global_trailer(w: u32) -> bool {
    w & 0xF000_0003 == 0x5000_0003
}

/// Chain header tag: top nibble 0x0 for chain A, 0x2 for chain B
#[inline]
pub fn is_trm_chain_header(w: u32, chain: usize) -> bool {
    w & 0xF000_0000 == (chain as u32 * 2) << 28
}

/// Chain trailer tag: top nibble 0x1 for chain A, 0x3 for chain B
#[inline]
pub fn is_trm_chain_trailer(w: u32, chain: usize) -> bool {
    w & 0xF000_0000 == (chain as u32 * 2 + 1) << 28
}

#[inline]
pub fn is_tdc_error(w: u32) -> bool {
    w & 0xF000_0000 == 0x6000_0000
}

#[inline]
pub fn is_filler(w: u32) -> bool {
    w == 0x7000_0000
}

/// Bit 31 alone splits hit words from everything else
#[inline]
pub fn is_tdc_hit(w: u32) -> bool {
    w & 0x8000_0000 == 0x8000_0000
}

// ---------------------------------------------------------------------------
// Field accessors (shift + mask, one per named field)
// ---------------------------------------------------------------------------

#[inline]
pub fn drm_global_header_drm_id(w: u32) -> u32 {
    (w >> 21) & 0x7F
}

#[inline]
pub fn drm_status1_participating_slots(w: u32) -> u32 {
    (w >> 4) & 0x7FF
}

#[inline]
pub fn drm_status1_cbit(w: u32) -> u32 {
    (w >> 15) & 0x1
}

#[inline]
pub fn drm_status2_slot_enable_mask(w: u32) -> u32 {
    (w >> 4) & 0x7FF
}

#[inline]
pub fn drm_status2_fault_id(w: u32) -> u32 {
    (w >> 16) & 0x7FF
}

#[inline]
pub fn drm_status2_rto_bit(w: u32) -> u32 {
    (w >> 27) & 0x1
}

#[inline]
pub fn drm_status3_l0_bunch_id(w: u32) -> u32 {
    (w >> 4) & 0xFFF
}

#[inline]
pub fn drm_global_trailer_event_counter(w: u32) -> u32 {
    (w >> 4) & 0xFFF
}

#[inline]
pub fn trm_global_header_slot_id(w: u32) -> u32 {
    w & 0xF
}

#[inline]
pub fn trm_global_header_event_words(w: u32) -> u32 {
    (w >> 4) & 0x1FFF
}

#[inline]
pub fn trm_global_header_event_number(w: u32) -> u32 {
    (w >> 17) & 0x3FF
}

#[inline]
pub fn trm_global_header_ebit(w: u32) -> u32 {
    (w >> 27) & 0x1
}

#[inline]
pub fn trm_chain_header_slot_id(w: u32) -> u32 {
    w & 0xF
}

#[inline]
pub fn trm_chain_header_bunch_id(w: u32) -> u32 {
    (w >> 4) & 0xFFF
}

#[inline]
pub fn trm_chain_trailer_status(w: u32) -> u32 {
    w & 0xF
}

#[inline]
pub fn trm_chain_trailer_event_counter(w: u32) -> u32 {
    (w >> 16) & 0xFFF
}

#[inline]
pub fn tdc_hit_time(w: u32) -> u32 {
    w & 0x001F_FFFF
}

#[inline]
pub fn tdc_hit_chan(w: u32) -> u32 {
    (w >> 21) & 0x7
}

#[inline]
pub fn tdc_hit_tdc_id(w: u32) -> u32 {
    (w >> 24) & 0xF
}

#[inline]
pub fn tdc_hit_ebit(w: u32) -> u32 {
    (w >> 28) & 0x1
}

#[inline]
pub fn tdc_hit_ps_bits(w: u32) -> u32 {
    (w >> 29) & 0x3
}

// ---------------------------------------------------------------------------
// Diagnostic fault bits
// ---------------------------------------------------------------------------

/// Fault-bit constants for the diagnostic words appended to the compressed
/// stream. The values match the front-end firmware bit assignment and must
/// not be reshuffled.
pub mod diagnostic {
    pub const DRM_HEADER: u32 = 0x8000_0000;
    pub const DRM_TRAILER: u32 = 0x4000_0000;
    pub const DRM_CRC: u32 = 0x2000_0000;
    pub const DRM_ENABLEMASK: u32 = 0x0800_0000;
    pub const DRM_CBIT: u32 = 0x0400_0000;
    pub const DRM_FAULTID: u32 = 0x0200_0000;
    pub const DRM_RTOBIT: u32 = 0x0100_0000;

    pub const TRM_HEADER: u32 = 0x8000_0000;
    pub const TRM_TRAILER: u32 = 0x4000_0000;
    pub const TRM_CRC: u32 = 0x2000_0000;
    // Shares the CRC bit offset in the firmware assignment.
    pub const TRM_UNEXPECTED: u32 = 0x2000_0000;
    pub const TRM_EVENTCOUNTER: u32 = 0x0800_0000;
    pub const TRM_EBIT: u32 = 0x0600_0000;
    pub const TRM_LBIT: u32 = 0x0200_0000;

    /// Per-chain bits occupy an 8-bit window shifted per chain so both
    /// chains coexist in one slot diagnostic word.
    #[inline]
    pub const fn trm_chain_header(chain: usize) -> u32 {
        0x0008_0000 << (8 * chain)
    }

    #[inline]
    pub const fn trm_chain_trailer(chain: usize) -> u32 {
        0x0004_0000 << (8 * chain)
    }

    #[inline]
    pub const fn trm_chain_status(chain: usize) -> u32 {
        0x0002_0000 << (8 * chain)
    }

    #[inline]
    pub const fn trm_chain_event_counter(chain: usize) -> u32 {
        0x0000_8000 << (8 * chain)
    }

    #[inline]
    pub const fn trm_chain_tdc_errors(chain: usize) -> u32 {
        0x0000_4000 << (8 * chain)
    }

    #[inline]
    pub const fn trm_chain_bunch_id(chain: usize) -> u32 {
        0x0000_2000 << (8 * chain)
    }
}
