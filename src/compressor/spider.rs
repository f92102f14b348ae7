//! Hit matching and packing
//!
//! Walks the unpacked-hit buckets of one TRM block, pairs each
//! leading-edge measurement with the first trailing-edge measurement on
//! the same channel that follows it in readout order, and emits packed
//! hit words bucketed by time frame. A leading edge with no matching
//! trailing edge is kept with a zero time-over-threshold. Trailing edges
//! are never consumed: a second leading edge on the same channel may pair
//! with the same trailing edge again, preserving the ambiguity present in
//! the raw stream.

use crate::compressor::compressed::packed_hit_word;
use crate::compressor::raw::{
    tdc_hit_chan, tdc_hit_ps_bits, tdc_hit_time, PS_LEADING, PS_TRAILING, TDCS_PER_CHAIN,
    TRM_CHAINS,
};
use crate::compressor::summary::EventSummary;

/// Hit time units per time frame (time >> 13)
const FRAME_SHIFT: u32 = 13;

/// Match and pack the unpacked hits accumulated for the current TRM
/// block, then clear the buckets for the next block.
pub fn spider(summary: &mut EventSummary) {
    for chain in 0..TRM_CHAINS {
        for tdc in 0..TDCS_PER_CHAIN {
            pack_bucket(summary, chain, tdc);
            summary.tdc_unpacked_hits[chain][tdc].clear();
        }
    }
}

fn pack_bucket(summary: &mut EventSummary, chain: usize, tdc: usize) {
    let n = summary.tdc_unpacked_hits[chain][tdc].len();
    for i in 0..n {
        let lead = summary.tdc_unpacked_hits[chain][tdc][i];
        if tdc_hit_ps_bits(lead) != PS_LEADING {
            continue;
        }
        let chan = tdc_hit_chan(lead);
        let time = tdc_hit_time(lead);

        // First trailing edge on the same channel after this leading edge
        let mut tot = 0u32;
        for j in i + 1..n {
            let trail = summary.tdc_unpacked_hits[chain][tdc][j];
            if tdc_hit_ps_bits(trail) == PS_TRAILING && tdc_hit_chan(trail) == chan {
                tot = tdc_hit_time(trail).wrapping_sub(time);
                break;
            }
        }

        let frame = (time >> FRAME_SHIFT) as usize;
        let word = packed_hit_word(chain as u32, tdc as u32, chan, time, tot);
        summary.push_packed_hit(frame, word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::compressed::{
        packed_hit_chain, packed_hit_channel, packed_hit_time, packed_hit_tot,
    };

    fn hit(time: u32, chan: u32, ps: u32) -> u32 {
        0x8000_0000 | (time & 0x1F_FFFF) | (chan & 0x7) << 21 | (ps & 0x3) << 29
    }

    #[test]
    fn test_leading_trailing_pair() {
        let mut s = EventSummary::new();
        s.push_unpacked_hit(0, 2, hit(100, 3, PS_LEADING));
        s.push_unpacked_hit(0, 2, hit(150, 3, PS_TRAILING));
        spider(&mut s);

        assert_eq!(s.frame_packed_hits[0].len(), 1);
        let w = s.frame_packed_hits[0][0];
        assert_eq!(packed_hit_time(w), 100);
        assert_eq!(packed_hit_tot(w), 50);
        assert_eq!(packed_hit_channel(w), 3);
        assert_eq!(packed_hit_chain(w), 0);
        assert_eq!(s.first_filled_frame, 0);
        assert_eq!(s.last_filled_frame, 0);
    }

    #[test]
    fn test_unmatched_leading_keeps_zero_tot() {
        let mut s = EventSummary::new();
        s.push_unpacked_hit(1, 5, hit(8000, 6, PS_LEADING));
        spider(&mut s);

        assert_eq!(s.frame_packed_hits[0].len(), 1);
        assert_eq!(packed_hit_tot(s.frame_packed_hits[0][0]), 0);
        assert_eq!(packed_hit_chain(s.frame_packed_hits[0][0]), 1);
    }

    #[test]
    fn test_trailing_on_other_channel_skipped() {
        let mut s = EventSummary::new();
        s.push_unpacked_hit(0, 0, hit(100, 1, PS_LEADING));
        s.push_unpacked_hit(0, 0, hit(120, 2, PS_TRAILING));
        s.push_unpacked_hit(0, 0, hit(140, 1, PS_TRAILING));
        spider(&mut s);

        assert_eq!(packed_hit_tot(s.frame_packed_hits[0][0]), 40);
    }

    #[test]
    fn test_trailing_not_consumed() {
        // Two leading edges on the same channel both pair with the one
        // trailing edge that follows them.
        let mut s = EventSummary::new();
        s.push_unpacked_hit(0, 0, hit(100, 4, PS_LEADING));
        s.push_unpacked_hit(0, 0, hit(110, 4, PS_LEADING));
        s.push_unpacked_hit(0, 0, hit(130, 4, PS_TRAILING));
        spider(&mut s);

        let frame0 = &s.frame_packed_hits[0];
        assert_eq!(frame0.len(), 2);
        assert_eq!(packed_hit_tot(frame0[0]), 30);
        assert_eq!(packed_hit_tot(frame0[1]), 20);
    }

    #[test]
    fn test_frame_boundary() {
        let mut s = EventSummary::new();
        s.push_unpacked_hit(0, 0, hit(8191, 0, PS_LEADING));
        s.push_unpacked_hit(0, 1, hit(8192, 0, PS_LEADING));
        spider(&mut s);

        assert_eq!(s.frame_packed_hits[0].len(), 1);
        assert_eq!(s.frame_packed_hits[1].len(), 1);
        assert_eq!(s.first_filled_frame, 0);
        assert_eq!(s.last_filled_frame, 1);
    }

    #[test]
    fn test_buckets_cleared_after_packing() {
        let mut s = EventSummary::new();
        s.push_unpacked_hit(1, 14, hit(5, 0, PS_LEADING));
        spider(&mut s);
        assert!(s.tdc_unpacked_hits[1][14].is_empty());
    }
}
