//! Event consistency checker
//!
//! Runs once per decoded event, after all hits are packed. Validates the
//! structural invariants of the summary (headers present, counters in
//! agreement, status clean), accumulates the per-element counters, sets
//! the crate fault bitmap, and fills the diagnostic word buffer that goes
//! out after the crate trailer.
//!
//! Diagnostic word 0 always carries the DRM verdict, even for a clean
//! event, so downstream consumers can tell "checked and clean" apart from
//! "not checked". Slot words follow only for slots that have something to
//! report.
//!
//! Returns true when the event is faulty.

use crate::compressor::raw::{self, diagnostic};
use crate::compressor::stats::Stats;
use crate::compressor::summary::EventSummary;

/// Slot id carried in diagnostic word 0 (the DRM occupies slot 1)
const DRM_DIAGNOSTIC_SLOT_ID: u32 = 1;

/// Crate fault bitmap: bit 0 is the DRM, then three bits per TRM slot
/// (slot, chain A, chain B).
#[inline]
fn trm_fault_bit(slot: usize) -> u32 {
    1 << (1 + slot * 3)
}

#[inline]
fn chain_fault_bit(slot: usize, chain: usize) -> u32 {
    trm_fault_bit(slot) << (chain + 1)
}

pub fn check(summary: &mut EventSummary, stats: &mut Stats) -> bool {
    stats.events += 1;

    let mut fault = false;
    let mut drm_word = DRM_DIAGNOSTIC_SLOT_ID;

    // Missing DRM envelope is fatal: nothing below can be trusted.
    if summary.drm_global_header == 0 {
        drm_word |= diagnostic::DRM_HEADER;
        summary.fault_flags |= 0x1;
        summary.push_diagnostic(drm_word);
        return true;
    }
    if summary.drm_global_trailer == 0 {
        drm_word |= diagnostic::DRM_TRAILER;
        summary.fault_flags |= 0x1;
        summary.push_diagnostic(drm_word);
        return true;
    }
    stats.drm.headers += 1;

    let participating = raw::drm_status1_participating_slots(summary.drm_status_header[0]);
    let enable_mask = raw::drm_status2_slot_enable_mask(summary.drm_status_header[1]);
    let l0_bunch_id = raw::drm_status3_l0_bunch_id(summary.drm_status_header[2]);
    let local_event_counter = raw::drm_global_trailer_event_counter(summary.drm_global_trailer);

    // A mismatched enable mask is reported but is not a fault by itself.
    if enable_mask != participating {
        drm_word |= diagnostic::DRM_ENABLEMASK;
    }
    if raw::drm_status1_cbit(summary.drm_status_header[0]) != 0 {
        drm_word |= diagnostic::DRM_CBIT;
        summary.fault_flags |= 0x1;
        stats.drm.cbit += 1;
        fault = true;
    }
    if raw::drm_status2_fault_id(summary.drm_status_header[1]) != 0 {
        drm_word |= diagnostic::DRM_FAULTID;
        summary.fault_flags |= 0x1;
        stats.drm.fault += 1;
        fault = true;
    }
    if raw::drm_status2_rto_bit(summary.drm_status_header[1]) != 0 {
        drm_word |= diagnostic::DRM_RTOBIT;
        summary.fault_flags |= 0x1;
        stats.drm.rto_bit += 1;
        fault = true;
    }
    summary.push_diagnostic(drm_word);

    for slot in 0..raw::TRM_SLOTS {
        let slot_id = slot as u32 + raw::FIRST_TRM_SLOT_ID;
        let mut slot_word = slot_id;

        // Participation mask bit 0 is the LTM slot, TRMs start at bit 1
        'slot: {
            if participating & 1 << (slot + 1) == 0 {
                summary.fault_flags |= trm_fault_bit(slot);
                if summary.trm_global_header[slot] != 0 {
                    slot_word |= diagnostic::TRM_UNEXPECTED;
                    fault = true;
                }
                break 'slot;
            }

            if summary.trm_global_header[slot] == 0 {
                slot_word |= diagnostic::TRM_HEADER;
                summary.fault_flags |= trm_fault_bit(slot);
                fault = true;
                break 'slot;
            }
            if summary.trm_global_trailer[slot] == 0 {
                slot_word |= diagnostic::TRM_TRAILER;
                summary.fault_flags |= trm_fault_bit(slot);
                fault = true;
                break 'slot;
            }
            stats.trm[slot].headers += 1;

            if !summary.has_hits[slot] {
                stats.trm[slot].empty += 1;
            }

            // The TRM event number is 10 bits wide; compare modulo 1024
            let event_number = raw::trm_global_header_event_number(summary.trm_global_header[slot]);
            if event_number != local_event_counter % 1024 {
                slot_word |= diagnostic::TRM_EVENTCOUNTER;
                summary.fault_flags |= trm_fault_bit(slot);
                stats.trm[slot].event_counter_mismatch += 1;
                fault = true;
                break 'slot;
            }

            if raw::trm_global_header_ebit(summary.trm_global_header[slot]) != 0 {
                slot_word |= diagnostic::TRM_EBIT;
                summary.fault_flags |= trm_fault_bit(slot);
                stats.trm[slot].ebit += 1;
                fault = true;
            }

            for chain in 0..raw::TRM_CHAINS {
                if summary.trm_chain_header[slot][chain] == 0 {
                    slot_word |= diagnostic::trm_chain_header(chain);
                    summary.fault_flags |= chain_fault_bit(slot, chain);
                    fault = true;
                    continue;
                }
                if summary.trm_chain_trailer[slot][chain] == 0 {
                    slot_word |= diagnostic::trm_chain_trailer(chain);
                    summary.fault_flags |= chain_fault_bit(slot, chain);
                    fault = true;
                    continue;
                }
                stats.chain[slot][chain].headers += 1;

                if summary.has_errors[slot][chain] {
                    slot_word |= diagnostic::trm_chain_tdc_errors(chain);
                    summary.fault_flags |= chain_fault_bit(slot, chain);
                    stats.chain[slot][chain].tdc_errors += 1;
                    fault = true;
                }

                let chain_counter =
                    raw::trm_chain_trailer_event_counter(summary.trm_chain_trailer[slot][chain]);
                if chain_counter != local_event_counter {
                    slot_word |= diagnostic::trm_chain_event_counter(chain);
                    summary.fault_flags |= chain_fault_bit(slot, chain);
                    stats.chain[slot][chain].event_counter_mismatch += 1;
                    fault = true;
                }

                if raw::trm_chain_trailer_status(summary.trm_chain_trailer[slot][chain]) != 0 {
                    slot_word |= diagnostic::trm_chain_status(chain);
                    summary.fault_flags |= chain_fault_bit(slot, chain);
                    stats.chain[slot][chain].bad_status += 1;
                    fault = true;
                }

                let bunch_id =
                    raw::trm_chain_header_bunch_id(summary.trm_chain_header[slot][chain]);
                if bunch_id != l0_bunch_id {
                    slot_word |= diagnostic::trm_chain_bunch_id(chain);
                    summary.fault_flags |= chain_fault_bit(slot, chain);
                    stats.chain[slot][chain].bunch_id_mismatch += 1;
                    fault = true;
                }
            }
        }

        // Emit the slot word only when it carries fault bits
        if slot_word & 0xFFFF_FFF0 != 0 {
            summary.push_diagnostic(slot_word);
        }
    }

    fault
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::raw::{FIRST_TRM_SLOT_ID, PS_LEADING};

    const L0_BUNCH_ID: u32 = 0x123;
    const EVENT_COUNTER: u32 = 42;

    /// Summary with a complete DRM envelope and the given participation
    /// mask (bit 1 = slot 3, bit 2 = slot 4, ...)
    fn drm_summary(participating: u32) -> EventSummary {
        let mut s = EventSummary::new();
        s.drm_common_header = 0x4000_0000;
        s.drm_global_header = 0x4000_0001 | 7 << 21;
        s.drm_status_header[0] = 0x4000_0000 | participating << 4;
        s.drm_status_header[1] = 0x4000_0000 | participating << 4;
        s.drm_status_header[2] = 0x4000_0000 | L0_BUNCH_ID << 4;
        s.drm_global_trailer = 0x5000_0001 | EVENT_COUNTER << 4;
        s
    }

    /// Fill one slot with a fully consistent TRM block
    fn fill_slot(s: &mut EventSummary, slot: usize) {
        let slot_id = slot as u32 + FIRST_TRM_SLOT_ID;
        s.trm_global_header[slot] =
            0x4000_0000 | slot_id | 10 << 4 | (EVENT_COUNTER % 1024) << 17;
        s.trm_global_trailer[slot] = 0x5000_0003;
        for chain in 0..2 {
            let top = (chain as u32 * 2) << 28;
            s.trm_chain_header[slot][chain] = top | slot_id | L0_BUNCH_ID << 4;
            s.trm_chain_trailer[slot][chain] =
                (top | 1 << 28) | EVENT_COUNTER << 16;
        }
    }

    #[test]
    fn test_missing_drm_header_is_fatal() {
        let mut s = EventSummary::new();
        let mut stats = Stats::new();
        assert!(check(&mut s, &mut stats));
        assert_eq!(s.diagnostic_words.len(), 1);
        assert_eq!(s.diagnostic_words[0], 1 | diagnostic::DRM_HEADER);
        assert_eq!(s.fault_flags, 0x1);
        assert_eq!(stats.events, 1);
        assert_eq!(stats.drm.headers, 0);
    }

    #[test]
    fn test_missing_drm_trailer_is_fatal() {
        let mut s = drm_summary(0);
        s.drm_global_trailer = 0;
        let mut stats = Stats::new();
        assert!(check(&mut s, &mut stats));
        assert_eq!(s.diagnostic_words[0], 1 | diagnostic::DRM_TRAILER);
    }

    #[test]
    fn test_clean_event_keeps_word_zero() {
        let mut s = drm_summary(1 << 1);
        fill_slot(&mut s, 0);
        s.has_hits[0] = true;
        let mut stats = Stats::new();
        assert!(!check(&mut s, &mut stats));
        // One DRM word and nothing else
        assert_eq!(s.diagnostic_words, vec![1]);
        assert_eq!(s.fault_flags, 0);
        assert_eq!(stats.drm.headers, 1);
        assert_eq!(stats.trm[0].headers, 1);
        assert_eq!(stats.chain[0][0].headers, 1);
        assert_eq!(stats.chain[0][1].headers, 1);
        assert_eq!(stats.trm[0].empty, 0);
    }

    #[test]
    fn test_empty_slot_counted_not_faulted() {
        let mut s = drm_summary(1 << 1);
        fill_slot(&mut s, 0);
        let mut stats = Stats::new();
        assert!(!check(&mut s, &mut stats));
        assert_eq!(stats.trm[0].empty, 1);
    }

    #[test]
    fn test_enable_mask_mismatch_is_diagnostic_only() {
        let mut s = drm_summary(1 << 1);
        fill_slot(&mut s, 0);
        s.drm_status_header[1] = 0x4000_0000 | (1u32 << 2) << 4;
        // Slot 3 participates per status 1, so its checks still run clean;
        // only the DRM word reports the disagreement.
        let mut stats = Stats::new();
        assert!(!check(&mut s, &mut stats));
        assert_eq!(s.diagnostic_words[0], 1 | diagnostic::DRM_ENABLEMASK);
        assert_eq!(s.fault_flags, 0);
    }

    #[test]
    fn test_cbit_faults_drm() {
        let mut s = drm_summary(0);
        s.drm_status_header[0] |= 1 << 15;
        let mut stats = Stats::new();
        assert!(check(&mut s, &mut stats));
        assert_eq!(s.diagnostic_words[0], 1 | diagnostic::DRM_CBIT);
        assert_eq!(s.fault_flags & 0x1, 0x1);
        assert_eq!(stats.drm.cbit, 1);
    }

    #[test]
    fn test_missing_trm_header_for_participating_slot() {
        let mut s = drm_summary(1 << 1);
        let mut stats = Stats::new();
        assert!(check(&mut s, &mut stats));
        assert_eq!(s.diagnostic_words.len(), 2);
        assert_eq!(s.diagnostic_words[1], 3 | diagnostic::TRM_HEADER);
        assert_eq!(s.fault_flags & trm_fault_bit(0), trm_fault_bit(0));
        assert_eq!(stats.trm[0].headers, 0);
    }

    #[test]
    fn test_unexpected_trm_block() {
        // Slot 4 not in the participation mask but its header showed up
        let mut s = drm_summary(1 << 1);
        fill_slot(&mut s, 0);
        fill_slot(&mut s, 1);
        let mut stats = Stats::new();
        assert!(check(&mut s, &mut stats));
        assert_eq!(s.diagnostic_words[1], 4 | diagnostic::TRM_UNEXPECTED);
    }

    #[test]
    fn test_absent_slot_fault_bit_without_diagnostic() {
        // Non-participating, nothing decoded: fault bit set in the crate
        // bitmap, but no slot diagnostic word and no event fault.
        let mut s = drm_summary(0);
        let mut stats = Stats::new();
        assert!(!check(&mut s, &mut stats));
        assert_eq!(s.diagnostic_words.len(), 1);
        assert_ne!(s.fault_flags & trm_fault_bit(4), 0);
    }

    #[test]
    fn test_event_number_compared_modulo_1024() {
        let mut s = drm_summary(1 << 1);
        fill_slot(&mut s, 0);
        // Local counter 1066 -> expected 10-bit number 42
        s.drm_global_trailer = 0x5000_0001 | 1066 << 4;
        for chain in 0..2 {
            s.trm_chain_trailer[0][chain] =
                (s.trm_chain_trailer[0][chain] & 0xF000_FFFF) | 1066 << 16;
        }
        let mut stats = Stats::new();
        assert!(!check(&mut s, &mut stats));
        assert_eq!(stats.trm[0].event_counter_mismatch, 0);
    }

    #[test]
    fn test_event_number_mismatch_skips_chain_checks() {
        let mut s = drm_summary(1 << 1);
        fill_slot(&mut s, 0);
        s.trm_global_header[0] =
            (s.trm_global_header[0] & !(0x3FF << 17)) | (EVENT_COUNTER + 1) << 17;
        let mut stats = Stats::new();
        assert!(check(&mut s, &mut stats));
        assert_eq!(s.diagnostic_words[1], 3 | diagnostic::TRM_EVENTCOUNTER);
        assert_eq!(stats.trm[0].event_counter_mismatch, 1);
        assert_eq!(stats.chain[0][0].headers, 0);
    }

    #[test]
    fn test_chain_faults_accumulate_in_slot_word() {
        let mut s = drm_summary(1 << 1);
        fill_slot(&mut s, 0);
        s.has_errors[0][1] = true;
        s.trm_chain_trailer[0][0] |= 0x5; // bad status
        s.trm_chain_header[0][1] =
            (s.trm_chain_header[0][1] & !(0xFFF << 4)) | (L0_BUNCH_ID + 1) << 4;
        let mut stats = Stats::new();
        assert!(check(&mut s, &mut stats));
        let word = s.diagnostic_words[1];
        assert_ne!(word & diagnostic::trm_chain_status(0), 0);
        assert_ne!(word & diagnostic::trm_chain_tdc_errors(1), 0);
        assert_ne!(word & diagnostic::trm_chain_bunch_id(1), 0);
        assert_eq!(stats.chain[0][0].bad_status, 1);
        assert_eq!(stats.chain[0][1].tdc_errors, 1);
        assert_eq!(stats.chain[0][1].bunch_id_mismatch, 1);
        assert_ne!(s.fault_flags & chain_fault_bit(0, 0), 0);
        assert_ne!(s.fault_flags & chain_fault_bit(0, 1), 0);
    }

    #[test]
    fn test_hit_flag_survives_into_empty_count() {
        let mut s = drm_summary(1 << 1 | 1 << 2);
        fill_slot(&mut s, 0);
        fill_slot(&mut s, 1);
        s.has_hits[0] = true;
        s.push_unpacked_hit(0, 0, 0x8000_0000 | PS_LEADING << 29);
        let mut stats = Stats::new();
        assert!(!check(&mut s, &mut stats));
        assert_eq!(stats.trm[0].empty, 0);
        assert_eq!(stats.trm[1].empty, 1);
    }
}
