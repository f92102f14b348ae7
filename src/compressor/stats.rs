//! Consistency-check counters
//!
//! Accumulated across events by the checker, reported periodically by the
//! binary. Percentages in the report are relative to the number of
//! checked events.

use std::fmt::Write as _;

use serde::Serialize;

use crate::compressor::raw::{TRM_CHAINS, TRM_SLOTS};

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct DrmCounters {
    pub headers: u32,
    pub cbit: u32,
    pub fault: u32,
    pub rto_bit: u32,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct TrmCounters {
    pub headers: u32,
    pub empty: u32,
    pub event_counter_mismatch: u32,
    pub ebit: u32,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ChainCounters {
    pub headers: u32,
    pub event_counter_mismatch: u32,
    pub bad_status: u32,
    pub bunch_id_mismatch: u32,
    pub tdc_errors: u32,
}

/// Per-crate running totals
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub events: u32,
    pub drm: DrmCounters,
    pub trm: [TrmCounters; TRM_SLOTS],
    pub chain: [[ChainCounters; TRM_CHAINS]; TRM_SLOTS],
}

impl Stats {
    pub fn new() -> Self {
        Self {
            events: 0,
            drm: DrmCounters::default(),
            trm: [TrmCounters::default(); TRM_SLOTS],
            chain: [[ChainCounters::default(); TRM_CHAINS]; TRM_SLOTS],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Human-readable summary, one line per structural element, with each
    /// counter as a percentage of checked events.
    pub fn report(&self) -> String {
        let pct = |n: u32| -> f64 {
            if self.events == 0 {
                0.0
            } else {
                100.0 * f64::from(n) / f64::from(self.events)
            }
        };

        let mut out = String::new();
        let _ = writeln!(out, "check summary: {} events", self.events);
        let _ = writeln!(
            out,
            "  DRM     | headers {:6.2} % | cbit {:6.2} % | fault {:6.2} % | rto {:6.2} %",
            pct(self.drm.headers),
            pct(self.drm.cbit),
            pct(self.drm.fault),
            pct(self.drm.rto_bit),
        );
        for (i, trm) in self.trm.iter().enumerate() {
            let slot = i + 3;
            let _ = writeln!(
                out,
                "  TRM {:2}  | headers {:6.2} % | empty {:6.2} % | evcount {:6.2} % | ebit {:6.2} %",
                slot,
                pct(trm.headers),
                pct(trm.empty),
                pct(trm.event_counter_mismatch),
                pct(trm.ebit),
            );
            for (c, chain) in self.chain[i].iter().enumerate() {
                let tag = if c == 0 { 'a' } else { 'b' };
                let _ = writeln!(
                    out,
                    "  TRM {:2}{} | headers {:6.2} % | evcount {:6.2} % | status {:6.2} % \
                     | bunchid {:6.2} % | tdcerr {:6.2} %",
                    slot,
                    tag,
                    pct(chain.headers),
                    pct(chain.event_counter_mismatch),
                    pct(chain.bad_status),
                    pct(chain.bunch_id_mismatch),
                    pct(chain.tdc_errors),
                );
            }
        }
        out
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let s = Stats::new();
        assert_eq!(s.events, 0);
        assert_eq!(s.drm.headers, 0);
        assert_eq!(s.trm[9].ebit, 0);
        assert_eq!(s.chain[0][1].tdc_errors, 0);
    }

    #[test]
    fn test_reset() {
        let mut s = Stats::new();
        s.events = 10;
        s.drm.cbit = 3;
        s.chain[4][1].bad_status = 2;
        s.reset();
        assert_eq!(s.events, 0);
        assert_eq!(s.drm.cbit, 0);
        assert_eq!(s.chain[4][1].bad_status, 0);
    }

    #[test]
    fn test_report_percentages() {
        let mut s = Stats::new();
        s.events = 4;
        s.drm.headers = 4;
        s.drm.cbit = 1;
        let report = s.report();
        assert!(report.contains("check summary: 4 events"));
        assert!(report.contains("headers 100.00 %"));
        assert!(report.contains("cbit  25.00 %"));
    }

    #[test]
    fn test_report_with_no_events() {
        let s = Stats::new();
        // No division by zero, everything reads 0 %
        assert!(s.report().contains("  0.00 %"));
    }

    #[test]
    fn test_serializes_to_json() {
        let mut s = Stats::new();
        s.events = 2;
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"events\":2"));
        assert!(json.contains("\"drm\""));
    }
}
