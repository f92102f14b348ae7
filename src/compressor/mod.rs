//! Crate readout compression
//!
//! Turns raw readout pages into the compressed crate format. A page is a
//! readout header followed by zero or more crate events; each event is
//! decoded, its hits matched and packed, its structure checked, and the
//! compressed words appended to the caller's output buffer.

pub mod checker;
pub mod compressed;
pub mod cursor;
pub mod decoder;
pub mod io;
pub mod raw;
pub mod rdh;
pub mod spider;
pub mod stats;
pub mod summary;

pub use compressed::CompressedWriter;
pub use cursor::WordLayout;
pub use decoder::{EventOutcome, EventReport};
pub use rdh::{Rdh, RDH_BYTES};
pub use stats::Stats;
pub use summary::EventSummary;

use tracing::{debug, warn};

use crate::common::error::{CompressorError, DecodeError};
use crate::compressor::cursor::WordCursor;

/// What happened while processing one page
#[derive(Debug)]
pub struct PageReport {
    pub rdh: Rdh,
    pub events: u32,
    pub faults: u32,
    pub resync_words: u32,
    pub dropped_hits: u32,
    /// Set when decoding stopped early; events decoded before the failure
    /// are kept, the failing event's partial output is discarded.
    pub aborted: Option<DecodeError>,
}

/// Page-at-a-time compressor. Holds the working buffers and the running
/// check counters; one instance per input stream.
pub struct Compressor {
    summary: EventSummary,
    stats: Stats,
    writer: CompressedWriter,
    layout: WordLayout,
}

impl Compressor {
    pub fn new() -> Self {
        Self::with_layout(WordLayout::Contiguous)
    }

    /// Compressor for pages with the given payload word layout
    pub fn with_layout(layout: WordLayout) -> Self {
        Self {
            summary: EventSummary::new(),
            stats: Stats::new(),
            writer: CompressedWriter::new(),
            layout,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Compress every event in `page`, appending the output bytes to
    /// `out`. The payload boundary comes from the page header; a fatal
    /// decode failure abandons the rest of the page but keeps the events
    /// already compressed.
    pub fn process_page(
        &mut self,
        page: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<PageReport, CompressorError> {
        let rdh = Rdh::parse(page)?;
        let mut cursor =
            WordCursor::with_layout(page, RDH_BYTES, rdh.memory_size as usize, self.layout);

        self.writer.clear();
        let mut report = PageReport {
            rdh,
            events: 0,
            faults: 0,
            resync_words: 0,
            dropped_hits: 0,
            aborted: None,
        };

        loop {
            let mark = self.writer.len();
            match decoder::decode_event(
                &mut cursor,
                &mut self.summary,
                &mut self.stats,
                &mut self.writer,
            ) {
                Ok(EventOutcome::EndOfPage) => break,
                Ok(EventOutcome::Event(event)) => {
                    report.events += 1;
                    report.resync_words += event.resync_words;
                    report.dropped_hits += event.dropped_hits;
                    if event.fault {
                        report.faults += 1;
                    }
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        packet = rdh.packet_counter,
                        "abandoning page after fatal decode error"
                    );
                    self.writer.truncate(mark);
                    report.aborted = Some(err);
                    break;
                }
            }
        }

        self.writer.write_to(out);
        debug!(
            packet = rdh.packet_counter,
            events = report.events,
            faults = report.faults,
            words_out = self.writer.len(),
            "page processed"
        );
        Ok(report)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}
