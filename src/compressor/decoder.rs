//! Raw event decoding
//!
//! Walks one crate event off the word cursor, filling the event summary
//! and emitting the compressed stream as structure is confirmed. The
//! compressed envelope (crate header and orbit) goes out as soon as the
//! DRM front matter is read; per-slot frame groups follow each TRM
//! trailer; the crate trailer and diagnostics close the event once the
//! DRM trailer arrives and the checker has run.
//!
//! An event must open with a DRM common header; anything else there is
//! fatal for the rest of the page. Inside the crate payload, words that
//! fit no role are skipped one at a time and counted as resyncs, and a
//! TRM block hands any word outside its scope back to the payload loop
//! so a lost TRM trailer degrades to a diagnostic instead of derailing
//! the walk. Running off the declared payload boundary mid-event is
//! fatal for the whole page.

use tracing::{debug, warn};

use crate::common::error::DecodeError;
use crate::compressor::checker::check;
use crate::compressor::compressed::CompressedWriter;
use crate::compressor::cursor::WordCursor;
use crate::compressor::raw::{self, FIRST_TRM_SLOT_ID, TRM_SLOTS};
use crate::compressor::spider::spider;
use crate::compressor::stats::Stats;
use crate::compressor::summary::{EventSummary, TIME_FRAMES};

/// Outcome of one decode attempt
#[derive(Debug)]
pub enum EventOutcome {
    Event(EventReport),
    EndOfPage,
}

/// Telemetry for one decoded event
#[derive(Debug, Clone, Copy)]
pub struct EventReport {
    pub fault: bool,
    pub resync_words: u32,
    pub dropped_hits: u32,
    pub raw_bytes: usize,
}

#[inline]
fn take_word(cursor: &mut WordCursor<'_>) -> Result<u32, DecodeError> {
    cursor.take().ok_or(DecodeError::UnexpectedEndOfPage {
        offset: cursor.byte_offset(),
        limit: cursor.limit(),
    })
}

/// Decode the next event from the cursor into `out`
pub fn decode_event(
    cursor: &mut WordCursor<'_>,
    summary: &mut EventSummary,
    stats: &mut Stats,
    out: &mut CompressedWriter,
) -> Result<EventOutcome, DecodeError> {
    let mut resync_words = 0u32;

    // The event must open with a DRM common header; there is no safe
    // recovery from a misaligned event boundary.
    let Some(first) = cursor.peek() else {
        return Ok(EventOutcome::EndOfPage);
    };
    if !raw::is_drm_common_header(first) {
        return Err(DecodeError::MissingDrmCommonHeader {
            found: first,
            offset: cursor.byte_offset(),
        });
    }

    summary.clear();
    let start = cursor.byte_offset();

    summary.drm_common_header = take_word(cursor)?;
    summary.drm_orbit_header = take_word(cursor)?;

    let global_header = take_word(cursor)?;
    if !raw::is_drm_global_header(global_header) {
        return Err(DecodeError::MissingDrmGlobalHeader {
            found: global_header,
            offset: cursor.byte_offset() - 4,
        });
    }
    summary.drm_global_header = global_header;

    for status in summary.drm_status_header.iter_mut() {
        *status = take_word(cursor)?;
    }

    out.push_crate_header(
        raw::drm_status3_l0_bunch_id(summary.drm_status_header[2]),
        raw::drm_status2_slot_enable_mask(summary.drm_status_header[1]),
        raw::drm_global_header_drm_id(global_header),
    );
    out.push_crate_orbit(summary.drm_orbit_header);

    // Crate payload: TRM blocks, LTM blocks, fillers, then the DRM trailer
    loop {
        let w = take_word(cursor)?;

        if raw::is_drm_global_trailer(w) {
            summary.drm_global_trailer = w;
            break;
        }
        if raw::is_filler(w) {
            continue;
        }
        if raw::is_ltm_global_header(w) {
            // LTM payload carries no hit data; discard to its trailer
            loop {
                let ltm = take_word(cursor)?;
                if raw::is_ltm_global_trailer(ltm) {
                    break;
                }
            }
            continue;
        }
        if raw::is_trm_global_header(w) {
            let slot_id = raw::trm_global_header_slot_id(w);
            if (FIRST_TRM_SLOT_ID..FIRST_TRM_SLOT_ID + TRM_SLOTS as u32).contains(&slot_id) {
                decode_trm_block(cursor, summary, w, out, &mut resync_words);
                continue;
            }
        }
        warn!(
            word = format_args!("0x{w:08x}"),
            offset = cursor.byte_offset() - 4,
            "unknown word in crate payload, resyncing"
        );
        resync_words += 1;
    }

    // Filler padding after the trailer belongs to this event
    if let Some(w) = cursor.peek() {
        if raw::is_filler(w) {
            cursor.advance(1);
        }
    }

    let fault = check(summary, stats);
    out.push_crate_trailer(
        summary.diagnostic_words.len() as u32,
        raw::drm_global_trailer_event_counter(summary.drm_global_trailer),
    );
    for &d in &summary.diagnostic_words {
        out.push_word(d);
    }

    let report = EventReport {
        fault,
        resync_words,
        dropped_hits: summary.dropped_unpacked_hits + summary.dropped_packed_hits,
        raw_bytes: cursor.byte_offset() - start,
    };
    debug!(
        fault = report.fault,
        resync_words = report.resync_words,
        raw_bytes = report.raw_bytes,
        "event decoded"
    );
    Ok(EventOutcome::Event(report))
}

/// Decode one TRM block (header already consumed), then match, pack and
/// emit its hits. A word outside the block's scope (including the DRM
/// global trailer, when the TRM trailer was lost) is left for the crate
/// payload loop; the checker turns the missing trailer into a
/// diagnostic.
fn decode_trm_block(
    cursor: &mut WordCursor<'_>,
    summary: &mut EventSummary,
    header: u32,
    out: &mut CompressedWriter,
    resync_words: &mut u32,
) {
    let slot_id = raw::trm_global_header_slot_id(header);
    let slot = (slot_id - FIRST_TRM_SLOT_ID) as usize;
    summary.trm_global_header[slot] = header;

    // Hits and errors are attributed to the chain whose header was seen
    // last; outside any chain they are dropped as resyncs.
    let mut active_chain: Option<usize> = None;

    loop {
        let Some(w) = cursor.peek() else {
            break;
        };

        if raw::is_trm_global_trailer(w) {
            cursor.advance(1);
            summary.trm_global_trailer[slot] = w;
            break;
        }
        if raw::is_tdc_hit(w) {
            cursor.advance(1);
            match active_chain {
                Some(chain) => {
                    summary.has_hits[slot] = true;
                    summary.push_unpacked_hit(chain, raw::tdc_hit_tdc_id(w) as usize, w);
                }
                None => *resync_words += 1,
            }
            continue;
        }
        if raw::is_tdc_error(w) {
            cursor.advance(1);
            match active_chain {
                Some(chain) => summary.has_errors[slot][chain] = true,
                None => *resync_words += 1,
            }
            continue;
        }
        // Chain headers carry the slot id; one from another slot does
        // not open a sub-block here.
        if raw::is_trm_chain_header(w, 0) && raw::trm_chain_header_slot_id(w) == slot_id {
            cursor.advance(1);
            summary.trm_chain_header[slot][0] = w;
            active_chain = Some(0);
            continue;
        }
        if raw::is_trm_chain_trailer(w, 0) {
            cursor.advance(1);
            summary.trm_chain_trailer[slot][0] = w;
            active_chain = None;
            continue;
        }
        if raw::is_trm_chain_header(w, 1) && raw::trm_chain_header_slot_id(w) == slot_id {
            cursor.advance(1);
            summary.trm_chain_header[slot][1] = w;
            active_chain = Some(1);
            continue;
        }
        if raw::is_trm_chain_trailer(w, 1) {
            cursor.advance(1);
            summary.trm_chain_trailer[slot][1] = w;
            active_chain = None;
            continue;
        }
        if raw::is_filler(w) {
            cursor.advance(1);
            continue;
        }
        warn!(
            word = format_args!("0x{w:08x}"),
            slot = slot_id,
            "word outside TRM scope, returning to crate payload"
        );
        break;
    }

    spider(summary);
    emit_frames(summary, slot_id, out);
}

/// Emit one frame-header group per non-empty time frame, clearing the
/// frame buckets for the next slot.
fn emit_frames(summary: &mut EventSummary, slot_id: u32, out: &mut CompressedWriter) {
    if summary.first_filled_frame > summary.last_filled_frame {
        return;
    }
    for frame in summary.first_filled_frame..=summary.last_filled_frame {
        let hits = &mut summary.frame_packed_hits[frame];
        if hits.is_empty() {
            continue;
        }
        out.push_frame_header(slot_id, frame as u32, hits.len() as u32);
        for &h in hits.iter() {
            out.push_word(h);
        }
        hits.clear();
    }
    summary.first_filled_frame = TIME_FRAMES - 1;
    summary.last_filled_frame = 0;
}
