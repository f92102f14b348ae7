//! Compressor binary - converts raw readout pages to the compressed
//! crate format
//!
//! Usage:
//!   compressor -i run.raw -o run.ctf
//!   compressor -i run.raw -o run.ctf --report-interval 10 --stats-json stats.json

use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tofcomp::common::CompressorArgs;
use tofcomp::compressor::io::{PageReader, PageWriter};
use tofcomp::compressor::{Compressor, WordLayout};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tofcomp=info".parse()?))
        .init();

    let args = CompressorArgs::parse();
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        page_size = args.page_size,
        "starting"
    );

    let layout = if args.gbt_words {
        WordLayout::GbtInterleaved
    } else {
        WordLayout::Contiguous
    };
    let mut reader = PageReader::open(&args.input, args.page_size)?;
    let mut writer = PageWriter::create(&args.output)?;
    let mut compressor = Compressor::with_layout(layout);

    let report_interval = args.report_interval.map(Duration::from_secs);
    let mut last_report = Instant::now();

    let mut events = 0u64;
    let mut faults = 0u64;
    let mut resync_words = 0u64;
    let mut dropped_hits = 0u64;
    let mut aborted_pages = 0u64;
    let mut out_buf = Vec::new();

    while let Some(page) = reader.next_page()? {
        out_buf.clear();
        let report = compressor.process_page(page, &mut out_buf)?;
        writer.write(&out_buf)?;

        events += u64::from(report.events);
        faults += u64::from(report.faults);
        resync_words += u64::from(report.resync_words);
        dropped_hits += u64::from(report.dropped_hits);
        if let Some(err) = report.aborted {
            warn!(error = %err, packet = report.rdh.packet_counter, "page aborted");
            aborted_pages += 1;
        }

        if let Some(interval) = report_interval {
            if last_report.elapsed() >= interval {
                info!("\n{}", compressor.stats().report());
                last_report = Instant::now();
            }
        }
    }
    writer.flush()?;

    info!(
        pages = reader.pages(),
        events,
        faults,
        resync_words,
        dropped_hits,
        aborted_pages,
        bytes_out = writer.bytes(),
        "done"
    );
    info!("\n{}", compressor.stats().report());

    if let Some(path) = &args.stats_json {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, compressor.stats())?;
        info!(path = %path.display(), "check counters written");
    }

    Ok(())
}
