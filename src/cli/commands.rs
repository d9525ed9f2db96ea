//! Command implementations

use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::{AppContainer, SweepReport, SweepRequest};
use crate::cli::args::{FilenameArgs, ProbeArgs, SegmentArgs, SweepArgs};
use crate::domain::model::{ProbeWindow, SegmentRequest, TimeRange};
use crate::domain::rules::{output_filename, validate_interval, IntervalLimits};
use crate::utils::format_timestamp;

/// Execute the segment command
pub async fn segment(container: &dyn AppContainer, args: SegmentArgs) -> Result<()> {
    info!("Starting segment operation");

    // Interval bounds are the caller's contract; the interactor does not re-check them
    let range = TimeRange::parse(&args.start, &args.end)?;
    validate_interval(&range, IntervalLimits::for_request(args.danmaku))?;

    let request = SegmentRequest {
        clip_id: args.clip_id,
        start_time: args.start,
        end_time: args.end,
        segment_name: args.name,
        audio_only: args.audio_only,
        danmaku: args.danmaku,
        forward: args.forward,
    };

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; stopping media tools");
                cancel.cancel();
            }
        })
    };

    let result = container
        .segment_interactor()
        .make_with_cancel(request, &cancel)
        .await;
    interrupt.abort();
    let outcome = result.context("Segment job failed")?;

    if args.json {
        let json =
            serde_json::to_string(&outcome).context("Failed to serialize segment outcome")?;
        println!("{}", json);
    } else {
        println!("{}", outcome.filename);
    }

    info!(cache_hit = outcome.cache_hit, "Segment operation completed successfully");
    Ok(())
}

/// Execute the filename command
pub fn filename(args: &FilenameArgs) -> Result<()> {
    let range = TimeRange::parse(&args.start, &args.end)?;
    println!("{}", output_filename(args.clip_id, &range, args.audio_only));
    Ok(())
}

/// Execute the probe command
pub async fn probe(container: &dyn AppContainer, args: ProbeArgs) -> Result<()> {
    if args.from < 0.0 || args.to <= args.from {
        return Err(anyhow::anyhow!(
            "Probe window must satisfy 0 <= from < to, got {}..{}",
            args.from,
            args.to
        ));
    }

    let window = ProbeWindow {
        start: args.from,
        end: args.to,
    };
    let position = container
        .keyframe_probe()
        .nearest_keyframe(&args.url, window, &CancellationToken::new())
        .await
        .context("Keyframe probe failed")?;

    println!("{} ({})", position, format_timestamp(position));
    Ok(())
}

/// Execute the sweep command
pub fn sweep(container: &dyn AppContainer, args: SweepArgs) -> Result<()> {
    let request = SweepRequest {
        min_age: Duration::from_secs(args.min_age_secs),
        dry_run: args.dry_run,
    };
    let report = container
        .sweep_interactor()
        .execute(&request)
        .context("Sweep failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize sweep report to JSON")?;
        println!("{}", json);
    } else {
        display_sweep_report(&report);
    }
    Ok(())
}

/// Display sweep report in human-readable format
fn display_sweep_report(report: &SweepReport) {
    let verb = if report.dry_run { "Would remove" } else { "Removed" };
    for path in &report.removed {
        println!("{} {}", verb, path.display());
    }
    println!(
        "{} {} file(s), {} bytes; {} recent file(s) kept",
        verb,
        report.removed.len(),
        report.bytes,
        report.skipped
    );
}
