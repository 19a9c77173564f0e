//! `run` and `poll`: the acquisition write path.

use cloudtel_core::{DiagnosticCode, PollOutcome};

use crate::cli::{GlobalOpts, OutputFormat, RunArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::readings::reading_detail;

/// One line per completed tick.
fn outcome_line(format: &OutputFormat, outcome: &PollOutcome) -> Result<String, CliError> {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            output::render_structured(&OutputFormat::JsonCompact, outcome)
        }
        _ => Ok(match outcome {
            PollOutcome::Stored { reading } => format!(
                "{}  stored {}  temperature={}",
                reading.timestamp.format("%Y-%m-%d %H:%M:%S"),
                reading.id,
                output::number(reading.values.temperature),
            ),
            PollOutcome::Failed { reason } => format!("poll failed: {reason}"),
            PollOutcome::Skipped => "poll skipped: previous run still in flight".into(),
        }),
    }
}

/// Poll until Ctrl-C, printing each outcome.
pub async fn run(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load(global)?;
    if let Some(ms) = args.interval_ms {
        cfg.poll.interval_ms = ms;
    }
    if args.no_enrich {
        cfg.poll.enrich = false;
    }

    let telemetry = config::telemetry(&cfg)?;
    let poller = telemetry.poller().clone();
    let mut outcomes = poller.last_outcome();
    let handle = poller.spawn();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, stopping scheduler");
                break;
            }
            changed = outcomes.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = outcomes.borrow_and_update().clone();
                if let Some(outcome) = latest {
                    output::print_output(&outcome_line(&global.output, &outcome)?, global.quiet);
                }
            }
        }
    }

    poller.shutdown();
    if let Err(e) = handle.await {
        tracing::warn!(error = %e, "scheduler task ended abnormally");
    }

    let report = telemetry.status_report().await?;
    let format = match global.output {
        OutputFormat::Json | OutputFormat::JsonCompact => OutputFormat::JsonCompact,
        ref other => other.clone(),
    };
    output::print_output(&super::status::render(&report, &format, global)?, global.quiet);
    Ok(())
}

/// Run one acquisition and print the stored reading.
pub async fn poll(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let telemetry = config::telemetry(&cfg)?;

    match telemetry.poller().trigger().await {
        PollOutcome::Stored { reading } => {
            let out = output::render_single(&global.output, &reading, reading_detail, |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        PollOutcome::Failed { reason } => Err(CliError::DiagnosticFailed {
            title: "Poll failed".into(),
            message: reason,
            code: DiagnosticCode::PollError,
            exit: crate::error::exit_code::GENERAL,
        }),
        PollOutcome::Skipped => Err(CliError::Busy),
    }
}
