//! `status`: analytics over the stored readings. Works offline.

use chrono::Utc;
use tabled::Tabled;

use cloudtel_core::analytics::{ChannelQuality, RECENT_WINDOW};
use cloudtel_core::{AnalyticsEngine, DpMapper, PollOutcome, QualityRating, StatusReport};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Tone};

#[derive(Tabled)]
struct QualityRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Present")]
    present: String,
    #[tabled(rename = "Completeness")]
    completeness: String,
}

impl From<&ChannelQuality> for QualityRow {
    fn from(q: &ChannelQuality) -> Self {
        Self {
            channel: q.channel.to_string(),
            present: format!("{}/{}", q.present, q.total),
            completeness: format!("{:.2}%", q.completeness_percent),
        }
    }
}

fn rating(r: QualityRating, color: bool) -> String {
    let tone = match r {
        QualityRating::Excellent | QualityRating::Good => Tone::Good,
        QualityRating::Fair => Tone::Warn,
        QualityRating::Poor => Tone::Bad,
    };
    output::paint(&r.to_string(), tone, color)
}

fn status_detail(report: &StatusReport, color: bool) -> String {
    let mut pairs = vec![("Records", report.total_records.to_string())];

    if let Some(state) = report.scheduler {
        pairs.push(("Scheduler", state.to_string()));
    }
    if let Some(ref outcome) = report.last_outcome {
        let last = match outcome {
            PollOutcome::Stored { reading } => format!("stored {}", reading.id),
            PollOutcome::Failed { reason } => {
                output::paint(&format!("failed: {reason}"), Tone::Bad, color)
            }
            PollOutcome::Skipped => "skipped".into(),
        };
        pairs.push(("Last poll", last));
    }

    if let Some(ref latest) = report.latest {
        pairs.push(("Latest", format!("{} ({})", latest.timestamp.to_rfc3339(), latest.label)));
        if let Some(minutes) = report.minutes_since_update {
            pairs.push(("Minutes since update", minutes.to_string()));
        }
        pairs.push((
            "Latest completeness",
            format!(
                "{}/{} ({:.2}%, {})",
                latest.parameters_captured,
                latest.parameters_total,
                latest.completeness_percent,
                rating(latest.quality, color)
            ),
        ));
    } else {
        pairs.push(("Latest", "no readings stored".into()));
    }

    pairs.push((
        "Recent avg temperature",
        format!(
            "{} over {} records (window {RECENT_WINDOW})",
            report
                .recent
                .average_temperature
                .map_or_else(|| "n/a".into(), |t| format!("{t:.2} °C")),
            report.recent.records
        ),
    ));
    pairs.push((
        "Data quality",
        format!(
            "{:.2}% ({})",
            report.data_quality.overall_percent,
            rating(report.data_quality.rating, color)
        ),
    ));

    let rows: Vec<QualityRow> = report.data_quality.channels.iter().map(QualityRow::from).collect();
    format!("{}\n{}", output::detail_lines(&pairs), output::render_table(&rows))
}

/// Render a status report in `format`.
pub(super) fn render(
    report: &StatusReport,
    format: &OutputFormat,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    output::render_single(
        format,
        report,
        |r| status_detail(r, color),
        |r| r.total_records.to_string(),
    )
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let readings = config::open_store(&cfg).list().await?;

    let engine = AnalyticsEngine::new(DpMapper::new().active_channels());
    let report = engine.status_report(&readings, Utc::now(), None, None);

    output::print_output(&render(&report, &global.output, global)?, global.quiet);
    Ok(())
}
