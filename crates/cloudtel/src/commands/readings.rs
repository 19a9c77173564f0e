//! Reading store handlers: list, latest, get, add, update, delete.

use chrono::Utc;
use tabled::Tabled;
use uuid::Uuid;

use cloudtel_core::analytics::ChannelTrend;
use cloudtel_core::{AnalyticsEngine, CoreError, DpMapper, Reading, ReadingStore, Trend};

use crate::cli::{GlobalOpts, ReadingsArgs, ReadingsCommand};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct ReadingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Temp °C")]
    temperature: String,
    #[tabled(rename = "pH")]
    ph: String,
    #[tabled(rename = "ORP mV")]
    orp: String,
    #[tabled(rename = "Cond mS/cm")]
    conductivity: String,
    #[tabled(rename = "TDS ppm")]
    dissolved_solids: String,
    #[tabled(rename = "Salinity ppm")]
    salinity: String,
}

impl From<&Reading> for ReadingRow {
    fn from(r: &Reading) -> Self {
        Self {
            id: r.id.to_string(),
            label: r.label.clone(),
            timestamp: r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            temperature: output::number(r.values.temperature),
            ph: output::number(r.values.ph),
            orp: output::number(r.values.orp),
            conductivity: output::number(r.values.conductivity),
            dissolved_solids: output::number(r.values.dissolved_solids),
            salinity: output::number(r.values.salinity),
        }
    }
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "Average")]
    average: String,
    #[tabled(rename = "Trend")]
    trend: String,
}

fn trend_row(t: &ChannelTrend, color: bool) -> TrendRow {
    let tone = match t.trend {
        Trend::Stable => Tone::Good,
        Trend::Increasing | Trend::Decreasing => Tone::Warn,
        Trend::InsufficientData => Tone::Bad,
    };
    TrendRow {
        channel: t.channel.to_string(),
        samples: t.samples,
        average: output::number(t.average),
        trend: output::paint(&t.trend.to_string(), tone, color),
    }
}

/// Multi-line view of one reading.
pub(crate) fn reading_detail(r: &Reading) -> String {
    let mut pairs = vec![
        ("ID", r.id.to_string()),
        ("Label", r.label.clone()),
        ("Timestamp", r.timestamp.to_rfc3339()),
    ];
    for channel in cloudtel_core::Channel::ALL {
        if let Some(v) = r.values.get(channel) {
            pairs.push((channel_label(channel), format!("{v:.2} {}", channel.unit())));
        }
    }
    if !r.source_codes.is_empty() {
        pairs.push(("Source codes", r.source_codes.join(", ")));
    }
    output::detail_lines(&pairs)
}

fn channel_label(channel: cloudtel_core::Channel) -> &'static str {
    use cloudtel_core::Channel;
    match channel {
        Channel::Temperature => "Temperature",
        Channel::Ph => "pH",
        Channel::Orp => "ORP",
        Channel::Conductivity => "Conductivity",
        Channel::DissolvedSolids => "Dissolved solids",
        Channel::Salinity => "Salinity",
    }
}

fn not_found(id: Uuid) -> CliError {
    CoreError::NotFound {
        entity_type: "reading".into(),
        identifier: id.to_string(),
    }
    .into()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ReadingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let store = config::open_store(&cfg);

    match args.command {
        ReadingsCommand::List { limit } => {
            let all = store.list().await?;
            let shown = match limit {
                Some(n) => &all[all.len().saturating_sub(n)..],
                None => &all[..],
            };
            let out = output::render_list(
                &global.output,
                shown,
                |r| ReadingRow::from(r),
                |r| r.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReadingsCommand::Latest { count } => {
            let all = store.list().await?;
            let engine = AnalyticsEngine::new(DpMapper::new().active_channels());
            let view = engine.latest(&all, count);
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &view,
                |v| {
                    let rows: Vec<ReadingRow> = v.readings.iter().map(ReadingRow::from).collect();
                    let trends: Vec<TrendRow> =
                        v.trends.iter().map(|t| trend_row(t, color)).collect();
                    format!(
                        "{}\n{}",
                        output::render_table(&rows),
                        output::render_table(&trends)
                    )
                },
                |v| {
                    v.readings
                        .iter()
                        .map(|r| r.id.to_string())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReadingsCommand::Get { id } => {
            let id = util::parse_id(&id)?;
            let reading = store.get(id).await?.ok_or_else(|| not_found(id))?;
            let out = output::render_single(&global.output, &reading, reading_detail, |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReadingsCommand::Add(fields) => {
            let input = util::reading_input(fields)?;
            let saved = store.save(input.into_reading(Uuid::new_v4(), Utc::now())?).await?;
            tracing::info!(id = %saved.id, "reading added");
            let out = output::render_single(&global.output, &saved, reading_detail, |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReadingsCommand::Update { id, fields } => {
            let id = util::parse_id(&id)?;
            let replacement = util::reading_input(fields)?.into_reading(id, Utc::now())?;
            let updated = store
                .update(id, replacement)
                .await?
                .ok_or_else(|| not_found(id))?;
            let out = output::render_single(&global.output, &updated, reading_detail, |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReadingsCommand::Delete { id } => {
            let id = util::parse_id(&id)?;
            if !util::confirm(&format!("Delete reading {id}?"), global.yes)? {
                return Ok(());
            }
            if !store.delete(id).await? {
                return Err(not_found(id));
            }
            if !global.quiet {
                eprintln!("Reading deleted");
            }
            Ok(())
        }
    }
}
