//! Diagnostics: `raw`, `spec` and `compare`.
//!
//! A failure prints its `{title, message, code}` payload in structured
//! output modes before the error is reported on stderr.

use tabled::Tabled;

use cloudtel_core::diagnostics::{DeclaredPoint, EfficiencyRating, RawCode};
use cloudtel_core::{Comparison, CoreError, DiagnosticCode, Telemetry};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Tone};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RawRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Category")]
    category: String,
}

impl From<&RawCode> for RawRow {
    fn from(c: &RawCode) -> Self {
        Self {
            code: c.code.clone(),
            value: serde_json::to_string(&c.value).unwrap_or_default(),
            kind: c.value_kind,
            category: c.category.to_string(),
        }
    }
}

#[derive(Tabled)]
struct SpecRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dp_type: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Scale")]
    scale: String,
    #[tabled(rename = "Range")]
    range: String,
}

impl From<&DeclaredPoint> for SpecRow {
    fn from(p: &DeclaredPoint) -> Self {
        let declared = p.declared_range.as_ref();
        Self {
            code: p.code.clone(),
            name: p.name.clone().unwrap_or_default(),
            dp_type: p.dp_type.clone().unwrap_or_default(),
            unit: declared.and_then(|d| d.unit.clone()).unwrap_or_default(),
            min: declared.and_then(|d| d.min).map(|v| v.to_string()).unwrap_or_default(),
            max: declared.and_then(|d| d.max).map(|v| v.to_string()).unwrap_or_default(),
            scale: declared.and_then(|d| d.scale).map(|v| v.to_string()).unwrap_or_default(),
            range: declared
                .and_then(|d| d.range.as_ref())
                .map(|r| r.join("|"))
                .unwrap_or_default(),
        }
    }
}

fn comparison_detail(c: &Comparison, color: bool) -> String {
    let tone = match c.efficiency {
        EfficiencyRating::Excellent | EfficiencyRating::Good => Tone::Good,
        EfficiencyRating::Fair => Tone::Warn,
        EfficiencyRating::Poor => Tone::Bad,
    };
    output::detail_lines(&[
        ("Current codes", c.current_codes.join(", ")),
        ("Supported codes", c.supported_codes.join(", ")),
        ("Active", c.active_codes.join(", ")),
        ("Inactive", c.inactive_codes.join(", ")),
        ("Utilization", format!("{:.2}%", c.utilization_percent)),
        ("Efficiency", output::paint(&c.efficiency.to_string(), tone, color)),
    ])
}

// ── Failure handling ────────────────────────────────────────────────

fn failed(
    global: &GlobalOpts,
    err: CoreError,
    title: &str,
    code: DiagnosticCode,
) -> Result<(), CliError> {
    let payload = err.diagnostic(title, code);
    if matches!(
        global.output,
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml
    ) {
        output::print_output(
            &output::render_structured(&global.output, &payload)?,
            global.quiet,
        );
    }
    Err(CliError::diagnostic(payload, err))
}

fn connect(global: &GlobalOpts) -> Result<Telemetry, CliError> {
    config::telemetry(&config::load(global)?)
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn raw(global: &GlobalOpts) -> Result<(), CliError> {
    let telemetry = connect(global)?;
    let analysis = match telemetry.diagnostics().raw_data().await {
        Ok(a) => a,
        Err(e) => {
            return failed(global, e, "Raw data analysis failed", DiagnosticCode::RawDataError);
        }
    };

    let out = output::render_single(
        &global.output,
        &analysis,
        |a| {
            let rows: Vec<RawRow> = a.codes.iter().map(RawRow::from).collect();
            format!(
                "{}\n{} codes from {} at {}",
                output::render_table(&rows),
                a.total_codes,
                a.device_id,
                a.fetched_at.to_rfc3339()
            )
        },
        |a| {
            a.codes
                .iter()
                .map(|c| c.code.clone())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn spec(global: &GlobalOpts) -> Result<(), CliError> {
    let telemetry = connect(global)?;
    let spec = match telemetry.diagnostics().specification().await {
        Ok(s) => s,
        Err(e) => {
            return failed(
                global,
                e,
                "Specification fetch failed",
                DiagnosticCode::SpecificationsError,
            );
        }
    };

    let out = output::render_single(
        &global.output,
        &spec,
        |s| {
            let rows: Vec<SpecRow> = s.data_points.iter().map(SpecRow::from).collect();
            format!(
                "{}\ncategory {} ({} data points)",
                output::render_table(&rows),
                s.category,
                s.data_points.len()
            )
        },
        |s| {
            s.data_points
                .iter()
                .map(|p| p.code.clone())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn compare(global: &GlobalOpts) -> Result<(), CliError> {
    let telemetry = connect(global)?;
    let comparison = match telemetry.diagnostics().compare().await {
        Ok(c) => c,
        Err(e) => {
            return failed(global, e, "Comparison failed", DiagnosticCode::ComparisonError);
        }
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &comparison,
        |c| comparison_detail(c, color),
        |c| c.inactive_codes.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
