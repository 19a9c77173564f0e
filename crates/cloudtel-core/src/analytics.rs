// ── Analytics over stored readings ──
//
// Completeness, quality ratings, trends and summaries. Everything here is
// a pure function of the readings it is given; callers fetch them from a
// `ReadingStore` first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::{Channel, Reading};
use crate::pipeline::PollOutcome;
use crate::scheduler::PollState;

/// Records considered by the recent statistics.
pub const RECENT_WINDOW: usize = 24;
/// Records shown by the latest view.
pub const LATEST_WINDOW: usize = 10;
/// Relative change (percent) below which a trend is stable.
pub const STABLE_THRESHOLD_PERCENT: f64 = 2.0;

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage; zero when `whole` is zero.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let len = values.len() as f64;
    Some(values.iter().sum::<f64>() / len)
}

// ── Ratings ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QualityRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityRating {
    pub fn from_completeness(percent: f64) -> Self {
        if percent >= 90.0 {
            Self::Excellent
        } else if percent >= 70.0 {
            Self::Good
        } else if percent >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Trend of a chronological series.
///
/// The series is split in half (the later half takes the extra value when
/// the length is odd) and the half averages are compared.
pub fn trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::InsufficientData;
    }
    let (first, second) = values.split_at(values.len() / 2);
    let (Some(first), Some(second)) = (mean(first), mean(second)) else {
        return Trend::InsufficientData;
    };

    let change = second - first;
    if first == 0.0 {
        return match change {
            c if c > 0.0 => Trend::Increasing,
            c if c < 0.0 => Trend::Decreasing,
            _ => Trend::Stable,
        };
    }

    let relative = (change / first).abs() * 100.0;
    if relative < STABLE_THRESHOLD_PERCENT {
        Trend::Stable
    } else if change > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}

// ── Record summary ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CaptureStatus {
    Captured,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub value: Option<f64>,
    pub unit: &'static str,
    pub status: CaptureStatus,
}

/// Per-channel view of one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub id: Uuid,
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub channels: Vec<ChannelSummary>,
    pub parameters_captured: usize,
    pub parameters_total: usize,
    pub completeness_percent: f64,
    pub quality: QualityRating,
}

// ── Collection views ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelQuality {
    pub channel: Channel,
    pub present: usize,
    pub total: usize,
    pub completeness_percent: f64,
}

/// Completeness of every schema channel across all records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    pub total_records: usize,
    pub channels: Vec<ChannelQuality>,
    pub overall_percent: f64,
    pub rating: QualityRating,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentStats {
    /// Records considered (at most [`RECENT_WINDOW`]).
    pub records: usize,
    pub average_temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelTrend {
    pub channel: Channel,
    pub samples: usize,
    pub average: Option<f64>,
    pub trend: Trend,
}

/// The newest records, newest first, with trends over them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestView {
    pub readings: Vec<Reading>,
    pub trends: Vec<ChannelTrend>,
}

/// Everything the status command reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub total_records: usize,
    pub latest: Option<RecordSummary>,
    pub minutes_since_update: Option<i64>,
    pub recent: RecentStats,
    pub data_quality: DataQuality,
    pub scheduler: Option<PollState>,
    pub last_outcome: Option<PollOutcome>,
}

// ── Engine ───────────────────────────────────────────────────────────

/// Computes analytics views. Single-reading completeness is measured over
/// the channels the mapper can populate.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    active: Vec<Channel>,
}

impl AnalyticsEngine {
    pub fn new(active: Vec<Channel>) -> Self {
        Self { active }
    }

    pub fn summarize(&self, reading: &Reading) -> RecordSummary {
        let channels = Channel::ALL
            .iter()
            .map(|&channel| {
                let value = reading.values.get(channel);
                ChannelSummary {
                    channel,
                    value,
                    unit: channel.unit(),
                    status: if value.is_some() {
                        CaptureStatus::Captured
                    } else {
                        CaptureStatus::Missing
                    },
                }
            })
            .collect();

        let captured = reading.values.count_present(&self.active);
        let completeness = round2(percent(captured, self.active.len()));

        RecordSummary {
            id: reading.id,
            label: reading.label.clone(),
            timestamp: reading.timestamp,
            channels,
            parameters_captured: captured,
            parameters_total: self.active.len(),
            completeness_percent: completeness,
            quality: QualityRating::from_completeness(completeness),
        }
    }

    pub fn data_quality(&self, readings: &[Reading]) -> DataQuality {
        let total = readings.len();
        let channels: Vec<ChannelQuality> = Channel::ALL
            .iter()
            .map(|&channel| {
                let present = readings.iter().filter(|r| r.values.is_present(channel)).count();
                ChannelQuality {
                    channel,
                    present,
                    total,
                    completeness_percent: round2(percent(present, total)),
                }
            })
            .collect();

        let cells: usize = channels.iter().map(|c| c.present).sum();
        let overall = round2(percent(cells, total * Channel::ALL.len()));

        DataQuality {
            total_records: total,
            channels,
            overall_percent: overall,
            rating: QualityRating::from_completeness(overall),
        }
    }

    /// Statistics over the newest [`RECENT_WINDOW`] of `readings` (oldest first).
    pub fn recent_stats(&self, readings: &[Reading]) -> RecentStats {
        let recent = tail(readings, RECENT_WINDOW);
        let temps: Vec<f64> = recent.iter().filter_map(|r| r.values.temperature).collect();
        RecentStats {
            records: recent.len(),
            average_temperature: mean(&temps).map(round2),
        }
    }

    /// The newest `n` of `readings` (oldest first), returned newest first.
    pub fn latest(&self, readings: &[Reading], n: usize) -> LatestView {
        let window = tail(readings, n);

        let trends = Channel::ALL
            .iter()
            .map(|&channel| {
                let series: Vec<f64> = window.iter().filter_map(|r| r.values.get(channel)).collect();
                ChannelTrend {
                    channel,
                    samples: series.len(),
                    average: mean(&series).map(round2),
                    trend: trend(&series),
                }
            })
            .collect();

        LatestView {
            readings: window.iter().rev().cloned().collect(),
            trends,
        }
    }

    pub fn status_report(
        &self,
        readings: &[Reading],
        now: DateTime<Utc>,
        scheduler: Option<PollState>,
        last_outcome: Option<PollOutcome>,
    ) -> StatusReport {
        let latest = readings.last();
        StatusReport {
            total_records: readings.len(),
            latest: latest.map(|r| self.summarize(r)),
            minutes_since_update: latest.map(|r| (now - r.timestamp).num_minutes()),
            recent: self.recent_stats(readings),
            data_quality: self.data_quality(readings),
            scheduler,
            last_outcome,
        }
    }
}

fn tail(readings: &[Reading], n: usize) -> &[Reading] {
    &readings[readings.len().saturating_sub(n)..]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ChannelValues, DEFAULT_POLL_LABEL};
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    fn series(temps: &[Option<f64>]) -> Vec<Reading> {
        let start: DateTime<Utc> = "2024-05-01T00:00:00Z".parse().unwrap();
        temps
            .iter()
            .zip(0..)
            .map(|(t, i)| Reading {
                id: Uuid::new_v4(),
                label: DEFAULT_POLL_LABEL.into(),
                values: ChannelValues {
                    temperature: *t,
                    ..ChannelValues::default()
                },
                timestamp: start + TimeDelta::minutes(i),
                source_codes: Vec::new(),
            })
            .collect()
    }

    fn engine() -> AnalyticsEngine {
        AnalyticsEngine::new(vec![Channel::Temperature])
    }

    #[test]
    fn trend_classification() {
        assert_eq!(trend(&[20.0, 20.0, 20.0, 25.0, 25.0, 25.0]), Trend::Increasing);
        assert_eq!(trend(&[25.0, 25.0, 25.0, 20.0, 20.0, 20.0]), Trend::Decreasing);
        assert_eq!(trend(&[20.0, 20.0, 20.0, 20.1, 20.0, 20.0]), Trend::Stable);
        assert_eq!(trend(&[20.0]), Trend::InsufficientData);
        assert_eq!(trend(&[]), Trend::InsufficientData);
    }

    #[test]
    fn trend_from_zero_baseline_uses_sign() {
        assert_eq!(trend(&[0.0, 0.0, 0.5, 0.5]), Trend::Increasing);
        assert_eq!(trend(&[0.0, 0.0, -0.5, -0.5]), Trend::Decreasing);
        assert_eq!(trend(&[0.0, 0.0]), Trend::Stable);
    }

    #[test]
    fn quality_thresholds() {
        assert_eq!(QualityRating::from_completeness(90.0), QualityRating::Excellent);
        assert_eq!(QualityRating::from_completeness(70.0), QualityRating::Good);
        assert_eq!(QualityRating::from_completeness(50.0), QualityRating::Fair);
        assert_eq!(QualityRating::from_completeness(49.99), QualityRating::Poor);
    }

    #[test]
    fn summary_measures_active_channels() {
        let readings = series(&[Some(23.5)]);
        let summary = engine().summarize(&readings[0]);
        assert_eq!(summary.parameters_captured, 1);
        assert_eq!(summary.parameters_total, 1);
        assert_eq!(summary.completeness_percent, 100.0);
        assert_eq!(summary.quality, QualityRating::Excellent);
        assert_eq!(summary.channels.len(), 6);
        assert_eq!(summary.channels[0].status, CaptureStatus::Captured);
        assert_eq!(summary.channels[0].unit, "°C");
        assert_eq!(summary.channels[1].status, CaptureStatus::Missing);

        let empty = engine().summarize(&series(&[None])[0]);
        assert_eq!(empty.completeness_percent, 0.0);
        assert_eq!(empty.quality, QualityRating::Poor);
    }

    #[test]
    fn data_quality_covers_all_schema_channels() {
        let quality = engine().data_quality(&series(&[Some(20.0), None, Some(21.0), Some(22.0)]));
        assert_eq!(quality.total_records, 4);
        assert_eq!(quality.channels[0].present, 3);
        assert_eq!(quality.channels[0].completeness_percent, 75.0);
        assert_eq!(quality.channels[1].present, 0);
        // 3 of 24 cells
        assert_eq!(quality.overall_percent, 12.5);
        assert_eq!(quality.rating, QualityRating::Poor);
    }

    #[test]
    fn data_quality_of_nothing_is_zero() {
        let quality = engine().data_quality(&[]);
        assert_eq!(quality.overall_percent, 0.0);
        assert_eq!(quality.rating, QualityRating::Poor);
    }

    #[test]
    fn recent_stats_use_last_24() {
        let mut temps = vec![Some(100.0); 6];
        temps.extend(vec![Some(20.0); 24]);
        let stats = engine().recent_stats(&series(&temps));
        assert_eq!(stats.records, 24);
        assert_eq!(stats.average_temperature, Some(20.0));
    }

    #[test]
    fn latest_is_newest_first_with_chronological_trend() {
        let readings = series(&[
            Some(1.0),
            Some(20.0),
            Some(20.0),
            Some(20.0),
            Some(25.0),
            Some(25.0),
            Some(25.0),
        ]);
        let view = engine().latest(&readings, 6);
        assert_eq!(view.readings.len(), 6);
        assert_eq!(view.readings[0].values.temperature, Some(25.0));
        assert_eq!(view.readings[5].values.temperature, Some(20.0));
        assert_eq!(view.trends[0].trend, Trend::Increasing);
        assert_eq!(view.trends[0].average, Some(22.5));
        assert_eq!(view.trends[1].trend, Trend::InsufficientData);
    }

    #[test]
    fn status_report_minutes_since_update() {
        let readings = series(&[Some(20.0), Some(21.0)]);
        let now = readings[1].timestamp + TimeDelta::minutes(7);
        let report = engine().status_report(&readings, now, Some(PollState::Idle), None);
        assert_eq!(report.total_records, 2);
        assert_eq!(report.minutes_since_update, Some(7));
        assert_eq!(report.latest.unwrap().id, readings[1].id);
        assert_eq!(report.recent.average_temperature, Some(20.5));
    }
}
