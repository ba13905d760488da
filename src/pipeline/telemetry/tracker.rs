use serde::Serialize;

use super::trend::{detect_trend, Trend};
use crate::models::{Metric, SensorReading};

/// Display band for a single live metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Normal,
    Caution,
    Critical,
}

/// Heart rate outside 60-100 bpm needs attention.
pub fn heart_rate_status(bpm: f64) -> MetricStatus {
    if (60.0..=100.0).contains(&bpm) {
        MetricStatus::Normal
    } else {
        MetricStatus::Caution
    }
}

/// SpO2 below 90% is critical, below 95% is a caution.
pub fn spo2_status(percent: f64) -> MetricStatus {
    if percent < 90.0 {
        MetricStatus::Critical
    } else if percent < 95.0 {
        MetricStatus::Caution
    } else {
        MetricStatus::Normal
    }
}

/// Breath acetone: ≤2 ppm normal, 2-5 ppm elevated, ≥5 ppm high.
pub fn acetone_status(ppm: f64) -> MetricStatus {
    if ppm >= 5.0 {
        MetricStatus::Critical
    } else if ppm > 2.0 {
        MetricStatus::Caution
    } else {
        MetricStatus::Normal
    }
}

pub fn metric_status(metric: Metric, value: f64) -> MetricStatus {
    match metric {
        Metric::HeartRate => heart_rate_status(value),
        Metric::Spo2 => spo2_status(value),
        Metric::Acetone => acetone_status(value),
    }
}

/// One metric as displayed on the live card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricView {
    pub metric: Metric,
    pub value: f64,
    pub unit: &'static str,
    pub normal_range: &'static str,
    pub status: MetricStatus,
    pub trend: Trend,
}

/// Latest reading with its predecessor and derived indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub current: SensorReading,
    pub previous: Option<SensorReading>,
    pub metrics: Vec<MetricView>,
    /// Capture time of `current`, RFC 3339 UTC.
    pub last_update: Option<String>,
}

impl TelemetrySnapshot {
    pub fn from_pair(current: SensorReading, previous: Option<SensorReading>) -> Self {
        let metrics = Metric::ALL
            .iter()
            .map(|&metric| {
                let value = metric.value_of(&current);
                MetricView {
                    metric,
                    value,
                    unit: metric.unit(),
                    normal_range: metric.normal_range(),
                    status: metric_status(metric, value),
                    trend: detect_trend(value, previous.as_ref().map(|p| metric.value_of(p))),
                }
            })
            .collect();

        Self {
            current,
            previous,
            metrics,
            last_update: current.captured_at().map(|t| t.to_rfc3339()),
        }
    }

    pub fn trend_of(&self, metric: Metric) -> Trend {
        self.metrics
            .iter()
            .find(|m| m.metric == metric)
            .map(|m| m.trend)
            .unwrap_or(Trend::Flat)
    }
}

/// Two-slot telemetry state: the newest reading and the one before it.
#[derive(Debug, Clone, Default)]
pub struct TrendTracker {
    current: Option<SensorReading>,
    previous: Option<SensorReading>,
}

impl TrendTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pushed reading and return the resulting snapshot.
    ///
    /// The old current moves to previous only when a different reading
    /// arrives; a redelivery of the same reading leaves the pair intact.
    pub fn observe(&mut self, reading: SensorReading) -> TelemetrySnapshot {
        match self.current {
            Some(current) if current == reading => {}
            Some(current) => {
                self.previous = Some(current);
                self.current = Some(reading);
            }
            None => self.current = Some(reading),
        }
        TelemetrySnapshot::from_pair(reading, self.previous)
    }

    pub fn snapshot(&self) -> Option<TelemetrySnapshot> {
        self.current
            .map(|current| TelemetrySnapshot::from_pair(current, self.previous))
    }

    pub fn current(&self) -> Option<SensorReading> {
        self.current
    }

    pub fn previous(&self) -> Option<SensorReading> {
        self.previous
    }
}
