use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One biometric sample, as produced by the sensor feed or manual entry.
///
/// Field names on the wire follow the device feed (`HeartRate`, `SpO2`).
/// Acetone is always canonical ppm here; any display scaling is undone
/// before a reading is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "HeartRate")]
    pub heart_rate: f64,
    #[serde(rename = "SpO2")]
    pub spo2: f64,
    pub acetone: f64,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl SensorReading {
    pub fn new(heart_rate: f64, spo2: f64, acetone: f64, timestamp: i64) -> Self {
        Self {
            heart_rate,
            spo2,
            acetone,
            timestamp,
        }
    }

    /// Capture time as UTC, `None` when the timestamp is out of range.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Which biometric a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    HeartRate,
    Spo2,
    Acetone,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::HeartRate, Metric::Spo2, Metric::Acetone];

    pub fn unit(self) -> &'static str {
        match self {
            Metric::HeartRate => "bpm",
            Metric::Spo2 => "%",
            Metric::Acetone => "ppm",
        }
    }

    /// Normal range as shown next to the live reading.
    pub fn normal_range(self) -> &'static str {
        match self {
            Metric::HeartRate => "60-100 bpm",
            Metric::Spo2 => "95-100%",
            Metric::Acetone => "0-2 ppm",
        }
    }

    pub fn value_of(self, reading: &SensorReading) -> f64 {
        match self {
            Metric::HeartRate => reading.heart_rate,
            Metric::Spo2 => reading.spo2,
            Metric::Acetone => reading.acetone,
        }
    }
}
