//! Cost anomaly series as returned by the search backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One day of a product's cost series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyPoint {
    /// Day stamp, e.g. `2024-01-02T00:00:00.000Z`
    pub date: String,
    pub cost: f64,
    /// Upper band of the expected cost range
    pub upper_band: f64,
    pub abnormal: bool,
}

impl AnomalyPoint {
    pub fn new(date: impl Into<String>, cost: f64) -> Self {
        Self {
            date: date.into(),
            cost,
            upper_band: 0.0,
            abnormal: false,
        }
    }

    pub fn with_band(mut self, upper_band: f64) -> Self {
        self.upper_band = upper_band;
        self.abnormal = self.cost > upper_band;
        self
    }
}

/// Product code to chronologically ordered points.
pub type AnomalySeriesSet = BTreeMap<String, Vec<AnomalyPoint>>;
