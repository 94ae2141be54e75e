//! Reserved-capacity resource records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Region;

/// Tenancy mode of a reservation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenancy {
    /// Shared hardware.
    #[default]
    Default,
    /// Single-tenant hardware.
    Dedicated,
    /// Dedicated host.
    Host,
}

impl std::fmt::Display for Tenancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tenancy::Default => write!(f, "default"),
            Tenancy::Dedicated => write!(f, "dedicated"),
            Tenancy::Host => write!(f, "host"),
        }
    }
}

/// One reservation as returned by a region's provider endpoint.
///
/// Records are immutable once produced by a collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub id: String,
    /// Availability zone or region the reservation lives in
    pub region: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(rename = "type")]
    pub instance_type: String,
    pub fixed_price: f64,
    pub usage_price: f64,
    /// Reservation term in seconds
    pub duration: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub instance_count: i64,
    #[serde(default)]
    pub tenancy: Tenancy,
}

impl ResourceRecord {
    /// Create a record with zeroed pricing and an empty validity interval.
    pub fn new(id: impl Into<String>, region: &Region, instance_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            region: region.to_string(),
            tags: BTreeMap::new(),
            instance_type: instance_type.into(),
            fixed_price: 0.0,
            usage_price: 0.0,
            duration: 0,
            start: DateTime::<Utc>::default(),
            end: DateTime::<Utc>::default(),
            instance_count: 1,
            tenancy: Tenancy::Default,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_pricing(mut self, fixed_price: f64, usage_price: f64) -> Self {
        self.fixed_price = fixed_price;
        self.usage_price = usage_price;
        self
    }

    pub fn with_term(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = start;
        self.end = end;
        self.duration = (end - start).num_seconds();
        self
    }

    pub fn with_instance_count(mut self, count: i64) -> Self {
        self.instance_count = count;
        self
    }
}
