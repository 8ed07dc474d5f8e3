// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::period::PeriodKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsKind {
    CountAmount,
    DeviceShare,
    Engagement,
    GeoCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metrics {
    CountAmount { count: i64, amount: f64 },
    DeviceShare { count: i64, percentage: f64 },
    Engagement { registered_users: i64, app_opens: i64 },
    GeoCount { latitude: f64, longitude: f64, count: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Real(f64),
}

impl Metrics {
    #[must_use]
    pub const fn kind(&self) -> MetricsKind {
        match self {
            Self::CountAmount { .. } => MetricsKind::CountAmount,
            Self::DeviceShare { .. } => MetricsKind::DeviceShare,
            Self::Engagement { .. } => MetricsKind::Engagement,
            Self::GeoCount { .. } => MetricsKind::GeoCount,
        }
    }

    /// Column values in table order.
    #[must_use]
    pub fn values(&self) -> Vec<MetricValue> {
        match *self {
            Self::CountAmount { count, amount } => {
                vec![MetricValue::Integer(count), MetricValue::Real(amount)]
            }
            Self::DeviceShare { count, percentage } => {
                vec![MetricValue::Integer(count), MetricValue::Real(percentage)]
            }
            Self::Engagement {
                registered_users,
                app_opens,
            } => vec![
                MetricValue::Integer(registered_users),
                MetricValue::Integer(app_opens),
            ],
            Self::GeoCount {
                latitude,
                longitude,
                count,
            } => vec![
                MetricValue::Real(latitude),
                MetricValue::Real(longitude),
                MetricValue::Integer(count),
            ],
        }
    }

    /// The value stored in the family's count column.
    #[must_use]
    pub const fn count(&self) -> i64 {
        match *self {
            Self::CountAmount { count, .. }
            | Self::DeviceShare { count, .. }
            | Self::GeoCount { count, .. } => count,
            Self::Engagement {
                registered_users, ..
            } => registered_users,
        }
    }
}

/// One flattened row: the quarter file identity, the category/district/
/// pincode label and the family's metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRecord {
    pub key: PeriodKey,
    pub label: String,
    pub metrics: Metrics,
}

impl FlatRecord {
    #[must_use]
    pub fn new(key: PeriodKey, label: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            key,
            label: label.into(),
            metrics,
        }
    }
}
