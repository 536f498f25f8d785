//! Aggregate statistics over the asset store.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::AssetStatus;

/// Totals reported by `GET /assets/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStatistics {
    pub total_assets: i64,
    /// Assets currently `IN_SERVICE`.
    pub active_assets: i64,
    pub broken_assets: i64,
    pub maintenance_assets: i64,
    pub out_of_service_assets: i64,
    /// Sum of every asset value; assets without a value count as zero.
    pub total_value: Decimal,
    /// Count per status tag. Every status is present, even at zero.
    pub by_status: BTreeMap<&'static str, i64>,
}

impl AssetStatistics {
    /// Assemble statistics from per-status counts.
    ///
    /// Statuses missing from `counts` are reported as zero.
    pub fn from_counts(
        total_assets: i64,
        counts: &[(AssetStatus, i64)],
        total_value: Decimal,
    ) -> Self {
        let count_of = |status: AssetStatus| {
            counts
                .iter()
                .filter(|(s, _)| *s == status)
                .map(|(_, n)| n)
                .sum::<i64>()
        };

        let by_status = AssetStatus::ALL
            .into_iter()
            .map(|status| (status.as_str(), count_of(status)))
            .collect();

        Self {
            total_assets,
            active_assets: count_of(AssetStatus::InService),
            broken_assets: count_of(AssetStatus::Broken),
            maintenance_assets: count_of(AssetStatus::InMaintenance),
            out_of_service_assets: count_of(AssetStatus::OutOfService),
            total_value,
            by_status,
        }
    }
}

/// Exact decimal sum of optional values; `None` contributes zero.
///
/// Returns `None` if the total leaves the `Decimal` range.
pub fn sum_values<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v.unwrap_or(Decimal::ZERO)))
}
