//! Company health: the numeric state every decision acts on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const BOUNDED_MIN: f64 = 0.0;
pub const BOUNDED_MAX: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    pub cash:                  f64,
    pub monthly_revenue:       f64,
    pub monthly_burn:          f64,
    /// Informational only; the engine never changes it.
    pub employees:             u64,
    pub morale:                f64,
    pub customer_satisfaction: f64,
    pub market_share:          f64,
    pub risk:                  f64,
    pub valuation:             f64,
    /// Only the trading side-channel touches this.
    pub shares_held:           u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            cash:                  2_500_000_000.0,
            monthly_revenue:       850_000_000.0,
            monthly_burn:          780_000_000.0,
            employees:             80_000,
            morale:                65.0,
            customer_satisfaction: 75.0,
            market_share:          12.0,
            risk:                  15.0,
            valuation:             45_000_000_000.0,
            shares_held:           0,
        }
    }
}

impl Metrics {
    pub fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Cash                 => self.cash,
            MetricKey::MonthlyRevenue       => self.monthly_revenue,
            MetricKey::MonthlyBurn          => self.monthly_burn,
            MetricKey::Morale               => self.morale,
            MetricKey::CustomerSatisfaction => self.customer_satisfaction,
            MetricKey::MarketShare          => self.market_share,
            MetricKey::Risk                 => self.risk,
            MetricKey::Valuation            => self.valuation,
        }
    }

    /// Monthly profit (negative when burning cash).
    pub fn monthly_profit(&self) -> f64 {
        self.monthly_revenue - self.monthly_burn
    }
}

/// The closed set of metrics an impact may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    Cash,
    MonthlyRevenue,
    MonthlyBurn,
    Morale,
    CustomerSatisfaction,
    MarketShare,
    Risk,
    Valuation,
}

impl MetricKey {
    pub const ALL: [MetricKey; 8] = [
        MetricKey::Cash,
        MetricKey::MonthlyRevenue,
        MetricKey::MonthlyBurn,
        MetricKey::Morale,
        MetricKey::CustomerSatisfaction,
        MetricKey::MarketShare,
        MetricKey::Risk,
        MetricKey::Valuation,
    ];

    /// Percentage metrics, clamped into [0, 100].
    pub const BOUNDED: [MetricKey; 4] = [
        MetricKey::Morale,
        MetricKey::CustomerSatisfaction,
        MetricKey::MarketShare,
        MetricKey::Risk,
    ];

    /// Percentage metrics are clamped; currency and valuation are not.
    pub fn is_bounded(&self) -> bool {
        Self::BOUNDED.contains(self)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cash                 => "cash",
            Self::MonthlyRevenue       => "monthlyRevenue",
            Self::MonthlyBurn          => "monthlyBurn",
            Self::Morale               => "morale",
            Self::CustomerSatisfaction => "customerSatisfaction",
            Self::MarketShare          => "marketShare",
            Self::Risk                 => "risk",
            Self::Valuation            => "valuation",
        }
    }
}

/// Signed deltas keyed by metric. An absent key means "no change".
///
/// Deserialization rejects unknown keys and non-numeric values, which is
/// what keeps generated content inside the closed metric set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Impact {
    deltas: BTreeMap<MetricKey, f64>,
}

impl Impact {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and literal catalogs.
    pub fn with(mut self, key: MetricKey, delta: f64) -> Self {
        self.deltas.insert(key, delta);
        self
    }

    pub fn get(&self, key: MetricKey) -> Option<f64> {
        self.deltas.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        self.deltas.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(MetricKey, f64)> for Impact {
    fn from_iter<I: IntoIterator<Item = (MetricKey, f64)>>(iter: I) -> Self {
        Self { deltas: iter.into_iter().collect() }
    }
}
