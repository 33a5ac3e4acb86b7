//! Impact application engine.
//!
//! ORDER (fixed, never reordered):
//!   1. Currency deltas (cash, revenue, burn), unclamped.
//!   2. Percentage deltas, then clamp every bounded metric into [0, 100].
//!   3. Valuation: explicit delta is added, otherwise recomputed.
//!   4. One week of net burn is taken out of cash.
//!
//! Ending triggers never reach this module; the engine short-circuits them.

use crate::metrics::{Impact, MetricKey, Metrics, BOUNDED_MAX, BOUNDED_MIN};

/// Annualized revenue multiple used by the valuation formula.
pub const REVENUE_MULTIPLE: f64 = 5.0;

/// Weeks per month; burn decay takes one week per decision.
pub const WEEKS_PER_MONTH: f64 = 4.0;

pub const ADVERSE_CASH_THRESHOLD: f64 = -100_000_000.0;
pub const ADVERSE_MORALE_THRESHOLD: f64 = -10.0;
pub const ADVERSE_MARKET_SHARE_THRESHOLD: f64 = -2.0;

/// Produce the post-decision metrics. The input is never mutated.
pub fn apply_impact(current: &Metrics, impact: &Impact) -> Metrics {
    let mut next = current.clone();

    let deltas = impact.iter().filter(|(key, _)| *key != MetricKey::Valuation);
    let (bounded, currency): (Vec<_>, Vec<_>) = deltas.partition(|(key, _)| key.is_bounded());

    for (key, delta) in currency {
        *currency_mut(&mut next, key) += delta;
    }

    for (key, delta) in bounded {
        *bounded_mut(&mut next, key) += delta;
    }
    for key in MetricKey::BOUNDED {
        let slot = bounded_mut(&mut next, key);
        *slot = slot.clamp(BOUNDED_MIN, BOUNDED_MAX);
    }

    // A zero delta counts as "not specified" and falls through to the formula.
    match impact.get(MetricKey::Valuation).filter(|d| *d != 0.0) {
        Some(delta) => next.valuation += delta,
        None        => next.valuation = formula_valuation(&next),
    }

    next.cash -= weekly_net_burn(&next);
    next
}

/// Annualized revenue at the fixed multiple plus cash on hand.
pub fn formula_valuation(metrics: &Metrics) -> f64 {
    metrics.monthly_revenue * 12.0 * REVENUE_MULTIPLE + metrics.cash
}

/// One week of burn net of revenue. Negative when the company is profitable.
pub fn weekly_net_burn(metrics: &Metrics) -> f64 {
    -metrics.monthly_profit() / WEEKS_PER_MONTH
}

/// Whether a decision's raw deltas count as a bad outcome for feedback.
pub fn is_adverse(impact: &Impact) -> bool {
    impact.get(MetricKey::Cash).is_some_and(|d| d < ADVERSE_CASH_THRESHOLD)
        || impact.get(MetricKey::Morale).is_some_and(|d| d < ADVERSE_MORALE_THRESHOLD)
        || impact
            .get(MetricKey::MarketShare)
            .is_some_and(|d| d < ADVERSE_MARKET_SHARE_THRESHOLD)
}

fn currency_mut(metrics: &mut Metrics, key: MetricKey) -> &mut f64 {
    match key {
        MetricKey::Cash           => &mut metrics.cash,
        MetricKey::MonthlyRevenue => &mut metrics.monthly_revenue,
        MetricKey::MonthlyBurn    => &mut metrics.monthly_burn,
        other => unreachable!("{} is not a currency metric", other.name()),
    }
}

fn bounded_mut(metrics: &mut Metrics, key: MetricKey) -> &mut f64 {
    match key {
        MetricKey::Morale               => &mut metrics.morale,
        MetricKey::CustomerSatisfaction => &mut metrics.customer_satisfaction,
        MetricKey::MarketShare          => &mut metrics.market_share,
        MetricKey::Risk                 => &mut metrics.risk,
        other => unreachable!("{} is not a bounded metric", other.name()),
    }
}
