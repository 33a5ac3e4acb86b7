//! Derived views for the player: the quarterly board review, the
//! executive title, the office stage, and ending summaries.
//! Nothing here feeds back into game state.

use crate::{
    clock::TurnClock,
    event::{GameOverReason, LogEntry},
    metrics::Metrics,
    types::Quarter,
};
use serde::{Deserialize, Serialize};

/// Balanced scorecard axes, each on a 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub finance: f64,
    pub morale:  f64,
    pub csat:    f64,
    pub market:  f64,
    pub safety:  f64,
}

impl Scorecard {
    pub fn from_metrics(metrics: &Metrics) -> Self {
        Self {
            finance: (metrics.cash / 10_000.0).clamp(0.0, 100.0),
            morale:  metrics.morale,
            csat:    metrics.customer_satisfaction,
            market:  metrics.market_share,
            safety:  100.0 - metrics.risk,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterReport {
    pub quarter:            Quarter,
    pub ending_cash:        f64,
    pub valuation:          f64,
    /// Decisions taken during this quarter, oldest first.
    pub decisions:          Vec<LogEntry>,
    pub scorecard:          Scorecard,
    pub quarters_remaining: u64,
}

impl QuarterReport {
    pub fn build(metrics: &Metrics, history: &[LogEntry], clock: &TurnClock) -> Self {
        let start = clock.quarter_start_turn();
        Self {
            quarter:            clock.quarter,
            ending_cash:        metrics.cash,
            valuation:          metrics.valuation,
            decisions:          history.iter().filter(|e| e.turn > start).cloned().collect(),
            scorecard:          Scorecard::from_metrics(metrics),
            quarters_remaining: clock.quarters_remaining(),
        }
    }
}

pub fn executive_title(metrics: &Metrics, quarter: Quarter) -> &'static str {
    if metrics.market_share > 30.0 {
        "Industry Titan"
    } else if metrics.valuation > 80_000_000_000.0 {
        "Global Conglomerate CEO"
    } else if quarter > 8 {
        "Veteran Executive"
    } else {
        "Group CEO"
    }
}

/// 0 factory floor, 1 high rise, 2 boardroom, 3 global HQ.
pub fn office_stage(valuation: f64) -> u8 {
    if valuation > 100_000_000_000.0 {
        3
    } else if valuation > 60_000_000_000.0 {
        2
    } else if valuation > 40_000_000_000.0 {
        1
    } else {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ending", rename_all = "snake_case")]
pub enum EndingSummary {
    Insolvency { reason: GameOverReason, headline: String },
    MarketDominance { final_valuation: f64 },
    TakenPrivate { exit_value: f64 },
}

impl EndingSummary {
    pub fn insolvency(reason: GameOverReason) -> Self {
        Self::Insolvency { reason, headline: reason.headline().to_string() }
    }

    /// Valuation shown on the ending screen; a collapse is worth nothing.
    pub fn final_valuation(&self) -> f64 {
        match self {
            Self::Insolvency { .. }                  => 0.0,
            Self::MarketDominance { final_valuation } => *final_valuation,
            Self::TakenPrivate { exit_value }         => *exit_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Impact;

    fn entry(turn: u64) -> LogEntry {
        LogEntry {
            turn,
            scenario_title: format!("scenario {turn}"),
            decision_text: "go".into(),
            impact: Impact::new(),
            metrics_snapshot: Metrics::default(),
        }
    }

    #[test]
    fn report_keeps_only_current_quarter_decisions() {
        let history: Vec<LogEntry> = (1..=8).map(entry).collect();
        let clock = TurnClock::new(4, 12).at(8, 2);
        let report = QuarterReport::build(&Metrics::default(), &history, &clock);
        let turns: Vec<u64> = report.decisions.iter().map(|e| e.turn).collect();
        assert_eq!(turns, vec![5, 6, 7, 8]);
        assert_eq!(report.quarters_remaining, 10);
    }

    #[test]
    fn scorecard_caps_finance_axis() {
        let card = Scorecard::from_metrics(&Metrics::default());
        assert_eq!(card.finance, 100.0);
        assert_eq!(card.safety, 85.0);
    }

    #[test]
    fn titles_and_stages() {
        let mut m = Metrics::default();
        assert_eq!(executive_title(&m, 1), "Group CEO");
        assert_eq!(executive_title(&m, 9), "Veteran Executive");
        m.valuation = 90_000_000_000.0;
        assert_eq!(executive_title(&m, 1), "Global Conglomerate CEO");
        m.market_share = 31.0;
        assert_eq!(executive_title(&m, 1), "Industry Titan");

        assert_eq!(office_stage(45_000_000_000.0), 1);
        assert_eq!(office_stage(40_000_000_000.0), 0);
        assert_eq!(office_stage(150_000_000_000.0), 3);
    }
}
