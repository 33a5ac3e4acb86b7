//! Everything the session reports back to its caller.
//!
//! RULE: every accepted or ignored command produces events; nothing the
//! session does is observable only through its internal state.

use crate::{
    market::{TradeRejection, TradeSide},
    metrics::{Impact, Metrics},
    provider::ScenarioSource,
    scenario::{Ending, ScenarioCategory},
    types::{EntityId, Quarter, SessionId, Turn},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Session events ─────────────────────────────
    SessionStarted {
        session_id: SessionId,
        seed: u64,
    },
    SessionRestarted {
        session_id: SessionId,
    },

    // ── Turn pipeline ──────────────────────────────
    ScenarioPresented {
        turn: Turn,
        scenario_id: EntityId,
        title: String,
        category: ScenarioCategory,
        source: ScenarioSource,
    },
    DecisionApplied {
        turn: Turn,
        scenario_title: String,
        option_id: EntityId,
        feedback: String,
        adverse: bool,
    },
    StockPriceMoved {
        turn: Turn,
        price: f64,
    },
    EndingTriggered {
        turn: Turn,
        option_id: EntityId,
        ending: Ending,
    },
    GameOver {
        turn: Turn,
        reason: GameOverReason,
    },
    MarketDominance {
        turn: Turn,
        valuation: f64,
    },
    QuarterClosed {
        quarter: Quarter,
        turn: Turn,
    },
    QuarterStarted {
        quarter: Quarter,
        turn: Turn,
    },

    // ── Side-channels ──────────────────────────────
    TradeExecuted {
        side: TradeSide,
        shares: u64,
        price: f64,
        amount: f64,
    },
    TradeRejected {
        side: TradeSide,
        shares: u64,
        rejection: TradeRejection,
    },
    AdviceGiven {
        turn: Turn,
        text: String,
    },

    /// The command is not valid in the current phase; nothing changed.
    CommandIgnored {
        command: String,
        phase: String,
    },
}

/// Why the company collapsed, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Bankruptcy,
    GeneralStrike,
    Delisted,
    BoardRemoval,
}

impl GameOverReason {
    /// `None` while the company is still standing.
    pub fn evaluate(metrics: &Metrics) -> Option<Self> {
        let collapsed = metrics.cash <= 0.0
            || metrics.morale <= 0.0
            || metrics.customer_satisfaction <= 0.0
            || metrics.market_share <= 0.0;
        if !collapsed {
            return None;
        }
        Some(if metrics.cash <= 0.0 {
            Self::Bankruptcy
        } else if metrics.morale <= 0.0 {
            Self::GeneralStrike
        } else if metrics.market_share <= 0.0 {
            Self::Delisted
        } else {
            Self::BoardRemoval
        })
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::Bankruptcy    => "Titan Industries has filed for Chapter 11 bankruptcy.",
            Self::GeneralStrike => "A massive general strike has paralyzed operations.",
            Self::Delisted      => "You have been delisted from the S&P 500.",
            Self::BoardRemoval  => "The Board of Directors has voted to remove you.",
        }
    }
}

/// One completed decision. Append-only; the quarterly review reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub turn:             Turn,
    pub scenario_title:   String,
    pub decision_text:    String,
    pub impact:           Impact,
    pub metrics_snapshot: Metrics,
}
