use serde::{Deserialize, Serialize};
use crate::types::EntityId;

/// Everything a player (or the runner) can ask the session to do.
/// The session processes exactly one command at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Turn pipeline ─────────────────────────────
    Start,
    Decide { option_id: EntityId },
    /// The feedback dwell has run out; resume the pipeline.
    DwellElapsed,
    /// Leave the quarterly board review.
    Continue,

    // ── Side-channels ─────────────────────────────
    BuyShares { shares: u64 },
    SellShares { shares: u64 },
    AskAdvisor,

    // ── Session ───────────────────────────────────
    Restart,
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start             => "start",
            Self::Decide { .. }     => "decide",
            Self::DwellElapsed      => "dwell_elapsed",
            Self::Continue          => "continue",
            Self::BuyShares { .. }  => "buy_shares",
            Self::SellShares { .. } => "sell_shares",
            Self::AskAdvisor        => "ask_advisor",
            Self::Restart           => "restart",
        }
    }
}
