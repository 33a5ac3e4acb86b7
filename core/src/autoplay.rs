//! Headless driver: picks the next command for a session so whole games
//! can run without a player. Used by the runner's `--autoplay` mode and
//! by the playthrough tests.

use crate::{
    command::PlayerCommand,
    engine::{GamePhase, GameSession, TurnStage},
    event::GameEvent,
    rng::RandomSource,
};

/// Hard stop for a single game; a full run needs well under this.
pub const MAX_COMMANDS: usize = 1_000;

/// Chance of buying a small block of shares while a scenario is open.
const TRADE_CHANCE: f64 = 0.15;

pub struct AutoPilot<'a> {
    rng:    &'a mut dyn RandomSource,
    trades: bool,
}

impl<'a> AutoPilot<'a> {
    pub fn new(rng: &'a mut dyn RandomSource) -> Self {
        Self { rng, trades: false }
    }

    /// Also exercise the trading side-channel.
    pub fn with_trades(mut self) -> Self {
        self.trades = true;
        self
    }

    /// `None` once the session has reached an ending.
    pub fn next_command(&mut self, session: &GameSession) -> Option<PlayerCommand> {
        match session.phase() {
            GamePhase::Intro => Some(PlayerCommand::Start),
            GamePhase::Playing(TurnStage::AwaitingDecision { scenario }) => {
                if self.trades && self.rng.chance(TRADE_CHANCE) {
                    let budget = session.market().max_affordable(session.metrics().cash / 100.0);
                    if budget > 0 {
                        return Some(PlayerCommand::BuyShares { shares: budget });
                    }
                }
                let pick = self.rng.next_u64_below(scenario.options.len() as u64) as usize;
                Some(PlayerCommand::Decide { option_id: scenario.options[pick].id.clone() })
            }
            GamePhase::Playing(TurnStage::ShowingFeedback { .. }) => Some(PlayerCommand::DwellElapsed),
            GamePhase::QuarterSummary { .. } => Some(PlayerCommand::Continue),
            GamePhase::GameOver { .. } | GamePhase::IpoWin | GamePhase::AcquisitionWin => None,
        }
    }

    /// Drive the session to an ending. Returns every event in order.
    pub fn run(&mut self, session: &mut GameSession) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..MAX_COMMANDS {
            let Some(command) = self.next_command(session) else {
                break;
            };
            events.extend(session.submit(command));
        }
        if !session.is_terminal() {
            log::warn!("autoplay stopped after {MAX_COMMANDS} commands without an ending");
        }
        events
    }
}
