//! Snapshot view: everything a front end needs to draw one frame.
//!
//! Built on demand from a live session and serialized to JSON by the
//! runner. Nothing reads a snapshot back into a session.

use crate::{
    engine::{GamePhase, GameSession, TurnStage},
    event::LogEntry,
    metrics::Metrics,
    report::{executive_title, office_stage, EndingSummary, QuarterReport},
    scenario::Scenario,
    types::{Quarter, SessionId, Turn},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackView {
    pub message:  String,
    pub positive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id:      SessionId,
    pub seed:            u64,
    pub phase:           String,
    pub turn:            Turn,
    pub quarter:         Quarter,
    pub metrics:         Metrics,
    pub stock_price:     f64,
    pub portfolio_value: f64,
    pub max_buyable:     u64,
    pub executive_title: String,
    pub office_stage:    u8,
    pub scenario:        Option<Scenario>,
    pub feedback:        Option<FeedbackView>,
    pub report:          Option<QuarterReport>,
    pub ending:          Option<EndingSummary>,
    pub history:         Vec<LogEntry>,
}

impl SessionSnapshot {
    pub fn capture(session: &GameSession) -> Self {
        let metrics = session.metrics().clone();
        let clock = session.clock();
        let market = session.market();

        let feedback = match session.phase() {
            GamePhase::Playing(TurnStage::ShowingFeedback { feedback, .. }) => Some(FeedbackView {
                message:  feedback.message.clone(),
                positive: feedback.positive,
            }),
            _ => None,
        };
        let report = match session.phase() {
            GamePhase::QuarterSummary { report } => Some(report.clone()),
            _ => None,
        };

        Self {
            session_id:      session.session_id.clone(),
            seed:            session.seed(),
            phase:           session.phase().name().to_string(),
            turn:            clock.turn,
            quarter:         clock.quarter,
            stock_price:     market.price,
            portfolio_value: market.portfolio_value(metrics.shares_held),
            max_buyable:     market.max_affordable(metrics.cash),
            executive_title: executive_title(&metrics, clock.quarter).to_string(),
            office_stage:    office_stage(metrics.valuation),
            scenario:        session.current_scenario().cloned(),
            feedback,
            report,
            ending:          session.ending(),
            history:         session.history().to_vec(),
            metrics,
        }
    }
}
