//! The game session: the turn/quarter/ending state machine.
//!
//! DECISION ORDER (fixed, documented, never reordered):
//!   1. Ending trigger?  → terminal state, nothing else happens
//!   2. Apply impact     (impact.rs)
//!   3. Advance stock price
//!   4. Classify adverse / positive
//!   5. Append log entry
//!   ── dwell ──        (caller waits `dwell_ms`, then sends DwellElapsed)
//!   6. Game-over check
//!   7. Dominance check
//!   8. Quarter-boundary check
//!   9. Next turn, next scenario
//!
//! RULES:
//!   - One command at a time; `submit()` takes `&mut self`, so nothing can
//!     be decided while a scenario fetch is in flight.
//!   - All randomness flows through the session's RandomSource streams.
//!   - Every command yields events, even when it is ignored.

use crate::{
    catalog::SeedCatalog,
    clock::TurnClock,
    command::PlayerCommand,
    config::GameConfig,
    error::{GameError, GameResult},
    event::{GameEvent, GameOverReason, LogEntry},
    gemini::GeminiClient,
    impact::{apply_impact, is_adverse},
    market::{StockMarket, TradeRejection, TradeSide},
    metrics::Metrics,
    provider::{Advisor, BoardAdvisor, ScenarioProvider, ScenarioGenerator},
    report::{EndingSummary, QuarterReport},
    rng::{RandomSource, RngBank, RngSlot},
    scenario::{Ending, Scenario},
    snapshot::SessionSnapshot,
    types::SessionId,
};

/// Feedback overlay shown during the dwell.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub message:  String,
    pub positive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnStage {
    AwaitingDecision {
        scenario: Scenario,
    },
    ShowingFeedback {
        scenario: Scenario,
        feedback: Feedback,
        /// Metrics produced by the decision; terminal checks read these.
        outcome:  Metrics,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GamePhase {
    Intro,
    Playing(TurnStage),
    QuarterSummary { report: QuarterReport },
    GameOver { reason: GameOverReason },
    /// Market Dominance.
    IpoWin,
    AcquisitionWin,
}

/// Which commands a phase accepts; payload-free so it can be matched
/// while the session is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseKind {
    Intro,
    Deciding,
    Feedback,
    QuarterSummary,
    Terminal,
}

impl GamePhase {
    fn kind(&self) -> PhaseKind {
        match self {
            Self::Intro                                        => PhaseKind::Intro,
            Self::Playing(TurnStage::AwaitingDecision { .. })  => PhaseKind::Deciding,
            Self::Playing(TurnStage::ShowingFeedback { .. })   => PhaseKind::Feedback,
            Self::QuarterSummary { .. }                        => PhaseKind::QuarterSummary,
            Self::GameOver { .. } | Self::IpoWin | Self::AcquisitionWin => PhaseKind::Terminal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Intro                                     => "intro",
            Self::Playing(TurnStage::AwaitingDecision { .. }) => "playing",
            Self::Playing(TurnStage::ShowingFeedback { .. })  => "feedback",
            Self::QuarterSummary { .. }                     => "quarter_summary",
            Self::GameOver { .. }                           => "game_over",
            Self::IpoWin                                    => "ipo_win",
            Self::AcquisitionWin                            => "acquisition_win",
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind() == PhaseKind::Terminal
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        match self {
            Self::Playing(TurnStage::AwaitingDecision { scenario })
            | Self::Playing(TurnStage::ShowingFeedback { scenario, .. }) => Some(scenario),
            _ => None,
        }
    }
}

pub type BoxedRng = Box<dyn RandomSource + Send>;

pub struct GameSession {
    pub session_id: SessionId,
    seed:           u64,
    config:         GameConfig,
    metrics:        Metrics,
    clock:          TurnClock,
    phase:          GamePhase,
    market:         StockMarket,
    history:        Vec<LogEntry>,
    provider:       ScenarioProvider,
    advisor:        BoardAdvisor,
    provider_rng:   BoxedRng,
    market_rng:     BoxedRng,
}

impl GameSession {
    pub fn new(
        session_id: SessionId,
        seed: u64,
        config: GameConfig,
        provider: ScenarioProvider,
        advisor: BoardAdvisor,
    ) -> GameResult<Self> {
        config.validate().map_err(|e| GameError::InvalidConfig(e.to_string()))?;

        let bank = RngBank::new(seed);
        let provider_rng = bank.stream(RngSlot::Provider);
        let market_rng = bank.stream(RngSlot::Market);
        log::debug!(
            "session {session_id}: seed {seed}, streams {}/{}, generator {}",
            provider_rng.name, market_rng.name, provider.generator_name()
        );

        Ok(Self {
            session_id,
            seed,
            metrics: config.initial_metrics.clone(),
            clock: TurnClock::new(config.quarter_length, config.win_quarters),
            phase: GamePhase::Intro,
            market: StockMarket::new(config.initial_stock_price),
            history: Vec::new(),
            provider,
            advisor,
            provider_rng: Box::new(provider_rng),
            market_rng: Box::new(market_rng),
            config,
        })
    }

    /// Build a fully wired session: catalog from `data_dir` (or the bundled
    /// one), and the Gemini collaborators when a credential is configured.
    pub fn build(
        session_id: SessionId,
        seed: u64,
        config: GameConfig,
        data_dir: &str,
    ) -> GameResult<Self> {
        let catalog = SeedCatalog::load(data_dir)?;
        let mut provider = ScenarioProvider::new(catalog, config.provider.clone());
        let mut advisor = BoardAdvisor::default();

        match GeminiClient::from_config(&config.generator) {
            Ok(Some(client)) => {
                log::info!("scenario generator enabled: gemini/{}", client.model_id());
                advisor = BoardAdvisor::new(Some(Box::new(client.clone()) as Box<dyn Advisor>));
                provider = provider.with_generator(Box::new(client) as Box<dyn ScenarioGenerator>);
            }
            Ok(None) => log::info!("no generator credential, playing from the seed catalog"),
            Err(e) => log::warn!("generator client unavailable, playing from the seed catalog: {e}"),
        }

        Self::new(session_id, seed, config, provider, advisor)
    }

    /// Seed catalog only, no dwell, no remote collaborators.
    pub fn build_test(session_id: SessionId, seed: u64) -> GameResult<Self> {
        let config = GameConfig::default_test();
        let provider = ScenarioProvider::new(SeedCatalog::bundled()?, config.provider.clone());
        Self::new(session_id, seed, config, provider, BoardAdvisor::default())
    }

    /// Replace the stream behind scenario selection coin flips.
    pub fn with_provider_rng(mut self, rng: BoxedRng) -> Self {
        self.provider_rng = rng;
        self
    }

    /// Replace the stream behind the stock price walk.
    pub fn with_market_rng(mut self, rng: BoxedRng) -> Self {
        self.market_rng = rng;
        self
    }

    /// Start from other metrics than the configured ones. Tooling and tests.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Place the clock at an arbitrary turn/quarter. Tooling and tests.
    pub fn with_clock(mut self, clock: TurnClock) -> Self {
        self.clock = clock;
        self
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn seed(&self) -> u64 { self.seed }
    pub fn config(&self) -> &GameConfig { &self.config }
    pub fn metrics(&self) -> &Metrics { &self.metrics }
    pub fn clock(&self) -> &TurnClock { &self.clock }
    pub fn phase(&self) -> &GamePhase { &self.phase }
    pub fn history(&self) -> &[LogEntry] { &self.history }
    pub fn market(&self) -> &StockMarket { &self.market }
    pub fn stock_price(&self) -> f64 { self.market.price }
    pub fn current_scenario(&self) -> Option<&Scenario> { self.phase.scenario() }
    pub fn is_terminal(&self) -> bool { self.phase.is_terminal() }
    pub fn provider(&self) -> &ScenarioProvider { &self.provider }

    pub fn ending(&self) -> Option<EndingSummary> {
        match &self.phase {
            GamePhase::GameOver { reason } => Some(EndingSummary::insolvency(*reason)),
            GamePhase::IpoWin => Some(EndingSummary::MarketDominance {
                final_valuation: self.metrics.valuation,
            }),
            GamePhase::AcquisitionWin => Some(EndingSummary::TakenPrivate {
                exit_value: self.metrics.valuation,
            }),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    // ── Command processing ─────────────────────────────────────

    /// Process one command. Commands that do not apply to the current
    /// phase leave the session untouched and yield `CommandIgnored`.
    pub fn submit(&mut self, command: PlayerCommand) -> Vec<GameEvent> {
        log::debug!("turn={} phase={} command={}", self.clock.turn, self.phase.name(), command.name());

        let phase = self.phase.kind();
        match (phase, command) {
            (_, PlayerCommand::Restart) => self.restart(),
            (PhaseKind::Intro, PlayerCommand::Start) => self.start(),
            (PhaseKind::Deciding, PlayerCommand::Decide { option_id }) => self.decide(&option_id),
            (PhaseKind::Feedback, PlayerCommand::DwellElapsed) => self.finish_dwell(),
            (PhaseKind::QuarterSummary, PlayerCommand::Continue) => self.next_quarter(),
            (PhaseKind::Deciding | PhaseKind::Feedback, PlayerCommand::BuyShares { shares }) => {
                vec![self.trade(TradeSide::Buy, shares)]
            }
            (PhaseKind::Deciding | PhaseKind::Feedback, PlayerCommand::SellShares { shares }) => {
                vec![self.trade(TradeSide::Sell, shares)]
            }
            (_, PlayerCommand::BuyShares { shares }) => {
                vec![self.trade_rejected(TradeSide::Buy, shares, TradeRejection::MarketClosed)]
            }
            (_, PlayerCommand::SellShares { shares }) => {
                vec![self.trade_rejected(TradeSide::Sell, shares, TradeRejection::MarketClosed)]
            }
            (PhaseKind::Deciding | PhaseKind::Feedback, PlayerCommand::AskAdvisor) => self.ask_advisor(),
            (_, command) => vec![GameEvent::CommandIgnored {
                command: command.name().to_string(),
                phase:   self.phase.name().to_string(),
            }],
        }
    }

    fn start(&mut self) -> Vec<GameEvent> {
        log::info!("session {} started (seed {})", self.session_id, self.seed);
        let metrics = self.metrics.clone();
        vec![
            GameEvent::SessionStarted { session_id: self.session_id.clone(), seed: self.seed },
            self.present_scenario(&metrics),
        ]
    }

    fn restart(&mut self) -> Vec<GameEvent> {
        self.metrics = self.config.initial_metrics.clone();
        self.clock = TurnClock::new(self.config.quarter_length, self.config.win_quarters);
        self.market = StockMarket::new(self.config.initial_stock_price);
        self.history.clear();
        self.phase = GamePhase::Intro;
        log::info!("session {} restarted", self.session_id);
        vec![GameEvent::SessionRestarted { session_id: self.session_id.clone() }]
    }

    fn decide(&mut self, option_id: &str) -> Vec<GameEvent> {
        let turn = self.clock.turn;
        let Some(scenario) = self.phase.scenario().cloned() else {
            return vec![];
        };
        let Some(option) = scenario.option(option_id).cloned() else {
            log::debug!("turn={turn} unknown option '{option_id}' for '{}'", scenario.id);
            return vec![GameEvent::CommandIgnored {
                command: "decide".into(),
                phase:   self.phase.name().into(),
            }];
        };

        if let Some(ending) = option.trigger_ending {
            log::info!("turn={turn} option '{}' triggered {ending:?}", option.id);
            self.phase = match ending {
                Ending::GameOver => GamePhase::GameOver {
                    reason: GameOverReason::evaluate(&self.metrics)
                        .unwrap_or(GameOverReason::BoardRemoval),
                },
                Ending::IpoWin         => GamePhase::IpoWin,
                Ending::AcquisitionWin => GamePhase::AcquisitionWin,
            };
            return vec![GameEvent::EndingTriggered { turn, option_id: option.id, ending }];
        }

        let outcome = apply_impact(&self.metrics, &option.impact);
        let price = self.market.step(&mut *self.market_rng);
        let adverse = is_adverse(&option.impact);

        self.history.push(LogEntry {
            turn,
            scenario_title:   scenario.title.clone(),
            decision_text:    option.text.clone(),
            impact:           option.impact.clone(),
            metrics_snapshot: outcome.clone(),
        });
        self.metrics = outcome.clone();

        log::debug!(
            "turn={turn} decided '{}': cash={:.0} valuation={:.0} adverse={adverse}",
            option.id, outcome.cash, outcome.valuation
        );

        let events = vec![
            GameEvent::DecisionApplied {
                turn,
                scenario_title: scenario.title.clone(),
                option_id:      option.id.clone(),
                feedback:       option.feedback.clone(),
                adverse,
            },
            GameEvent::StockPriceMoved { turn, price },
        ];

        self.phase = GamePhase::Playing(TurnStage::ShowingFeedback {
            scenario,
            feedback: Feedback { message: option.feedback, positive: !adverse },
            outcome,
        });
        events
    }

    fn finish_dwell(&mut self) -> Vec<GameEvent> {
        let turn = self.clock.turn;
        let GamePhase::Playing(TurnStage::ShowingFeedback { outcome, .. }) = &self.phase else {
            return vec![];
        };
        let outcome = outcome.clone();

        if let Some(reason) = GameOverReason::evaluate(&outcome) {
            log::info!("turn={turn} game over: {reason:?}");
            self.phase = GamePhase::GameOver { reason };
            return vec![GameEvent::GameOver { turn, reason }];
        }

        if self.clock.is_dominance_reached() {
            log::info!("turn={turn} market dominance at valuation {:.0}", outcome.valuation);
            self.phase = GamePhase::IpoWin;
            return vec![GameEvent::MarketDominance { turn, valuation: outcome.valuation }];
        }

        if self.clock.is_quarter_end() {
            let report = QuarterReport::build(&self.metrics, &self.history, &self.clock);
            let quarter = self.clock.quarter;
            log::info!("turn={turn} quarter {quarter} closed");
            self.phase = GamePhase::QuarterSummary { report };
            return vec![GameEvent::QuarterClosed { quarter, turn }];
        }

        self.clock.advance_turn();
        vec![self.present_scenario(&outcome)]
    }

    fn next_quarter(&mut self) -> Vec<GameEvent> {
        let quarter = self.clock.start_next_quarter();
        let metrics = self.metrics.clone();
        vec![
            GameEvent::QuarterStarted { quarter, turn: self.clock.turn },
            self.present_scenario(&metrics),
        ]
    }

    /// Fetch the scenario for the current turn and put it on screen.
    fn present_scenario(&mut self, metrics: &Metrics) -> GameEvent {
        let turn = self.clock.turn;
        let provided = self.provider.provide(metrics, turn, &mut *self.provider_rng);
        let event = GameEvent::ScenarioPresented {
            turn,
            scenario_id: provided.scenario.id.clone(),
            title:       provided.scenario.title.clone(),
            category:    provided.scenario.category,
            source:      provided.source,
        };
        self.phase = GamePhase::Playing(TurnStage::AwaitingDecision { scenario: provided.scenario });
        event
    }

    fn trade(&mut self, side: TradeSide, shares: u64) -> GameEvent {
        let result = match side {
            TradeSide::Buy  => self.market.buy(&self.metrics, shares),
            TradeSide::Sell => self.market.sell(&self.metrics, shares),
        };
        match result {
            Ok(trade) => {
                log::debug!("turn={} {side:?} {} @ {:.2}", self.clock.turn, trade.shares, trade.price);
                self.metrics = trade.metrics;
                GameEvent::TradeExecuted {
                    side,
                    shares: trade.shares,
                    price:  trade.price,
                    amount: trade.amount,
                }
            }
            Err(rejection) => self.trade_rejected(side, shares, rejection),
        }
    }

    fn trade_rejected(&self, side: TradeSide, shares: u64, rejection: TradeRejection) -> GameEvent {
        log::debug!("turn={} {side:?} of {shares} rejected: {rejection}", self.clock.turn);
        GameEvent::TradeRejected { side, shares, rejection }
    }

    fn ask_advisor(&mut self) -> Vec<GameEvent> {
        let Some(scenario) = self.phase.scenario() else {
            return vec![];
        };
        let text = self.advisor.advise(scenario, &self.metrics);
        vec![GameEvent::AdviceGiven { turn: self.clock.turn, text }]
    }
}
