use titan_core::{
    catalog::SeedCatalog,
    clock::TurnClock,
    command::PlayerCommand,
    config::GameConfig,
    engine::{GamePhase, GameSession, TurnStage},
    error::GameError,
    event::{GameEvent, GameOverReason},
    market::{TradeRejection, TradeSide, INITIAL_PRICE},
    metrics::Metrics,
    provider::{BoardAdvisor, ScenarioProvider, ScenarioSource, ADVICE_UNAVAILABLE},
    report::EndingSummary,
    rng::ScriptedRng,
    scenario::Ending,
};

/// Seed catalog, no dwell, and provider draws pinned to 0.0 so turn `t`
/// on healthy metrics always presents catalog index `t mod 12`.
fn session(name: &str) -> GameSession {
    GameSession::build_test(name.into(), 42)
        .unwrap()
        .with_provider_rng(Box::new(ScriptedRng::constant(0.0)))
}

fn decide(session: &mut GameSession, option_id: &str) -> Vec<GameEvent> {
    session.submit(PlayerCommand::Decide { option_id: option_id.into() })
}

fn presented_id(events: &[GameEvent]) -> Option<&str> {
    events.iter().find_map(|e| match e {
        GameEvent::ScenarioPresented { scenario_id, .. } => Some(scenario_id.as_str()),
        _ => None,
    })
}

fn is_ignored(events: &[GameEvent]) -> bool {
    matches!(events, [GameEvent::CommandIgnored { .. }])
}

const TRAP_CATALOG: &str = r#"{"scenarios":[{
    "id": "trap", "title": "Hostile Board", "description": "The board convenes at dawn.",
    "category": "Leadership",
    "options": [
        { "id": "resign", "text": "Resign", "feedback": "Gone.",
          "impact": { "cash": -999 }, "triggerEnding": "GAME_OVER" },
        { "id": "list", "text": "Ring the bell", "feedback": "Public.",
          "impact": {}, "triggerEnding": "IPO_WIN" },
        { "id": "stay", "text": "Stay", "feedback": "Survived.", "impact": { "morale": 1 } }
    ]
}]}"#;

fn trap_session() -> GameSession {
    let config = GameConfig::default_test();
    let provider = ScenarioProvider::new(
        SeedCatalog::from_json(TRAP_CATALOG).unwrap(),
        config.provider.clone(),
    );
    GameSession::new("trap".into(), 1, config, provider, BoardAdvisor::default()).unwrap()
}

// ── Start / decide / dwell ────────────────────────────────────────

#[test]
fn start_presents_first_scenario() {
    let mut s = session("start");
    assert_eq!(s.phase(), &GamePhase::Intro);

    let events = s.submit(PlayerCommand::Start);
    assert!(matches!(events[0], GameEvent::SessionStarted { seed: 42, .. }));
    assert!(matches!(
        &events[1],
        GameEvent::ScenarioPresented { turn: 1, source: ScenarioSource::Seed, .. }
    ));
    assert_eq!(presented_id(&events), Some("s2"));
    assert_eq!(s.phase().name(), "playing");
    assert_eq!(s.current_scenario().unwrap().id, "s2");
}

#[test]
fn decision_applies_impact_then_waits_for_dwell() {
    // Turn 3 with offset 9 lands on s1.
    let mut s = session("decide")
        .with_clock(TurnClock::new(4, 12).at(3, 1))
        .with_provider_rng(Box::new(ScriptedRng::constant(0.95)))
        .with_market_rng(Box::new(ScriptedRng::constant(0.75)));
    assert_eq!(presented_id(&s.submit(PlayerCommand::Start)), Some("s1"));

    let events = decide(&mut s, "opt2");
    assert!(matches!(
        &events[0],
        GameEvent::DecisionApplied { turn: 3, adverse: true, .. }
    ));
    assert!(matches!(events[1], GameEvent::StockPriceMoved { turn: 3, .. }));
    assert!((s.stock_price() - INITIAL_PRICE * 1.015).abs() < 1e-9);

    assert_eq!(s.metrics().cash, 2_005_000_000.0);
    assert_eq!(s.metrics().valuation, 53_000_000_000.0);
    assert_eq!(s.history().len(), 1);
    assert_eq!(s.history()[0].decision_text, s.current_scenario().unwrap().options[1].text);

    match s.phase() {
        GamePhase::Playing(TurnStage::ShowingFeedback { feedback, outcome, .. }) => {
            assert!(!feedback.positive);
            assert_eq!(outcome, s.metrics());
        }
        other => panic!("expected feedback, got {other:?}"),
    }

    // Dwell on a mid-quarter turn moves straight on.
    let events = s.submit(PlayerCommand::DwellElapsed);
    assert!(matches!(events[0], GameEvent::ScenarioPresented { turn: 4, .. }));
    assert_eq!(s.clock().turn, 4);
}

#[test]
fn unknown_option_is_ignored() {
    let mut s = session("unknown-option");
    s.submit(PlayerCommand::Start);
    let events = decide(&mut s, "opt9");
    assert!(is_ignored(&events));
    assert_eq!(s.phase().name(), "playing");
    assert_eq!(s.metrics(), &Metrics::default());
}

#[test]
fn commands_outside_their_phase_change_nothing() {
    let mut s = session("ignored");
    assert!(is_ignored(&decide(&mut s, "opt1")));
    assert!(is_ignored(&s.submit(PlayerCommand::DwellElapsed)));
    assert!(is_ignored(&s.submit(PlayerCommand::AskAdvisor)));
    assert_eq!(s.phase(), &GamePhase::Intro);

    s.submit(PlayerCommand::Start);
    assert!(is_ignored(&s.submit(PlayerCommand::Start)));
    assert!(is_ignored(&s.submit(PlayerCommand::DwellElapsed)));
    assert!(is_ignored(&s.submit(PlayerCommand::Continue)));

    decide(&mut s, "opt1");
    // No second decision while the feedback is up.
    assert!(is_ignored(&decide(&mut s, "opt1")));
    assert_eq!(s.history().len(), 1);
}

// ── Quarters ──────────────────────────────────────────────────────

#[test]
fn four_decisions_close_the_quarter() {
    let mut s = session("quarter");
    s.submit(PlayerCommand::Start);

    let mut closed = None;
    for _ in 0..4 {
        decide(&mut s, "opt1");
        let events = s.submit(PlayerCommand::DwellElapsed);
        if let Some(GameEvent::QuarterClosed { quarter, turn }) = events.first() {
            closed = Some((*quarter, *turn));
        }
    }
    assert_eq!(closed, Some((1, 4)));

    let GamePhase::QuarterSummary { report } = s.phase() else {
        panic!("expected quarter summary, got {}", s.phase().name());
    };
    assert_eq!(report.quarter, 1);
    assert_eq!(report.decisions.len(), 4);
    assert_eq!(report.quarters_remaining, 11);
    assert_eq!(report.ending_cash, s.metrics().cash);

    let events = s.submit(PlayerCommand::Continue);
    assert_eq!(events[0], GameEvent::QuarterStarted { quarter: 2, turn: 5 });
    assert_eq!(presented_id(&events), Some("s6"));
    assert_eq!((s.clock().turn, s.clock().quarter), (5, 2));
}

#[test]
fn eleventh_quarter_end_is_still_a_review() {
    let mut s = session("q11").with_clock(TurnClock::new(4, 12).at(44, 11));
    s.submit(PlayerCommand::Start);
    decide(&mut s, "opt2");
    let events = s.submit(PlayerCommand::DwellElapsed);
    assert_eq!(events, vec![GameEvent::QuarterClosed { quarter: 11, turn: 44 }]);
}

// ── Endings ───────────────────────────────────────────────────────

#[test]
fn acquisition_offer_short_circuits_the_pipeline() {
    let mut s = session("acquisition").with_clock(TurnClock::new(4, 12).at(9, 3));
    assert_eq!(presented_id(&s.submit(PlayerCommand::Start)), Some("s10"));

    let events = decide(&mut s, "opt1");
    assert_eq!(
        events,
        vec![GameEvent::EndingTriggered {
            turn:      9,
            option_id: "opt1".into(),
            ending:    Ending::AcquisitionWin,
        }]
    );
    assert_eq!(s.phase(), &GamePhase::AcquisitionWin);
    // The option's cash and morale deltas never land.
    assert_eq!(s.metrics(), &Metrics::default());
    assert_eq!(s.stock_price(), INITIAL_PRICE);
    assert!(s.history().is_empty());
    assert_eq!(
        s.ending(),
        Some(EndingSummary::TakenPrivate { exit_value: 45_000_000_000.0 })
    );
    assert!(is_ignored(&decide(&mut s, "opt2")));
}

#[test]
fn triggered_game_over_without_collapse_is_a_board_removal() {
    let mut s = trap_session();
    s.submit(PlayerCommand::Start);
    decide(&mut s, "resign");
    assert_eq!(s.phase(), &GamePhase::GameOver { reason: GameOverReason::BoardRemoval });
    assert_eq!(s.metrics().cash, Metrics::default().cash);
}

#[test]
fn triggered_ipo_is_a_dominance_win() {
    let mut s = trap_session();
    s.submit(PlayerCommand::Start);
    decide(&mut s, "list");
    assert_eq!(s.phase(), &GamePhase::IpoWin);
    assert!(matches!(s.ending(), Some(EndingSummary::MarketDominance { .. })));
}

#[test]
fn running_out_of_cash_is_bankruptcy() {
    let broke = Metrics { cash: 100_000_000.0, ..Metrics::default() };
    let mut s = session("bankrupt").with_metrics(broke);

    let events = s.submit(PlayerCommand::Start);
    assert!(matches!(
        &events[1],
        GameEvent::ScenarioPresented { source: ScenarioSource::FinanceRecovery, .. }
    ));
    decide(&mut s, "opt1");
    assert!(s.metrics().cash < 0.0);
    // Still showing feedback until the dwell runs out.
    assert_eq!(s.phase().name(), "feedback");

    let events = s.submit(PlayerCommand::DwellElapsed);
    assert_eq!(events, vec![GameEvent::GameOver { turn: 1, reason: GameOverReason::Bankruptcy }]);
    assert_eq!(s.ending().unwrap().final_valuation(), 0.0);
}

#[test]
fn collapsed_morale_is_a_general_strike() {
    let tired = Metrics { morale: 5.0, ..Metrics::default() };
    let mut s = session("strike").with_metrics(tired);
    s.submit(PlayerCommand::Start);
    decide(&mut s, "opt2");
    assert_eq!(s.metrics().morale, 0.0);
    s.submit(PlayerCommand::DwellElapsed);
    assert_eq!(s.phase(), &GamePhase::GameOver { reason: GameOverReason::GeneralStrike });
}

#[test]
fn cash_landing_exactly_on_zero_is_bankruptcy() {
    // Break-even burn, so the weekly decay leaves cash where the delta put it.
    let thin = Metrics { cash: 100_000_000.0, monthly_burn: 850_000_000.0, ..Metrics::default() };
    // Finance flip misses, offset 9 on turn 1 lands on s11.
    let mut s = session("zero-cash")
        .with_metrics(thin)
        .with_provider_rng(Box::new(ScriptedRng::constant(0.9)));
    assert_eq!(presented_id(&s.submit(PlayerCommand::Start)), Some("s11"));

    decide(&mut s, "opt1");
    assert_eq!(s.metrics().cash, 0.0);

    let events = s.submit(PlayerCommand::DwellElapsed);
    assert_eq!(events, vec![GameEvent::GameOver { turn: 1, reason: GameOverReason::Bankruptcy }]);
}

#[test]
fn lost_market_share_is_a_delisting() {
    let niche = Metrics { market_share: 3.0, ..Metrics::default() };
    let mut s = session("delisted")
        .with_clock(TurnClock::new(4, 12).at(5, 2))
        .with_metrics(niche);
    assert_eq!(presented_id(&s.submit(PlayerCommand::Start)), Some("s6"));
    decide(&mut s, "opt3");
    assert_eq!(s.metrics().market_share, 0.0);

    s.submit(PlayerCommand::DwellElapsed);
    assert_eq!(s.phase(), &GamePhase::GameOver { reason: GameOverReason::Delisted });
}

#[test]
fn lost_customers_on_a_quarter_end_is_a_board_removal() {
    let unloved = Metrics { customer_satisfaction: 20.0, ..Metrics::default() };
    let mut s = session("board-removal")
        .with_clock(TurnClock::new(4, 12).at(8, 2))
        .with_metrics(unloved);
    assert_eq!(presented_id(&s.submit(PlayerCommand::Start)), Some("s9"));
    decide(&mut s, "opt3");
    assert_eq!(s.metrics().customer_satisfaction, 0.0);

    // The collapse wins over the quarter review.
    s.submit(PlayerCommand::DwellElapsed);
    assert_eq!(s.phase(), &GamePhase::GameOver { reason: GameOverReason::BoardRemoval });
}

#[test]
fn surviving_the_final_quarter_is_market_dominance() {
    let mut s = session("dominance").with_clock(TurnClock::new(4, 12).at(48, 12));
    assert_eq!(presented_id(&s.submit(PlayerCommand::Start)), Some("s1"));
    decide(&mut s, "opt3");
    let valuation = s.metrics().valuation;

    let events = s.submit(PlayerCommand::DwellElapsed);
    assert_eq!(events, vec![GameEvent::MarketDominance { turn: 48, valuation }]);
    assert_eq!(s.phase(), &GamePhase::IpoWin);
    assert_eq!(
        s.ending(),
        Some(EndingSummary::MarketDominance { final_valuation: valuation })
    );
}

#[test]
fn collapse_on_the_final_turn_beats_dominance() {
    let broke = Metrics { cash: 100_000_000.0, ..Metrics::default() };
    let mut s = session("late-collapse")
        .with_clock(TurnClock::new(4, 12).at(48, 12))
        .with_metrics(broke);
    s.submit(PlayerCommand::Start);
    decide(&mut s, "opt1");
    s.submit(PlayerCommand::DwellElapsed);
    assert_eq!(s.phase(), &GamePhase::GameOver { reason: GameOverReason::Bankruptcy });
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let build = |config: GameConfig| {
        let provider = ScenarioProvider::new(SeedCatalog::bundled().unwrap(), config.provider.clone());
        GameSession::new("bad-config".into(), 1, config, provider, BoardAdvisor::default())
    };

    let mut config = GameConfig::default_test();
    config.quarter_length = 0;
    assert!(matches!(build(config), Err(GameError::InvalidConfig(_))));

    let mut config = GameConfig::default_test();
    config.provider.seed_offset_range = 0;
    assert!(matches!(build(config), Err(GameError::InvalidConfig(_))));

    assert!(build(GameConfig::default_test()).is_ok());
}

// ── Side-channels ─────────────────────────────────────────────────

#[test]
fn trading_outside_play_is_rejected() {
    let mut s = session("closed-market");
    let events = s.submit(PlayerCommand::BuyShares { shares: 10 });
    assert_eq!(
        events,
        vec![GameEvent::TradeRejected {
            side:      TradeSide::Buy,
            shares:    10,
            rejection: TradeRejection::MarketClosed,
        }]
    );
    assert_eq!(s.metrics(), &Metrics::default());
}

#[test]
fn trades_settle_against_cash_and_holdings() {
    let mut s = session("trades");
    s.submit(PlayerCommand::Start);

    let events = s.submit(PlayerCommand::BuyShares { shares: 1_000 });
    let GameEvent::TradeExecuted { amount, .. } = events[0] else {
        panic!("expected a trade, got {events:?}");
    };
    assert_eq!(amount, 1_000.0 * INITIAL_PRICE);
    assert_eq!(s.metrics().shares_held, 1_000);
    assert_eq!(s.metrics().cash, Metrics::default().cash - amount);
    // Trades never move the turn pipeline.
    assert_eq!(s.phase().name(), "playing");
    assert!(s.history().is_empty());

    let events = s.submit(PlayerCommand::SellShares { shares: 2_000 });
    assert!(matches!(
        events[0],
        GameEvent::TradeRejected {
            rejection: TradeRejection::InsufficientShares { requested: 2_000, held: 1_000 },
            ..
        }
    ));

    s.submit(PlayerCommand::SellShares { shares: 1_000 });
    assert_eq!(s.metrics().shares_held, 0);
    assert_eq!(s.metrics().cash, Metrics::default().cash);
}

#[test]
fn advisor_without_credential_gives_canned_hint() {
    let mut s = session("advisor");
    s.submit(PlayerCommand::Start);
    let events = s.submit(PlayerCommand::AskAdvisor);
    assert_eq!(
        events,
        vec![GameEvent::AdviceGiven { turn: 1, text: ADVICE_UNAVAILABLE.into() }]
    );
    assert_eq!(s.phase().name(), "playing");
}

// ── Restart / snapshot ────────────────────────────────────────────

#[test]
fn restart_resets_everything_but_the_session() {
    let mut s = session("restart");
    s.submit(PlayerCommand::Start);
    s.submit(PlayerCommand::BuyShares { shares: 5 });
    decide(&mut s, "opt1");
    s.submit(PlayerCommand::DwellElapsed);

    let events = s.submit(PlayerCommand::Restart);
    assert_eq!(events, vec![GameEvent::SessionRestarted { session_id: "restart".into() }]);
    assert_eq!(s.phase(), &GamePhase::Intro);
    assert_eq!(s.metrics(), &Metrics::default());
    assert_eq!((s.clock().turn, s.clock().quarter), (1, 1));
    assert_eq!(s.stock_price(), INITIAL_PRICE);
    assert!(s.history().is_empty());

    assert_eq!(presented_id(&s.submit(PlayerCommand::Start)), Some("s2"));
}

#[test]
fn snapshot_reflects_the_feedback_overlay() {
    let mut s = session("snapshot");
    s.submit(PlayerCommand::Start);
    decide(&mut s, "opt1");

    let snapshot = s.snapshot();
    assert_eq!(snapshot.phase, "feedback");
    assert_eq!(snapshot.seed, 42);
    assert_eq!(snapshot.turn, 1);
    assert_eq!(snapshot.executive_title, "Group CEO");
    assert!(snapshot.feedback.as_ref().unwrap().positive);
    assert_eq!(snapshot.history.len(), 1);
    assert!(snapshot.ending.is_none());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["metrics"]["monthlyBurn"], 820_000_000.0);
    assert_eq!(json["scenario"]["id"], "s2");
}
