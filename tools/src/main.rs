//! titan-runner: headless driver for Titan Industries.
//!
//! Usage:
//!   titan-runner --seed 12345                 autoplay one game, print a summary
//!   titan-runner --seed 12345 --trades        same, with share trading
//!   titan-runner --seed 12345 --ipc-mode      JSON lines over stdin/stdout

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use titan_core::{
    autoplay::AutoPilot,
    command::PlayerCommand,
    config::GameConfig,
    engine::{GamePhase, GameSession},
    event::GameEvent,
    rng::{RngBank, RngSlot},
    snapshot::SessionSnapshot,
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Play { command: PlayerCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct IpcResponse<'a> {
    events: &'a [GameEvent],
    state:  SessionSnapshot,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let trades = args.iter().any(|a| a == "--trades");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let mut config = GameConfig::load(data_dir)?;
    config.dwell_ms = parse_arg(&args, "--dwell-ms", config.dwell_ms);
    if !ipc_mode {
        // Nobody is watching the feedback overlay.
        config.dwell_ms = 0;
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut session = GameSession::build(session_id.clone(), seed, config, data_dir)?;
    log::info!("runner: session {session_id} seed {seed} ipc={ipc_mode}");

    if ipc_mode {
        run_ipc_loop(&mut session)?;
    } else {
        println!("Titan Industries: titan-runner");
        println!("  session:   {session_id}");
        println!("  seed:      {seed}");
        println!("  data_dir:  {data_dir}");
        println!("  scenarios: {} seeded", session.provider().catalog().len());
        println!("  generator: {}", session.provider().generator_name());
        println!();

        let mut pilot_rng = RngBank::new(seed).stream(RngSlot::Autoplay);
        let mut pilot = AutoPilot::new(&mut pilot_rng);
        if trades {
            pilot = pilot.with_trades();
        }
        let events = pilot.run(&mut session);
        print_summary(&session, &events);
    }

    Ok(())
}

fn run_ipc_loop(session: &mut GameSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => respond(&mut stdout, session, &[])?,
            IpcRequest::Play { command } => {
                let events = session.submit(command);
                respond(&mut stdout, session, &events)?;

                // The feedback overlay stays up for the dwell, then the
                // pipeline resumes on its own.
                if matches!(session.phase(), GamePhase::Playing(_)) && is_decision(&events) {
                    std::thread::sleep(session.config().dwell());
                    let events = session.submit(PlayerCommand::DwellElapsed);
                    respond(&mut stdout, session, &events)?;
                }
            }
        }
    }
    Ok(())
}

fn is_decision(events: &[GameEvent]) -> bool {
    events.iter().any(|e| matches!(e, GameEvent::DecisionApplied { .. }))
}

fn respond(stdout: &mut io::Stdout, session: &GameSession, events: &[GameEvent]) -> Result<()> {
    let response = IpcResponse { events, state: session.snapshot() };
    writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(session: &GameSession, events: &[GameEvent]) {
    let metrics = session.metrics();
    let clock = session.clock();
    let generated = events
        .iter()
        .filter(|e| matches!(e, GameEvent::ScenarioPresented { source, .. }
            if *source == titan_core::provider::ScenarioSource::Generated))
        .count();
    let trades = events
        .iter()
        .filter(|e| matches!(e, GameEvent::TradeExecuted { .. }))
        .count();

    println!("=== GAME SUMMARY ===");
    println!("  session:        {}", session.session_id);
    println!("  seed:           {}", session.seed());
    println!("  final turn:     {}", clock.turn);
    println!("  final quarter:  {}", clock.quarter);
    println!("  decisions:      {}", session.history().len());
    println!("  generated:      {generated}");
    println!("  trades:         {trades}");
    println!("  outcome:        {}", session.phase().name());

    match session.ending() {
        Some(ending) => {
            if let titan_core::report::EndingSummary::Insolvency { headline, .. } = &ending {
                println!("  headline:       {headline}");
            }
            println!("  final value:    ${:.0}", ending.final_valuation());
        }
        None => println!("  (game did not reach an ending)"),
    }

    println!();
    println!("=== COMPANY ===");
    println!("  cash:           ${:.0}", metrics.cash);
    println!("  revenue/mo:     ${:.0}", metrics.monthly_revenue);
    println!("  burn/mo:        ${:.0}", metrics.monthly_burn);
    println!("  morale:         {:.1}", metrics.morale);
    println!("  csat:           {:.1}", metrics.customer_satisfaction);
    println!("  market share:   {:.1}%", metrics.market_share);
    println!("  risk:           {:.1}", metrics.risk);
    println!("  valuation:      ${:.0}", metrics.valuation);
    println!("  shares held:    {} (${:.0})", metrics.shares_held, session.market().portfolio_value(metrics.shares_held));
    println!("  stock price:    ${:.2}", session.stock_price());
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
