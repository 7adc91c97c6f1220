//! sim-runner: headless driver for the fire-sim engine.
//!
//! Usage:
//!   sim-runner --seed 12345 --months 480 --invest 8000
//!   sim-runner --seed 12345 --tempo 2 --realtime --review rebalance
//!   sim-runner --seed 12345 --ipc-mode
//!
//! The runner plays the collaborator role: it owns the tick timer, answers
//! annual reviews, and renders the event feed. The engine never sleeps.

use anyhow::Result;
use fire_sim_core::{
    command::PlayerCommand,
    config::SimConfig,
    event::Severity,
    format::{format_money, format_percent},
    portfolio_subsystem::PortfolioSubsystem,
    review::AnnualDecision,
    Lifecycle, PauseReason, SimEngine, SimError,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Tick tempos. Changing tempo restarts the driver; the engine is unaware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tempo {
    Normal,
    Double,
    Quadruple,
}

impl Tempo {
    fn from_multiplier(m: u32) -> Self {
        match m {
            2 => Tempo::Double,
            4 => Tempo::Quadruple,
            _ => Tempo::Normal,
        }
    }

    fn interval(&self) -> Duration {
        match self {
            Tempo::Normal    => Duration::from_millis(1000),
            Tempo::Double    => Duration::from_millis(500),
            Tempo::Quadruple => Duration::from_millis(200),
        }
    }
}

/// How the headless runner answers an annual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewPolicy {
    Skip,
    /// Raise the invest target to the affordable monthly surplus.
    Rebalance,
}

#[derive(serde::Serialize)]
struct IpcError {
    error: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let months = parse_arg(&args, "--months", 480u64);
    let tempo = Tempo::from_multiplier(parse_arg(&args, "--tempo", 1u32));
    let realtime = args.iter().any(|a| a == "--realtime");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let review = match find_arg(&args, "--review") {
        Some("rebalance") => ReviewPolicy::Rebalance,
        _ => ReviewPolicy::Skip,
    };
    let data_dir = find_arg(&args, "--data-dir");

    let mut config = match data_dir {
        Some(dir) => SimConfig::load(dir)?,
        None => SimConfig::default(),
    };
    if let Some(invest) = find_arg(&args, "--invest").and_then(|v| v.parse().ok()) {
        config.player.monthly_invest_target = invest;
    }

    let mut engine = SimEngine::new(config, seed)?;

    if ipc_mode {
        return run_ipc_loop(&mut engine);
    }

    println!("fire-sim — sim-runner");
    println!("  seed:      {seed}");
    println!("  months:    {months}");
    println!("  tempo:     {tempo:?}{}", if realtime { " (realtime)" } else { "" });
    println!("  review:    {review:?}");
    println!("  data_dir:  {}", data_dir.unwrap_or("(built-in)"));
    println!();

    run_batch(&mut engine, months, tempo, realtime, review)?;
    print_summary(&engine);
    Ok(())
}

fn run_batch(
    engine: &mut SimEngine,
    months: u64,
    tempo: Tempo,
    realtime: bool,
    review: ReviewPolicy,
) -> Result<()> {
    let mut cursor = engine.events().latest().map(|e| e.id).unwrap_or(0);
    print_events_since(engine, &mut cursor);

    let mut ticked = 0;
    while ticked < months {
        match engine.lifecycle() {
            Lifecycle::Running => {
                engine.advance_month()?;
                ticked += 1;
                print_events_since(engine, &mut cursor);
                if realtime {
                    std::thread::sleep(tempo.interval());
                }
            }
            Lifecycle::Paused { reason: PauseReason::AnnualReview } => {
                answer_review(engine, review)?;
                print_events_since(engine, &mut cursor);
            }
            Lifecycle::Paused { reason: PauseReason::Manual } => engine.resume()?,
            Lifecycle::Terminated { .. } => break,
        }
    }
    Ok(())
}

fn answer_review(engine: &mut SimEngine, policy: ReviewPolicy) -> Result<()> {
    if let Some(summary) = engine.pending_review() {
        let tags: Vec<&str> = summary.advisories.iter().map(|t| t.message()).collect();
        println!(
            "  ── review age {}: return {} | net worth {} ({}) | {}",
            summary.completed_age,
            format_percent(summary.compounded_return),
            format_money(summary.net_worth_end),
            format_percent(summary.net_worth_growth_rate),
            tags.join("; ")
        );
    }
    match policy {
        ReviewPolicy::Skip => engine.skip_annual_decision()?,
        ReviewPolicy::Rebalance => {
            let player = engine.player();
            let mut probe = player.clone();
            probe.monthly_invest_target = (player.monthly_salary - player.monthly_basic_expense).max(0.0);
            let target = PortfolioSubsystem::affordable_contribution(&probe);
            engine.apply_annual_decision(AnnualDecision {
                new_monthly_invest_target: Some(target),
                ..AnnualDecision::default()
            })?;
        }
    }
    Ok(())
}

fn print_events_since(engine: &SimEngine, cursor: &mut u64) {
    for entry in engine.events().since(*cursor) {
        let marker = match entry.severity {
            Severity::Info => " ",
            Severity::Warning => "!",
            Severity::Milestone => "*",
        };
        println!("[{:>7}] {marker} {}", entry.label, entry.text);
        *cursor = entry.id;
    }
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
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
        let line = buffer.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        let reply = match serde_json::from_str::<PlayerCommand>(line) {
            Ok(command) => match engine.execute(command) {
                Ok(_) => engine.snapshot(50).to_json()?,
                Err(e) => ipc_error(&e)?,
            },
            Err(e) => serde_json::to_string(&IpcError { error: e.to_string() })?,
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn ipc_error(e: &SimError) -> Result<String> {
    log::warn!("command rejected: {e}");
    Ok(serde_json::to_string(&IpcError { error: e.to_string() })?)
}

fn print_summary(engine: &SimEngine) {
    let player = engine.player();
    let history = engine.history();

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  session:        {}", engine.session_id);
    println!("  state:          {}", engine.lifecycle());
    println!("  months:         {}", player.clock.total_months_elapsed);
    println!("  age:            {}", player.clock.age_years);
    println!("  cash:           {}", format_money(player.cash));
    println!("  invested:       {}", format_money(player.invested_value));
    println!("  cost basis:     {}", format_money(player.invested_cost_basis));
    println!(
        "  profit:         {} ({})",
        format_money(player.invested_profit()),
        format_percent(player.invested_profit_rate())
    );
    println!("  net worth:      {}", format_money(player.net_worth()));
    println!("  FIRE progress:  {:.1}%", player.fire_progress() * 100.0);

    println!();
    println!("=== ANNUAL RETURNS (Last 5 Years) ===");
    if history.annual_returns.is_empty() {
        println!("  (No years completed yet)");
    } else {
        let recent: Vec<_> = history.annual_returns.iter().rev().take(5).collect();
        for year in recent.iter().rev() {
            println!("  age {:>3} | {}", year.age_years, format_percent(year.compounded_return));
        }
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
