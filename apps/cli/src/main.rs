#![deny(warnings)]

//! Headless CLI: generate a fleet, scrub or play the horizon, print KPIs.

use anyhow::{Context, Result};
use fleet_econ::Strategy;
use fleet_runtime::{HorizonController, PlaybackSpeed, Projection, Scenario};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    scenario: Option<String>,
    strategy: Option<String>,
    months: Option<u32>,
    seed: Option<u64>,
    count: Option<usize>,
    play: Option<String>,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next(),
            "--strategy" => args.strategy = it.next(),
            "--months" => args.months = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--count" => args.count = it.next().and_then(|s| s.parse().ok()),
            "--play" => args.play = it.next(),
            "--json" => args.json = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

fn print_table(p: &Projection) {
    println!(
        "{:<10} {:<18} {:>8} {:>7} {:>6} {:<12} {:<24} {:>12}",
        "ASSET", "MODEL", "HOURS", "HEALTH", "RISK", "STATUS", "CONDITION", "COST"
    );
    for s in &p.per_asset {
        let fault = s
            .active_fault
            .as_ref()
            .map(|f| format!(" [{} {}]", f.code, f.description))
            .unwrap_or_default();
        println!(
            "{:<10} {:<18} {:>8.0} {:>6.1}% {:>5.0}% {:<12} {:<24} {:>12}{}{}",
            s.asset_id,
            s.model,
            s.total_hours,
            s.health_percent,
            s.cumulative_risk * 100.0,
            s.status.to_string(),
            format!("{:?}", s.condition),
            s.accumulated_cost.round_dp(2).to_string(),
            if s.over_life { " OVER-LIFE" } else { "" },
            fault
        );
    }
}

fn print_kpis(p: &Projection) {
    let k = &p.kpis;
    println!(
        "KPI | {} | month {:>2} ({}) | opex: ${} | downtime: ${} | ROI: {:.1}% | critical: {} | health: {}%",
        p.strategy,
        p.horizon_months,
        p.projected_date.format("%Y-%m"),
        k.total_operating_expense.round_dp(2),
        k.total_downtime_cost.round_dp(2),
        k.return_on_investment_percent,
        k.critical_event_count,
        k.average_fleet_health_percent
    );
}

fn play(ctl: &mut HorizonController, speed: PlaybackSpeed, json: bool) -> Result<()> {
    ctl.play(speed);
    let mut last = Instant::now();
    while ctl.is_playing() {
        std::thread::sleep(ctl.tick_interval());
        let now = Instant::now();
        if ctl.advance(now - last)? > 0 {
            emit(ctl.projection(), json, false)?;
        }
        last = now;
    }
    Ok(())
}

fn emit(p: &Projection, json: bool, table: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(p)?);
    } else {
        if table {
            print_table(p);
        }
        print_kpis(p);
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    info!(?args, "starting CLI");

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path).with_context(|| format!("loading scenario {path}"))?,
        None => Scenario::default(),
    };
    if let Some(s) = &args.strategy {
        scenario.strategy = s.parse::<Strategy>()?;
    }
    if let Some(seed) = args.seed {
        scenario.seed = Some(seed);
    }
    if let Some(count) = args.count {
        scenario.fleet_size = count;
    }
    let months = args.months.unwrap_or(scenario.horizon_months);
    scenario.horizon_months = 0;

    let as_of = chrono::Local::now().date_naive();
    let mut ctl = scenario.build(as_of)?;

    let applied = ctl.set_horizon_clamped(months)?;
    if applied != months {
        warn!(requested = months, applied, "horizon clamped");
    }
    emit(ctl.projection(), args.json, true)?;

    if let Some(speed) = &args.play {
        let speed: PlaybackSpeed = speed.parse()?;
        play(&mut ctl, speed, args.json)?;
    }

    Ok(())
}
