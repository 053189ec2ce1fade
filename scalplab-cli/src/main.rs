//! ScalpLab CLI: run a backtest or a parameter sweep over a CSV of bars.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scalplab_core::ScalperConfig;
use scalplab_runner::{load_bars_csv, run_backtest, run_sweep, Summary};

#[derive(Parser)]
#[command(name = "scalplab", about = "Long-only futures swing-scalp backtester")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one backtest and print the summary.
    Run {
        /// CSV of bars: ts,open,high,low,close,volume (RFC 3339 timestamps).
        data: PathBuf,
        /// TOML config; validated defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Also print the trade ledger as JSON lines.
        #[arg(long)]
        trades: bool,
    },
    /// Sweep gate parameters (cooldown × Europe floor) over the same bars.
    Sweep {
        /// CSV of bars: ts,open,high,low,close,volume (RFC 3339 timestamps).
        data: PathBuf,
        /// TOML base config; validated defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Run { data, config, trades } => {
            let cfg: ScalperConfig = scalplab_runner::config::load_config(config.as_deref())?;
            let bars = load_bars_csv(&data)
                .with_context(|| format!("loading bars from {}", data.display()))?;
            println!("config:          {}", cfg.fingerprint());
            let (result, summary) = run_backtest(&bars, cfg)?;

            if trades {
                for trade in &result.trades {
                    println!("{}", serde_json::to_string(trade)?);
                }
            }
            print_summary(&summary);
        }
        Command::Sweep { data, config } => {
            let base = scalplab_runner::config::load_config(config.as_deref())?;
            let bars = load_bars_csv(&data)
                .with_context(|| format!("loading bars from {}", data.display()))?;

            let mut variants = Vec::new();
            for cooldown_bars in [6usize, 8, 10] {
                for europe_floor in [8.0f64, 8.5, 9.0] {
                    let mut cfg = base.clone();
                    cfg.gate.cooldown_bars = cooldown_bars;
                    cfg.gate.europe_floor = europe_floor;
                    variants.push((format!("cd{cooldown_bars}-eu{europe_floor}"), cfg));
                }
            }

            let mut rows = run_sweep(&bars, variants);
            rows.sort_by(|a, b| {
                b.summary
                    .net_pnl
                    .partial_cmp(&a.summary.net_pnl)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            println!(
                "{:<16} {:>7} {:>9} {:>8} {:>12} {:>12}",
                "variant", "trades", "win rate", "PF", "net P&L", "max DD"
            );
            for row in &rows {
                println!(
                    "{:<16} {:>7} {:>8.1}% {:>8.2} {:>12.2} {:>12.2}",
                    row.label,
                    row.summary.trades,
                    row.summary.win_rate_pct,
                    row.summary.profit_factor,
                    row.summary.net_pnl,
                    row.summary.max_drawdown,
                );
            }
        }
    }

    Ok(())
}

fn print_summary(s: &Summary) {
    println!("trades:          {}", s.trades);
    println!("win rate:        {:.1}% ({} wins / {} losses)", s.win_rate_pct, s.wins, s.losses);
    println!("profit factor:   {:.2}", s.profit_factor);
    println!("net P&L:         {:.2}", s.net_pnl);
    println!("expectancy:      {:.2} per trade", s.expectancy);
    println!("max drawdown:    {:.2}", s.max_drawdown);
    println!("partial fills:   {}", s.partial_fill_count);
    println!("final capital:   {:.2}", s.final_capital);
}
