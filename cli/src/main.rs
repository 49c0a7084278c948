//! Gua CLI - runs one divination and prints the result, optionally with its
//! trace.
//!
//! ```text
//! main() -> Cli::parse() -> load config -> divine[_with_trace]() -> render
//!                                                   |
//!                                                   v
//!                                   --replay: paced trace, then result
//! ```

mod cli;
mod render;

use std::{
    thread,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gua_config::GuaConfig;
use gua_engine::{
    DEFAULT_PLAYBACK_MS, DivinationInput, EntropyPool, REVEAL_PAUSE, TraceEvent, divine,
    divine_with_trace, playback_delays, verify_trace,
};

use crate::cli::Cli;
use crate::render::JsonOutput;

const CLOCK_SAMPLES: u32 = 16;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("GUA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

/// Entropy when none is given: clock readings fed through the same pool the
/// pointer sampler uses.
fn clock_entropy() -> u32 {
    let start = Instant::now();
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let nanos = wall.subsec_nanos();

    let mut pool = EntropyPool::new();
    pool.observe((wall.as_secs() & 0xffff) as i32, (nanos >> 16) as i32, 0.0);
    for i in 0..CLOCK_SAMPLES {
        let elapsed = start.elapsed();
        let jitter = elapsed.subsec_nanos() ^ nanos.rotate_left(i);
        pool.observe(
            (jitter & 0x7ff) as i32,
            ((jitter >> 11) & 0x7ff) as i32,
            elapsed.as_secs_f64() * 1000.0 + f64::from(i),
        );
    }
    pool.value()
}

fn load_config(cli: &Cli) -> Result<GuaConfig> {
    match &cli.config {
        Some(path) => GuaConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => GuaConfig::load().with_context(|| {
            let path = GuaConfig::path().map_or_else(
                || "~/.gua/config.toml".to_string(),
                |p| p.display().to_string(),
            );
            format!("loading config from {path}")
        }),
    }
}

fn replay(trace: &[TraceEvent], entropy: u32, total_ms: u64) {
    let delays = playback_delays(trace, entropy, total_ms);
    for (event, delay) in trace.iter().zip(delays) {
        thread::sleep(delay);
        if !event.is_group_end() {
            println!("{}", render::event_line(event));
        }
    }
    thread::sleep(REVEAL_PAUSE);
}

fn run(cli: &Cli) -> Result<()> {
    if cli.question.trim().is_empty() {
        bail!("question must not be empty");
    }
    let config = load_config(cli)?;
    let at = cli
        .at
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let entropy = cli.entropy.unwrap_or_else(clock_entropy);

    let mut input = DivinationInput::new(cli.question.clone(), at);
    if let Some(nickname) = &cli.nickname {
        input = input.with_nickname(nickname.clone());
    }
    tracing::debug!(%at, entropy, "divining");

    let (result, trace) = if cli.wants_trace() {
        let traced = divine_with_trace(&input, entropy, &config.divination)?;
        (traced.result, Some(traced.trace))
    } else {
        (divine(&input, entropy, &config.divination)?, None)
    };

    let report = match (&trace, cli.verify) {
        (Some(trace), true) => {
            Some(verify_trace(trace).context("trace failed its own verification")?)
        }
        _ => None,
    };

    if cli.json {
        let output = JsonOutput {
            entropy,
            result: &result,
            trace: trace.as_deref().filter(|_| cli.trace || cli.replay),
            verify: report.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Some(trace) = &trace {
        if cli.replay {
            let total_ms = config.playback_total_ms.unwrap_or(DEFAULT_PLAYBACK_MS);
            replay(trace, entropy, total_ms);
        } else if cli.trace {
            for event in trace.iter().filter(|e| !e.is_group_end()) {
                println!("{}", render::event_line(event));
            }
        }
        if cli.trace || cli.replay {
            println!();
        }
    }
    print!("{}", render::result_text(&result, entropy));
    if let Some(report) = &report {
        println!("{}", render::report_text(report));
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(&cli)
}
