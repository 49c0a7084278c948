use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::Parser;

const AT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Parser, Debug)]
#[command(name = "gua", version, about = "Deterministic divination with a verifiable trace")]
pub struct Cli {
    #[arg(long, short, help = "The question to divine")]
    pub question: String,
    #[arg(
        long,
        value_parser = parse_at,
        help = "Wall-clock time, YYYY-MM-DD HH:MM[:SS] (default: now)"
    )]
    pub at: Option<NaiveDateTime>,
    #[arg(long, help = "Optional nickname mixed into the numerology")]
    pub nickname: Option<String>,
    #[arg(
        long,
        value_parser = parse_entropy,
        help = "32-bit entropy, decimal or 0x hex (default: sampled from the clock)"
    )]
    pub entropy: Option<u32>,
    #[arg(long, help = "Config file (default: ~/.gua/config.toml)")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Print the execution trace")]
    pub trace: bool,
    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, help = "Replay the trace with paced delays before the result")]
    pub replay: bool,
    #[arg(long, help = "Re-check the trace hash chain and report it")]
    pub verify: bool,
}

impl Cli {
    /// Whether any requested output needs the recorded trace.
    #[must_use]
    pub fn wants_trace(&self) -> bool {
        self.trace || self.replay || self.verify
    }
}

pub fn parse_entropy(raw: &str) -> Result<u32, String> {
    let raw = raw.trim();
    let parsed = match raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse::<u32>(),
    };
    parsed.map_err(|err| format!("expected a 32-bit decimal or 0x hex value: {err}"))
}

pub fn parse_at(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    AT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DD HH:MM[:SS], got `{raw}`"))
}
