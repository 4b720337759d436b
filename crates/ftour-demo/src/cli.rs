#![forbid(unsafe_code)]

//! Command-line argument parsing for the tour player.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `FTOUR_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
ftour demo: headless guided-tour player

USAGE:
    ftour-demo [OPTIONS]

OPTIONS:
    --tour=ID            Tour to play (default: violation-entry)
    --list               List registered tours as JSON and exit
    --json               Emit one JSON object per frame
    --step-ms=N          Time spent on each step in ms (default: 1200)
    --tours-dir=DIR      Also register every *.json descriptor in DIR
    --no-keyboard        Advance through overlay clicks instead of arrow keys
    --help, -h           Show this help message
    --version, -V        Show version

TOURS:
    violation-entry      Entering a violation notice
    address-overview     Tour the address overview
    commenting           Leave a comment on 5008 Queensbury

ENVIRONMENT VARIABLES:
    FTOUR_DEMO_TOUR        Override --tour
    FTOUR_DEMO_STEP_MS     Override --step-ms
    FTOUR_DEMO_JSON        Set to 1 for --json
    FTOUR_DEMO_TOURS_DIR   Override --tours-dir
    FTOUR_LOG              Log filter (e.g. debug, ftour=trace)
    FTOUR_LOG_FORMAT       Set to json for JSON log lines";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Tour id to play.
    pub tour: String,
    /// List tours instead of playing one.
    pub list: bool,
    /// JSON lines instead of text.
    pub json: bool,
    /// Dwell time per step.
    pub step_ms: u64,
    /// Extra descriptors to load.
    pub tours_dir: Option<PathBuf>,
    /// Use arrow keys to advance.
    pub keyboard: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            tour: "violation-entry".into(),
            list: false,
            json: false,
            step_ms: 1200,
            tours_dir: None,
            keyboard: true,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse command-line arguments and environment variables, exiting on
    /// `--help`, `--version` or a bad argument.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::from_args(&args, |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("ftour-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Environment variables take precedence over defaults but are
    /// overridden by explicit command-line flags.
    pub fn from_args(args: &[String], lookup: impl Fn(&str) -> Option<String>) -> Result<Command, String> {
        let mut opts = Self::default();

        if let Some(val) = lookup("FTOUR_DEMO_TOUR") {
            opts.tour = val;
        }
        if let Some(n) = lookup("FTOUR_DEMO_STEP_MS").and_then(|v| v.parse().ok()) {
            opts.step_ms = n;
        }
        if let Some(val) = lookup("FTOUR_DEMO_JSON") {
            opts.json = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Some(val) = lookup("FTOUR_DEMO_TOURS_DIR") {
            opts.tours_dir = Some(PathBuf::from(val));
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--list" => opts.list = true,
                "--json" => opts.json = true,
                "--no-keyboard" => opts.keyboard = false,
                other => {
                    if let Some(val) = other.strip_prefix("--tour=") {
                        opts.tour = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--step-ms=") {
                        opts.step_ms = val
                            .parse()
                            .map_err(|_| format!("Invalid --step-ms value: {val}"))?;
                    } else if let Some(val) = other.strip_prefix("--tours-dir=") {
                        opts.tours_dir = Some(PathBuf::from(val));
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }
}
