#![forbid(unsafe_code)]

//! ftour demo binary entry point.

use std::process;
use std::time::Duration;

use ftour_core::config::TourConfig;
use ftour_core::logging::{self, LOG_ENV};
use ftour_demo::cli;
use ftour_demo::player::{Frame, TourPlayer};
use ftour_demo::{site, tours};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let opts = cli::Opts::parse();

    let mut catalog = tours::builtin_catalog();
    if let Some(dir) = &opts.tours_dir {
        match tours::load_dir(&mut catalog, dir) {
            Ok(ids) => tracing::info!(dir = %dir.display(), count = ids.len(), "loaded tour descriptors"),
            Err(e) => {
                eprintln!("Cannot read {}: {e}", dir.display());
                process::exit(1);
            }
        }
    }

    if opts.list {
        println!("{}", catalog.summaries_json());
        return;
    }

    let tour = match catalog.get(&opts.tour) {
        Ok(tour) => tour,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let mut config = TourConfig::from_env();
    if !opts.keyboard {
        config = config.without_keyboard_navigation();
    }
    let mut player = TourPlayer::new(site::build(), config, Duration::from_millis(opts.step_ms));

    let json = opts.json;
    let result = player.play(tour, |frame| {
        if json {
            match serde_json::to_string(frame) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "frame serialization failed"),
            }
        } else {
            println!("{}", describe(frame));
        }
    });

    match result {
        Ok(report) => {
            let outcome = if report.finished() { "finished" } else { "stopped" };
            eprintln!(
                "{}: {outcome} after {} of {} steps ({} without a target)",
                report.tour,
                report.frames.len(),
                tour.steps.len(),
                report.placeholders().count(),
            );
            if !report.finished() {
                process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("Tour error: {e}");
            process::exit(1);
        }
    }
}

fn describe(frame: &Frame) -> String {
    let target = match frame.highlight {
        Some([left, top, width, height]) => format!("{left},{top} {width}x{height}"),
        None => "no target".to_owned(),
    };
    format!(
        "[{:>2}/{}] {:<40} {:<6} tooltip ({}, {})  {}  {}",
        frame.index + 1,
        frame.count,
        frame.label,
        frame.placement,
        frame.tooltip_left,
        frame.tooltip_top,
        target,
        frame.route.as_deref().unwrap_or("-"),
    )
}

/// Text logs on stderr, or JSON lines with `FTOUR_LOG_FORMAT=json`.
fn init_logging() {
    if std::env::var("FTOUR_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        logging::init_json();
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();
}
