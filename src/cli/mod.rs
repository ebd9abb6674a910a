//! CLI layer: argument parsing and the single `run` entry point.

pub mod args;

pub use args::Args;

use clap::Parser;
use std::path::Path;

use calltree::{CallTreeBuilder, CallTreeError, FunctionDatabase, ModuleMapConfig, ModuleMapper};

pub fn run() {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cmd_analyze(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_analyze(args: Args) -> Result<(), CallTreeError> {
    let verbose = matches!(args.log_level.as_str(), "debug" | "trace");

    let module_mapper = match &args.module_map {
        Some(path) => Some(load_module_mapper(path)?),
        None => None,
    };

    let mut db = FunctionDatabase::new(module_mapper);
    db.build(Path::new(&args.dir), !args.no_cache, verbose)?;

    tracing::info!(stats = ?db.statistics(), "function database built");

    let source_directory = db.source_dir().map(|p| p.display().to_string());

    let mut builder = CallTreeBuilder::new(&db);
    let timestamp = iso8601_now();
    let result = builder.build(&args.start, args.max_depth, args.include_rte, verbose, timestamp, source_directory);

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| CallTreeError::InvalidConfig { message: format!("failed to serialize result: {}", e) })?;
    println!("{}", json);

    Ok(())
}

fn load_module_mapper(path: &str) -> Result<ModuleMapper, CallTreeError> {
    let text = std::fs::read_to_string(path)?;
    let config: ModuleMapConfig = serde_yaml::from_str(&text).map_err(|e| CallTreeError::InvalidConfig {
        message: format!("failed to parse module map '{}': {}", path, e),
    })?;
    ModuleMapper::from_config(&config)
}

/// Current UTC time as an RFC 3339 / ISO 8601 timestamp, e.g.
/// `2026-07-28T14:03:11Z`. No `chrono`/`time` dependency is carried for
/// one call site, so this hand-rolls the epoch-seconds-to-civil-date
/// conversion via Howard Hinnant's `civil_from_days` algorithm.
fn iso8601_now() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs() as i64;
    let days = secs.div_euclid(86_400);
    let time_of_day = secs.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    let hour = time_of_day / 3600;
    let minute = (time_of_day % 3600) / 60;
    let second = time_of_day % 60;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year, month, day, hour, minute, second
    )
}

/// Days-since-epoch to (year, month, day), proleptic Gregorian calendar.
/// http://howardhinnant.github.io/date_algorithms.html#civil_from_days
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = if month <= 2 { y + 1 } else { y };
    (year, month, day)
}
