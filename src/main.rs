//! CLI entry point: parameter layering, SIGINT wiring, and the round.
//!
//! The binary owns everything the protocol treats as external: argument
//! and config-file parsing, the Ctrl-C handler that trips the
//! cancellation token, and the choice of narration destinations.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use overture::{
    run_round, CancelToken, Error, Narrator, RoundConfig, SeededSource, TeeNarrator,
};

const USAGE: &str = "\
usage: overture [-n N] [-s SEED] [-c FILE] [-o FILE]
  -n N      number of submitters (1..=1000, default 5)
  -s SEED   base seed for scores and think times (default: current time)
  -c FILE   read N and SEED from a config file (N=..., SEED=...)
  -o FILE   duplicate the narration into FILE
";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let config = match parse_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("overture: {e}");
        return ExitCode::from(2);
    }

    let narrator = match &config.log_file {
        Some(path) => match TeeNarrator::with_file(path) {
            Ok(narrator) => narrator,
            Err(e) => {
                eprintln!("overture: {}", Error::LogFile(e));
                return ExitCode::FAILURE;
            }
        },
        None => TeeNarrator::console(),
    };

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        handler_token.cancel();
    }) {
        eprintln!("overture: cannot install Ctrl-C handler: {e}");
        return ExitCode::FAILURE;
    }

    let source = SeededSource::new(config.seed);
    narrator.emit(&format!(
        "[main] starting round: {} submitters, seed {}",
        config.participants, config.seed
    ));

    match run_round(&config, &source, &narrator, &cancel) {
        Ok(result) if result.cancelled => {
            narrator.emit("[main] round cancelled by request");
            ExitCode::SUCCESS
        }
        Ok(result) => {
            narrator.emit(&format!("[main] round complete: {result}"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("overture: {e}");
            ExitCode::from(2)
        }
    }
}

/// Applies the three configuration layers: defaults, config file, then
/// explicit flags.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<RoundConfig, String> {
    let mut config_file: Option<PathBuf> = None;
    let mut participants: Option<usize> = None;
    let mut seed: Option<u32> = None;
    let mut log_file: Option<PathBuf> = None;

    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("overture: {name} requires a value"))
        };
        match flag.as_str() {
            "-n" => {
                participants = Some(
                    value("-n")?
                        .parse()
                        .map_err(|_| "overture: -n expects an integer".to_owned())?,
                );
            }
            "-s" => {
                seed = Some(
                    value("-s")?
                        .parse()
                        .map_err(|_| "overture: -s expects an unsigned integer".to_owned())?,
                );
            }
            "-c" => config_file = Some(PathBuf::from(value("-c")?)),
            "-o" => log_file = Some(PathBuf::from(value("-o")?)),
            other => return Err(format!("overture: unknown argument '{other}'")),
        }
    }

    let mut config = RoundConfig {
        seed: time_seed(),
        ..RoundConfig::default()
    };
    if let Some(path) = config_file {
        config
            .apply_file(&path)
            .map_err(|e| format!("overture: {e}"))?;
    }
    if let Some(n) = participants {
        config.participants = n;
    }
    if let Some(s) = seed {
        config.seed = s;
    }
    config.log_file = log_file;
    Ok(config)
}

fn time_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(1)
}
