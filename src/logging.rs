//! stderr logging for the operator channel.
//!
//! Filter precedence: `RUST_LOG`, then `ARCHLINK_LOG`, then the level implied
//! by `-v`/`-q`. `ARCHLINK_LOG_FORMAT=json` switches to one JSON object per line.

use std::env;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn wants_json(value: Option<String>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("ARCHLINK_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);

    let result = if wants_json(env::var("ARCHLINK_LOG_FORMAT").ok()) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = result {
        eprintln!("archlink: logging already initialized: {err}");
    }
}
