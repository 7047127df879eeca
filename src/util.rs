// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for the clock, logging setup, and man page rendering
// role: utilities/helpers
// inputs: Optional `now` override; verbosity flag; clap CommandFactory
// outputs: Effective `now`; installed tracing subscriber; man page text
// side_effects: init_logging installs the global subscriber (stderr)
// invariants:
// - RUST_LOG wins over --verbose; the default level is warn
// - effective_now is the only place that reads the system clock
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use clap::CommandFactory;
use tracing_subscriber::{fmt, EnvFilter};

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current time is used. Centralizes our handling of test
/// determinism without sprinkling `Utc::now()` throughout the code.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

fn log_filter(verbose: bool) -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

/// Install the stderr subscriber once; later calls are no-ops.
pub fn init_logging(verbose: bool) {
  let _ = fmt()
    .with_env_filter(log_filter(verbose))
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
