use anyhow::Result;
use clap::Parser;

mod arrange;
mod cli;
mod comments;
mod error;
mod extract;
mod hierarchy;
mod model;
mod params;
mod process;
mod render;
mod stats;
mod util;
mod window;

use crate::cli::{normalize, Cli};

fn main() -> Result<()> {
  let cli = Cli::parse();
  util::init_logging(cli.verbose);

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: resolve now
  let tz = window::parse_timezone(&cfg.tz)?;
  let now = util::effective_now(window::parse_now_override(cfg.now_override.as_deref(), tz));
  tracing::debug!(%now, week = ?cfg.week, "resolved clock");

  // Phase 3: load, process, and report
  process::process(&cfg, now)
}
