//! Binary entrypoint: read one snapshot JSON from stdin, write one AnalysisResult
//! JSON object to stdout.
//!
//! Logs go to stderr (`RUST_LOG`, default `health_engine=info,warn`). On any
//! failure the error is printed to stderr and the process exits with 1.

use health_engine::analyze_json;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("health_engine=info,warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run_binary() {
    let _ = writeln!(io::stderr(), "health-engine: error: {}", e);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), Box<dyn std::error::Error>> {
  let mut input = String::new();
  io::stdin().lock().read_to_string(&mut input)?;

  let result = analyze_json(input.trim(), chrono::Utc::now())?;

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  serde_json::to_writer(&mut out, &result)?;
  writeln!(out)?;
  out.flush()?;
  Ok(())
}
