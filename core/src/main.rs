use std::io::{self, Write};
use std::process::ExitCode;

use dilithium_bench::{run_configured, BenchError, HarnessConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dilithium_bench=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Print `err` once to `out` and map it to the process exit status.
fn report_failure<W: Write>(err: &BenchError, out: &mut W) -> ExitCode {
    debug!(exit_code = err.exit_code(), "benchmark aborted");
    let _ = writeln!(out, "{err}");
    ExitCode::from(err.exit_code())
}

fn main() -> ExitCode {
    init_tracing();

    let config = HarnessConfig::from_build();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run_configured(config, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err, &mut io::stderr()),
    }
}
