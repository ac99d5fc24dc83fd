use std::io;
use std::process::ExitCode;

use dilithium_bench::{run_configured, HarnessConfig, Phase, SecurityLevel};

fn main() -> ExitCode {
    let config = HarnessConfig::new(SecurityLevel::Level3, 50)
        .with_context(b"custom-run".as_slice());

    let report = match run_configured(config, &mut io::stdout()) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };

    if let Some(open) = report.phase(Phase::Verification) {
        println!(
            "\n{} verifications averaged {:.0} ns",
            report.iterations, open.summary.mean
        );
    }
    ExitCode::SUCCESS
}
