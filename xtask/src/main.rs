use std::env;
use std::io::{self, Write};
use std::process::{Command, ExitCode};

const ITERATIONS_ENV: &str = "DILITHIUM_BENCH_ITERATIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Level2,
    Level3,
    Level5,
}

impl Level {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "2" | "l2" | "level2" | "ml-dsa-44" => Some(Self::Level2),
            "3" | "l3" | "level3" | "ml-dsa-65" => Some(Self::Level3),
            "5" | "l5" | "level5" | "ml-dsa-87" => Some(Self::Level5),
            _ => None,
        }
    }

    fn feature(self) -> &'static str {
        match self {
            Self::Level2 => "level2",
            Self::Level3 => "level3",
            Self::Level5 => "level5",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    level: Level,
    iterations: Option<u64>,
    cargo_args: Vec<String>,
}

fn print_usage() {
    eprintln!(
        "Usage: cargo run -p xtask -- <level> [iterations] [cargo-subcommand] [args...]"
    );
    eprintln!("  level: 2|3|5|level2|level3|level5");
    eprintln!("  iterations: positive integer baked into the build (default 10000)");
    eprintln!("  cargo-subcommand defaults to 'run --release'");
}

fn parse_args(args: Vec<String>) -> Result<Invocation, String> {
    let mut args = args.into_iter().peekable();
    let level_str = args.next().ok_or_else(|| "missing level".to_string())?;
    let level = Level::parse(&level_str.to_lowercase()).ok_or_else(|| {
        format!("Unknown level '{level_str}'. Expected 2, 3, or 5.")
    })?;

    let mut iterations = None;
    if let Some(next) = args.peek() {
        if next.chars().all(|c| c.is_ascii_digit()) {
            let value: u64 = next
                .parse()
                .map_err(|err| format!("invalid iteration count '{next}': {err}"))?;
            if value == 0 {
                return Err("iteration count must be non-zero".into());
            }
            iterations = Some(value);
            args.next();
        }
    }

    let mut remaining: Vec<String> = args.collect();
    if remaining.is_empty() {
        remaining = vec!["run".into(), "--release".into()];
    }

    let pass_through_split = remaining.iter().position(|arg| arg == "--");
    let mut passthrough = Vec::new();
    if let Some(idx) = pass_through_split {
        passthrough = remaining.split_off(idx);
    }

    let has_package_flag = remaining
        .iter()
        .any(|arg| arg == "-p" || arg == "--package");
    let mut cargo_args =
        Vec::with_capacity(remaining.len() + passthrough.len() + 8);
    let mut remaining = remaining.into_iter();
    if let Some(cmd) = remaining.next() {
        cargo_args.push(cmd);
    }
    if !has_package_flag {
        cargo_args.push("--package".into());
        cargo_args.push("dilithium-bench".into());
    }
    cargo_args.extend(remaining);
    cargo_args.push("--no-default-features".into());
    cargo_args.push("--features".into());
    cargo_args.push(level.feature().into());
    cargo_args.extend(passthrough);

    Ok(Invocation {
        level,
        iterations,
        cargo_args,
    })
}

fn main() -> ExitCode {
    let invocation = match parse_args(env::args().skip(1).collect()) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let mut command = Command::new("cargo");
    command.args(&invocation.cargo_args);
    if let Some(iterations) = invocation.iterations {
        command.env(ITERATIONS_ENV, iterations.to_string());
    }

    let status = match command.status() {
        Ok(status) => status,
        Err(err) => {
            let _ = writeln!(io::stderr(), "failed to spawn cargo: {err}");
            return ExitCode::FAILURE;
        }
    };

    if status.success() {
        ExitCode::SUCCESS
    } else {
        let _ = writeln!(io::stderr(), "cargo command failed: {status}");
        ExitCode::from(status.code().unwrap_or(1) as u8)
    }
}
