//! gemnav plugin entry point.
//!
//! The host shell invokes this binary with `capabilities`, `help`, or
//! `run <command> <args...>`. Page output goes to stdout, one-line
//! diagnostics to stderr; exit status is 0 on success and 1 on any
//! reported failure.

mod commands;

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gemnav: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let registry = commands::registry();

    match args.first().map(String::as_str) {
        Some("capabilities") => {
            print!("{}", registry.capabilities());
            Ok(())
        },
        Some("help") | None => {
            print!("{}", registry.help());
            Ok(())
        },
        Some("run") => {
            let Some(name) = args.get(1) else {
                anyhow::bail!("usage: gemnav run <command> [args...]");
            };
            let rest: Vec<&str> = args[2..].iter().map(String::as_str).collect();
            let output = registry.run(name, &rest)?;
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        },
        Some(other) => {
            anyhow::bail!("unknown operation: {other} (expected capabilities, help, or run)")
        },
    }
}
