use std::{fs, io, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dis86::{decode::disassemble, emit::emit};

/// 8086-family disassembler and partial register simulator
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Raw machine-code image to decode
    input: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(&Args::parse()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let bytes = fs::read(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    tracing::debug!(bytes = bytes.len(), "loaded image");

    let disassembly = disassemble(&bytes);

    let stdout = io::stdout();
    emit(&mut stdout.lock(), &disassembly).context("cannot write listing")?;

    if let Some(error) = &disassembly.error {
        eprintln!("error: {error}");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
