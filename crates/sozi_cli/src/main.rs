// SPDX-License-Identifier: MIT OR Apache-2.0
//! `sozi-frames`: list and edit the frames of a Sozi presentation.

mod cli;
mod commands;

use clap::Parser;
use cli::Args;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity);

    tracing::debug!("Starting sozi-frames v{}", env!("CARGO_PKG_VERSION"));
    commands::run(&args)
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flag
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("sozi={level}")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
