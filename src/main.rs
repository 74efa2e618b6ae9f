mod cli;
mod config;
mod manifest;
mod model;
mod plan;
mod remediate;
mod report;
mod score;
mod storage;
mod summary;

use std::{io, process};

use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr; stdout carries JSON output only.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gauge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli::run() {
        Ok(exit) => process::exit(exit.code()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
