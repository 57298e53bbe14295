use std::{path::Path, process::ExitCode};

use clap::Parser;

use crate::config::{RemapConfig, ROUTE_FILE};

mod config;
mod date_map;
mod document;
mod error;
mod pipeline;
mod record;
mod schedule;

fn main() -> ExitCode {
    env_logger::init();
    let config = RemapConfig::parse();
    log::debug!("{config:?}");

    match pipeline::run(&config, Path::new(ROUTE_FILE)) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::debug!("{error:?}");
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
