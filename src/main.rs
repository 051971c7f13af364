mod blockchain;
mod config;
mod report;
mod worker;

use log::{error, info};
use std::process;

use blockchain::Blockchain;
use config::{Config, OutputFormat};
use report::ChainReport;
use worker::Coordinator;

fn main() {
    env_logger::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    info!(
        "⛏️ Mining with {} workers at difficulty {} ({:?}, expecting {} blocks)",
        config.workers,
        config.difficulty,
        config.policy,
        config.policy.expected_appends(config.workers)
    );

    let chain = Blockchain::new(config.difficulty);
    let stats = match Coordinator::new(&chain, config.workers, config.policy).run() {
        Ok(stats) => stats,
        Err(e) => {
            error!("mining run failed: {e}");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let report = ChainReport::collect(&chain, stats);
    match config.output {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => match report.render_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
    }
}
