mod config;
mod data;
mod error;
mod occupancy;
mod server;
mod service;
mod solver;
mod store;

use crate::config::AppConfig;
use crate::data::Catalog;
use crate::service::TimetableService;
use crate::store::InMemoryTimetableStore;
use log::{error, info};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let catalog = match Catalog::load(&config.catalog_path) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let service = TimetableService::new(
        Arc::new(catalog),
        Arc::new(InMemoryTimetableStore::new()),
        config.grid,
    )
    .with_seed(config.seed);
    info!(
        "Grid: {} ({} slots per day)",
        service.grid().days.join(", "),
        service.grid().slots_per_day
    );

    if let Err(e) = server::run_server(config.bind, Arc::new(service)).await {
        error!("Server stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
