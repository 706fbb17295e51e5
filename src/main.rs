use std::error::Error;

use dotenvy::dotenv;
use tracing::info;

mod admin;
mod analysis;
mod config;
mod db;
mod handlers;
mod llm;
mod server;
mod state;
mod style;
#[cfg(test)]
mod test_support;
mod utils;

use admin::{parse_admin_args, run_admin_command};
use config::CONFIG;
use db::database::Database;
use state::AppState;
use utils::logging::init_logging;

type MainResult = Result<(), Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> MainResult {
    dotenv().ok();
    let _guards = init_logging();

    let args: Vec<String> = std::env::args().collect();
    let admin_command = parse_admin_args(&args)?;

    let db = Database::init(&CONFIG.database_url).await?;
    let state = AppState::from_config(db, &CONFIG);

    if let Some(command) = admin_command {
        run_admin_command(command, &state).await?;
        return Ok(());
    }

    info!(
        "Starting sellerhood-style-service (model {}, analysis timeout {:?})",
        CONFIG.gemini_analysis_model,
        CONFIG.analysis_timeout()
    );
    server::serve(state, &CONFIG.bind_address).await?;
    info!("Server stopped");
    Ok(())
}
