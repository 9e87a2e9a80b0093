#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use ping_bot::{bot, config, errors::Result};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file (non-fatal, env vars can be set externally)
    let dotenv_loaded = dotenv().is_ok();

    // 2. Load the bot configuration; it also decides where logs go
    let bot_config = config::load_bot_configuration()?;

    // 3. Initialize tracing
    let log_file = config::logging::init_tracing(bot_config.log_dir.as_deref())?;
    info!(dotenv_loaded, "Attempted to load .env file.");
    if let Some(path) = log_file {
        info!("Writing logs to {}", path.display());
    }
    info!("Loaded configuration: {:?}", bot_config);

    // 4. Run the bot until the gateway closes
    bot::service::run_bot(bot_config)
        .await
        .inspect_err(|e| error!("Bot stopped with an error: {}", e))
}
