/// Bot settings loaded from TOML files and the environment
pub mod settings;

/// Tracing subscriber setup (console and log file)
pub mod logging;

pub use settings::{BotConfig, load_bot_configuration};
