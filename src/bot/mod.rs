//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord side of the bot: the slash command table,
//! the interaction dispatcher hooks, guild command registration and the
//! service that owns the gateway client.

/// Discord command implementations
pub mod commands;
/// Discord interaction handlers (failure reporting, registration)
pub mod handlers;
/// Client construction and the process host loop
pub mod service;

use crate::{
    bot::handlers::registration::RegistrationReport, config::BotConfig,
    core::lifecycle::Lifecycle, errors::Error,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared data available to all bot commands.
#[derive(Debug)]
pub struct BotData {
    /// Validated bot configuration
    pub config: Arc<BotConfig>,
    /// Host lifecycle handle
    pub lifecycle: Lifecycle,
    /// Where registration tasks send their outcome
    pub reports: mpsc::UnboundedSender<RegistrationReport>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(
        config: Arc<BotConfig>,
        lifecycle: Lifecycle,
        reports: mpsc::UnboundedSender<RegistrationReport>,
    ) -> Self {
        Self {
            config,
            lifecycle,
            reports,
        }
    }
}

/// Poise context used by every command and hook.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

pub use commands::*;
pub use handlers::*;
