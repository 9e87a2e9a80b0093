//! Guild-scoped slash command registration.
//!
//! Registration runs in its own task each time the gateway reports ready:
//! once after login, and again whenever a reconnect opens a new session
//! (resumed sessions do not send Ready). A task never retries; its outcome
//! travels back to the host as a [`RegistrationReport`] so a failure is logged
//! without taking the bot offline.

use crate::{
    bot::BotData,
    core::lifecycle::{HostState, Lifecycle},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{error, info, warn};

/// Outcome of one registration attempt.
#[derive(Debug)]
pub struct RegistrationReport {
    /// Guild id as configured
    pub guild_id: Option<String>,
    /// Number of commands Discord accepted
    pub result: Result<usize>,
}

/// Parses the configured guild id.
pub fn parse_guild_id(raw: Option<&str>) -> Result<serenity::GuildId> {
    let raw = raw.ok_or_else(|| Error::GuildId("no guild id configured".to_string()))?;
    let id: u64 = raw
        .trim()
        .parse()
        .map_err(|e| Error::GuildId(format!("{raw:?}: {e}")))?;
    if id == 0 {
        return Err(Error::GuildId(format!("{raw:?}: must not be zero")));
    }
    Ok(serenity::GuildId::new(id))
}

/// Replaces the guild's application commands with `commands`.
pub async fn register_guild_commands(
    http: Arc<serenity::Http>,
    guild_id: Option<&str>,
    commands: Vec<serenity::CreateCommand>,
) -> Result<usize> {
    let guild_id = parse_guild_id(guild_id)?;
    let registered = guild_id.set_commands(&http, commands).await?;
    Ok(registered.len())
}

/// Spawns the registration task. The outcome is sent on `reports`.
pub fn spawn_registration(
    http: Arc<serenity::Http>,
    guild_id: Option<String>,
    commands: Vec<serenity::CreateCommand>,
    reports: mpsc::UnboundedSender<RegistrationReport>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = register_guild_commands(http, guild_id.as_deref(), commands).await;
        if reports.send(RegistrationReport { guild_id, result }).is_err() {
            warn!("Host stopped before the command registration finished");
        }
    })
}

/// Moves the host to `Registering` and spawns a registration task.
///
/// Returns `None` without registering when the host cannot start a
/// registration from its current state (shutting down, or a registration is
/// already in flight).
pub fn begin_registration(
    data: &BotData,
    http: Arc<serenity::Http>,
    commands: Vec<serenity::CreateCommand>,
) -> Option<JoinHandle<()>> {
    if let Err(e) = data.lifecycle.transition(HostState::Registering) {
        info!("Skipping command registration: {}", e);
        return None;
    }

    info!("Registering commands in guild...");
    Some(spawn_registration(
        http,
        data.config.guild_id.clone(),
        commands,
        data.reports.clone(),
    ))
}

/// Gateway event hook installed as poise's `event_handler`.
///
/// Every Ready event starts a registration, so commands are registered again
/// after a reconnect that opened a new session.
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    if let serenity::FullEvent::Ready { data_about_bot } = event {
        info!("Logged in as {}", data_about_bot.user.name);
        let commands = poise::builtins::create_application_commands(&framework.options.commands);
        begin_registration(data, Arc::clone(&ctx.http), commands);
    }
    Ok(())
}

/// Logs a registration outcome and moves the host to `Running`.
///
/// Failures are logged and swallowed; the bot keeps serving interactions with
/// whatever commands Discord already knows.
pub fn handle_registration_report(lifecycle: &Lifecycle, report: RegistrationReport) {
    let guild_id = report.guild_id.as_deref().unwrap_or("<unset>");
    match report.result {
        Ok(count) => info!(guild_id, count, "Registered commands in guild"),
        Err(e) => error!(guild_id, "Failed to register commands in guild: {}", e),
    }

    if lifecycle.current() == HostState::Registering {
        lifecycle.transition(HostState::Running).ok();
    }
}
