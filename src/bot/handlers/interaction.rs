//! Interaction dispatcher hooks.
//!
//! poise resolves each incoming slash command against the command table and
//! runs it. This module plugs into the two places where the outcome becomes
//! visible: [`log_executed`] runs after every executed command, [`on_error`]
//! receives every failure. [`record_receipt`] stamps the receipt time before
//! the command body runs. Command failures are classified into a
//! [`FailureKind`], logged, and answered with exactly one ephemeral
//! `失敗: <reason>` message.

use crate::{
    bot::{BotData, Context},
    core::{
        failure::{Failure, FailureKind},
        latency::{ReceivedAt, display_name},
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::future::Future;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{error, info};

/// Something that can answer an interaction.
///
/// Discord accepts one initial response per interaction; anything after that
/// has to be a follow-up.
pub trait Responder {
    /// Whether the initial response has already been sent.
    fn has_responded(&self) -> bool;

    /// Sends the initial response, visible only to the invoking user.
    fn respond_ephemeral(&self, content: String) -> impl Future<Output = Result<()>> + Send;

    /// Sends a follow-up message, visible only to the invoking user.
    fn follow_up_ephemeral(&self, content: String) -> impl Future<Output = Result<()>> + Send;
}

impl Responder for poise::Context<'_, BotData, Error> {
    fn has_responded(&self) -> bool {
        match self {
            poise::Context::Application(ctx) => ctx.has_sent_initial_response.load(Ordering::SeqCst),
            poise::Context::Prefix(_) => false,
        }
    }

    async fn respond_ephemeral(&self, content: String) -> Result<()> {
        match self {
            poise::Context::Application(ctx) => {
                let response = serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content(content)
                        .ephemeral(true),
                );
                ctx.interaction
                    .create_response(self.serenity_context(), response)
                    .await?;
                ctx.has_sent_initial_response.store(true, Ordering::SeqCst);
            }
            poise::Context::Prefix(_) => {
                self.say(content).await?;
            }
        }
        Ok(())
    }

    async fn follow_up_ephemeral(&self, content: String) -> Result<()> {
        match self {
            poise::Context::Application(ctx) => {
                let follow_up = serenity::CreateInteractionResponseFollowup::new()
                    .content(content)
                    .ephemeral(true);
                ctx.interaction
                    .create_followup(self.serenity_context(), follow_up)
                    .await?;
            }
            poise::Context::Prefix(_) => {
                self.say(content).await?;
            }
        }
        Ok(())
    }
}

/// Sends the failure message for `failure`: as the initial response when the
/// interaction has not been answered yet, as a follow-up otherwise.
pub async fn report_failure<R>(responder: &R, failure: &Failure) -> Result<()>
where
    R: Responder + Sync,
{
    let content = failure.user_message();
    if responder.has_responded() {
        responder.follow_up_ephemeral(content).await
    } else {
        responder.respond_ephemeral(content).await
    }
}

/// Failure for an error returned by a command handler.
#[must_use]
pub fn handler_failure(error: &Error) -> Failure {
    Failure::new(error.failure_kind(), error.to_string())
}

/// Command-scoped framework error, detached from the poise context.
#[derive(Debug)]
pub enum Fault<'a> {
    /// The command handler returned an error
    Handler(&'a Error),
    /// The command handler panicked
    Panic(Option<&'a str>),
    /// An argument could not be parsed into its parameter type
    ArgumentParse {
        /// Parser error
        error: &'a (dyn std::error::Error + Send + Sync),
        /// Raw argument text, when known
        input: Option<&'a str>,
    },
    /// A parent command was invoked without a subcommand
    SubcommandRequired,
    /// Interaction data did not match the registered command
    StructureMismatch(&'static str),
    /// A command check returned false or an error
    CheckFailed(Option<&'a Error>),
    /// The command is on cooldown
    Cooldown(Duration),
    /// The bot lacks permissions in the channel
    MissingBotPermissions(serenity::Permissions),
    /// The user lacks permissions, `None` if they could not be fetched
    MissingUserPermissions(Option<serenity::Permissions>),
    /// Owner-only command used by someone else
    NotAnOwner,
    /// Guild-only command used in DMs
    GuildOnly,
    /// DM-only command used in a guild
    DmOnly,
    /// NSFW-only command used in a regular channel
    NsfwOnly,
}

impl<'a> Fault<'a> {
    /// Extracts the command-scoped part of a framework error.
    ///
    /// Returns `None` for errors that do not belong to a single command
    /// invocation (setup, event handlers, unknown interactions).
    #[must_use]
    pub fn from_framework_error(
        error: &'a poise::FrameworkError<'_, BotData, Error>,
    ) -> Option<Self> {
        use poise::FrameworkError as Fe;

        let fault = match error {
            Fe::Command { error, .. } => Self::Handler(error),
            Fe::CommandPanic { payload, .. } => Self::Panic(payload.as_deref()),
            Fe::ArgumentParse { error, input, .. } => Self::ArgumentParse {
                error: &**error,
                input: input.as_deref(),
            },
            Fe::SubcommandRequired { .. } => Self::SubcommandRequired,
            Fe::CommandStructureMismatch { description, .. } => {
                Self::StructureMismatch(*description)
            }
            Fe::CommandCheckFailed { error, .. } => Self::CheckFailed(error.as_ref()),
            Fe::CooldownHit {
                remaining_cooldown, ..
            } => Self::Cooldown(*remaining_cooldown),
            Fe::MissingBotPermissions {
                missing_permissions,
                ..
            } => Self::MissingBotPermissions(*missing_permissions),
            Fe::MissingUserPermissions {
                missing_permissions,
                ..
            } => Self::MissingUserPermissions(*missing_permissions),
            Fe::NotAnOwner { .. } => Self::NotAnOwner,
            Fe::GuildOnly { .. } => Self::GuildOnly,
            Fe::DmOnly { .. } => Self::DmOnly,
            Fe::NsfwOnly { .. } => Self::NsfwOnly,
            _ => return None,
        };
        Some(fault)
    }

    /// Whether the command body actually ran (and so counts as executed).
    #[must_use]
    pub const fn command_ran(&self) -> bool {
        matches!(self, Self::Handler(_) | Self::Panic(_))
    }

    /// Classifies the fault and words the reason for the user.
    #[must_use]
    pub fn into_failure(self) -> Failure {
        match self {
            Self::Handler(error) => handler_failure(error),
            Self::Panic(payload) => Failure::new(
                FailureKind::Exception,
                payload.unwrap_or("The command panicked"),
            ),
            Self::ArgumentParse { error, input } => {
                let reason = match input {
                    Some(input) => format!("Could not convert {input:?}: {error}"),
                    None => error.to_string(),
                };
                Failure::new(FailureKind::ConvertFailed, reason)
            }
            Self::SubcommandRequired => {
                Failure::new(FailureKind::BadArgs, "A subcommand is required")
            }
            Self::StructureMismatch(description) => {
                Failure::new(FailureKind::ParseFailed, description)
            }
            Self::CheckFailed(error) => Failure::new(
                FailureKind::UnmetPrecondition,
                error.map_or_else(|| "A command check failed".to_string(), ToString::to_string),
            ),
            Self::Cooldown(remaining) => Failure::new(
                FailureKind::UnmetPrecondition,
                format!(
                    "Please wait {:.1} seconds before using this command again",
                    remaining.as_secs_f32()
                ),
            ),
            Self::MissingBotPermissions(permissions) => Failure::new(
                FailureKind::UnmetPrecondition,
                format!("The bot is missing these permissions: {permissions}"),
            ),
            Self::MissingUserPermissions(permissions) => Failure::new(
                FailureKind::UnmetPrecondition,
                permissions.map_or_else(
                    || "Your permissions could not be verified".to_string(),
                    |permissions| format!("You are missing these permissions: {permissions}"),
                ),
            ),
            Self::NotAnOwner => Failure::new(
                FailureKind::UnmetPrecondition,
                "Only bot owners can use this command",
            ),
            Self::GuildOnly => Failure::new(
                FailureKind::UnmetPrecondition,
                "This command only works in servers",
            ),
            Self::DmOnly => Failure::new(
                FailureKind::UnmetPrecondition,
                "This command only works in direct messages",
            ),
            Self::NsfwOnly => Failure::new(
                FailureKind::UnmetPrecondition,
                "This command only works in NSFW channels",
            ),
        }
    }
}

/// Classifies command-scoped framework errors.
#[must_use]
pub fn classify(error: &poise::FrameworkError<'_, BotData, Error>) -> Option<Failure> {
    Fault::from_framework_error(error).map(Fault::into_failure)
}

/// Logs a classified failure and answers the interaction.
async fn handle_command_failure(ctx: Context<'_>, failure: &Failure) {
    let author = ctx.author();
    info!(
        kind = %failure.kind,
        reason = %failure.reason,
        user_id = %author.id,
        guild_id = ctx.guild_id().map_or(0, |id| id.get()),
        channel_id = %ctx.channel_id(),
        command = %ctx.command().qualified_name,
        "[command failed] {} - {}",
        failure.kind,
        failure.reason
    );

    if let Err(e) = report_failure(&ctx, failure).await {
        error!(
            user_id = %author.id,
            channel_id = %ctx.channel_id(),
            "Failed to send failure message: {}",
            e
        );
    }
}

/// Failure boundary installed as poise's `on_error` hook.
///
/// Never panics; every error ends in a log line and, for command failures,
/// one ephemeral reply. Commands whose body ran are also logged as executed.
pub async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    if let (Some(fault), Some(ctx)) = (Fault::from_framework_error(&error), error.ctx()) {
        if fault.command_ran() {
            log_executed(ctx).await;
        }
        handle_command_failure(ctx, &fault.into_failure()).await;
        return;
    }

    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to set up bot: {}", error);
        }
        poise::FrameworkError::EventHandler { error, .. } => {
            error!("Error in event handler: {}", error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Stamps the local receipt time on the invocation. Installed as poise's
/// `pre_command` hook; `/ping` measures its API latency from this instant.
pub async fn record_receipt(ctx: Context<'_>) {
    ctx.set_invocation_data(ReceivedAt::now()).await;
}

/// Logs an executed command. Installed as poise's `post_command` hook and
/// called from [`on_error`] for commands that ran but failed.
pub async fn log_executed(ctx: Context<'_>) {
    let author = ctx.author();
    let command = ctx.command();
    info!(
        user = display_name(author.global_name.as_deref(), &author.name),
        user_id = %author.id,
        module = command.category.as_deref().unwrap_or("-"),
        method = %command.identifying_name,
        guild_id = ctx.guild_id().map_or(0, |id| id.get()),
        channel_id = %ctx.channel_id(),
        "[command executed]"
    );
}
