//! Process host.
//!
//! Builds the poise framework and the serenity client, then drives the
//! gateway until it closes. While the gateway runs, the host also receives
//! registration reports and waits for a shutdown signal; on shutdown it asks
//! every shard to disconnect and keeps awaiting the gateway future so in-flight
//! replies can finish.

use crate::{
    bot::{
        BotData, commands,
        handlers::{
            interaction::{log_executed, on_error, record_receipt},
            registration::{RegistrationReport, handle_event, handle_registration_report},
        },
    },
    config::BotConfig,
    core::lifecycle::{HostState, Lifecycle},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// Gateway intents requested by the bot.
#[must_use]
pub fn gateway_intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_PRESENCES
        | serenity::GatewayIntents::MESSAGE_CONTENT
}

/// Builds the poise framework with the command table and dispatcher hooks.
///
/// Setup only assembles [`BotData`]; guild command registration starts from
/// the event handler on every Ready event and reports on `reports`.
pub fn build_framework(
    config: Arc<BotConfig>,
    lifecycle: Lifecycle,
    reports: mpsc::UnboundedSender<RegistrationReport>,
) -> poise::Framework<BotData, Error> {
    poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            pre_command: |ctx| Box::pin(record_receipt(ctx)),
            post_command: |ctx| Box::pin(log_executed(ctx)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |_ctx, _ready, _framework| {
            Box::pin(async move { Ok(BotData::new(config, lifecycle, reports)) })
        })
        .build()
}

/// Warning for a configured proxy: it carries Discord HTTP requests only.
#[must_use]
pub fn proxy_notice(proxy_url: Option<&str>) -> Option<String> {
    proxy_url.map(|proxy| {
        format!(
            "Proxy {proxy} only covers Discord HTTP requests; the gateway WebSocket connects directly"
        )
    })
}

/// Builds the serenity client, routing HTTP requests through the configured
/// proxy when there is one.
pub async fn build_client(
    config: &BotConfig,
    framework: poise::Framework<BotData, Error>,
) -> Result<serenity::Client> {
    let intents = gateway_intents();
    if let Some(notice) = proxy_notice(config.proxy_url.as_deref()) {
        warn!("{}", notice);
    }
    let builder = match &config.proxy_url {
        Some(proxy) => {
            info!("Routing Discord HTTP requests through {}", proxy);
            let http = serenity::HttpBuilder::new(&config.token)
                .proxy(proxy.clone())
                .build();
            serenity::ClientBuilder::new_with_http(http, intents)
        }
        None => serenity::ClientBuilder::new(&config.token, intents),
    };

    Ok(builder.framework(framework).await?)
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// Runs the bot until the gateway closes.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    let config = Arc::new(config);
    let lifecycle = Lifecycle::new();
    let (reports_tx, mut reports_rx) = mpsc::unbounded_channel();

    let framework = build_framework(Arc::clone(&config), lifecycle.clone(), reports_tx);

    info!("Setting up Serenity client for Poise framework...");
    let mut client = build_client(&config, framework)
        .await
        .inspect_err(|e| error!("Error creating client: {}", e))?;
    let shard_manager = Arc::clone(&client.shard_manager);

    info!("Starting bot client...");
    let gateway = client.start();
    tokio::pin!(gateway);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut stopping = false;

    let outcome = loop {
        tokio::select! {
            outcome = &mut gateway => break outcome,
            Some(report) = reports_rx.recv() => {
                handle_registration_report(&lifecycle, report);
            }
            () = &mut shutdown, if !stopping => {
                stopping = true;
                info!("Shutdown signal received, stopping shards...");
                lifecycle.transition(HostState::Stopping).ok();
                shard_manager.shutdown_all().await;
            }
        }
    };

    if !stopping {
        lifecycle.transition(HostState::Stopping).ok();
    }
    lifecycle.transition(HostState::Stopped).ok();

    outcome.map_err(|why| {
        error!("Client error: {:?}", why);
        Error::from(why)
    })
}
