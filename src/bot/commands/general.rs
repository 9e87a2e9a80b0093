//! General Discord commands.
//! Currently only `/ping`, which reports API and gateway latency.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::latency::{self, PingReport, ReceivedAt},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// pingを計測します。
    ///
    /// Replies with an embed showing the API endpoint latency of this
    /// interaction and the last measured WebSocket heartbeat latency.
    #[poise::command(slash_command, category = "General")]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let now = chrono::Utc::now();
        let received_at = ctx
            .invocation_data::<ReceivedAt>()
            .await
            .map_or(now, |received| received.0);
        let heartbeat = ctx.ping().await;

        let author = ctx.author();
        let invoker = latency::display_name(author.global_name.as_deref(), &author.name);
        let report = PingReport::new(received_at, now, heartbeat, invoker);

        let embed = serenity::CreateEmbed::new()
            .title(report.title())
            .description(report.description())
            .footer(serenity::CreateEmbedFooter::new(report.footer()).icon_url(author.face()))
            .color(latency::EMBED_COLOR);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
