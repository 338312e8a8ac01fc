//! Bot process wiring: config validation, Discord connection, command
//! registration, the scheduler, and the interaction loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::StreamExt;

use cyberclub_channels::discord::DiscordChannel;
use cyberclub_channels::notify::Notifier;
use cyberclub_core::config::ClubConfig;
use cyberclub_core::error::Result;
use cyberclub_core::traits::{Channel, ContentApi, EventsApi, FactsApi};
use cyberclub_scheduler::{Job, SchedulerEngine, Trigger};

use crate::client::ApiClient;
use crate::commands::{Bot, command_definitions};
use crate::jobs::{DailyFactJob, PruneJob};

/// Run the bot until Ctrl+C. Only configuration problems are fatal here;
/// everything after startup is contained and logged.
pub async fn run(config: ClubConfig) -> Result<()> {
    config.validate_for_bot()?;

    let api = Arc::new(ApiClient::new(&config.client)?);
    let discord = Arc::new(DiscordChannel::new(config.discord.clone())?);

    let me = discord.get_me().await?;
    tracing::info!("✅ Connected to Discord as {} ({})", me.username, me.id);

    discord.register_commands(&command_definitions()).await?;
    tracing::info!("Slash commands registered");

    let notifier = Arc::new(Notifier::new(
        Arc::clone(&discord) as Arc<dyn Channel>,
        config.broadcast.clone(),
    ));

    // Jobs are registered once; the engine owns their lifetime from here.
    let mut engine = SchedulerEngine::new();
    engine.register(
        Trigger::interval(Duration::from_secs(config.scheduler.prune_interval_secs)),
        Arc::new(PruneJob::new(
            Arc::clone(&api) as Arc<dyn EventsApi>,
            Arc::clone(&notifier),
            config.scheduler.grace_minutes,
        )) as Arc<dyn Job>,
    );
    engine.register(
        Trigger::cron(&config.scheduler.daily_fact_cron, &config.scheduler.timezone)?,
        Arc::new(DailyFactJob::new(
            Arc::clone(&api) as Arc<dyn FactsApi>,
            Arc::clone(&notifier),
        )) as Arc<dyn Job>,
    );
    engine.start();

    let bot = Arc::new(Bot::new(
        Arc::clone(&api) as Arc<dyn ContentApi>,
        Arc::clone(&discord),
        notifier,
    ));

    let mut interactions = Arc::clone(&discord).start_gateway();
    let interaction_loop = async {
        while let Some(interaction) = interactions.next().await {
            let bot = Arc::clone(&bot);
            // Handlers run concurrently; one slow store call never blocks
            // the next interaction.
            tokio::spawn(async move {
                bot.handle(interaction).await;
            });
        }
    };

    tokio::select! {
        _ = interaction_loop => {
            tracing::warn!("Interaction stream ended");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    engine.stop();
    Ok(())
}
