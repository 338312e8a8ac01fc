//! The two recurring lifecycle jobs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;

use cyberclub_channels::notify::{Notifier, NotifyKind};
use cyberclub_core::error::Result;
use cyberclub_core::time::parse_event_date;
use cyberclub_core::traits::{EventsApi, FactsApi};
use cyberclub_scheduler::Job;

/// Deletes events whose date is further in the past than the grace window.
///
/// Every failure inside a tick is contained: an unparseable date or a failed
/// delete skips that record, a failed fetch skips the whole tick, and the
/// job stays scheduled either way.
pub struct PruneJob {
    events: Arc<dyn EventsApi>,
    notifier: Arc<Notifier>,
    grace: Duration,
}

impl PruneJob {
    pub fn new(events: Arc<dyn EventsApi>, notifier: Arc<Notifier>, grace_minutes: i64) -> Self {
        Self { events, notifier, grace: Duration::minutes(grace_minutes) }
    }
}

#[async_trait]
impl Job for PruneJob {
    fn name(&self) -> &str {
        "prune-expired-events"
    }

    async fn run(&self) -> Result<()> {
        let events = match self.events.list_events().await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Prune: cannot fetch events, skipping this tick: {e}");
                return Ok(());
            }
        };

        let now = Utc::now();
        for event in events {
            let Some(when) = parse_event_date(&event.date) else {
                tracing::warn!(
                    "Prune: event '{}' has unparseable date '{}', skipping",
                    event.title,
                    event.date
                );
                continue;
            };

            if now - when <= self.grace {
                continue;
            }

            match self.events.delete_event(&event.title).await {
                Ok(()) => {
                    tracing::info!("Prune: removed expired event '{}'", event.title);
                    self.notifier
                        .notify(
                            NotifyKind::EventPruned,
                            &format!("🗑️ Event **{}** has ended and was removed.", event.title),
                        )
                        .await;
                }
                Err(e) => {
                    tracing::warn!("Prune: failed to delete event '{}': {e}", event.title);
                }
            }
        }
        Ok(())
    }
}

/// Posts one uniformly random fact to the facts channel.
pub struct DailyFactJob {
    facts: Arc<dyn FactsApi>,
    notifier: Arc<Notifier>,
}

impl DailyFactJob {
    pub fn new(facts: Arc<dyn FactsApi>, notifier: Arc<Notifier>) -> Self {
        Self { facts, notifier }
    }
}

#[async_trait]
impl Job for DailyFactJob {
    fn name(&self) -> &str {
        "daily-fact"
    }

    async fn run(&self) -> Result<()> {
        let facts = match self.facts.list_facts().await {
            Ok(facts) => facts,
            Err(e) => {
                tracing::warn!("Daily fact: cannot fetch facts, skipping today: {e}");
                return Ok(());
            }
        };

        let message = match facts.choose(&mut rand::thread_rng()) {
            Some(fact) => format!("💡 **Daily Cyber Fact:** {}", fact.content),
            None => "📭 No cybersecurity facts available yet — add one with /add_fact!".to_string(),
        };
        self.notifier.notify(NotifyKind::DailyFact, &message).await;
        Ok(())
    }
}
