//! Slash-command surface and interaction dispatch.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde_json::{Value, json};

use cyberclub_channels::discord::{
    DiscordChannel, FLAG_EPHEMERAL, Interaction, InteractionKind, RESPONSE_CHANNEL_MESSAGE,
    RESPONSE_DEFERRED_UPDATE, RESPONSE_UPDATE_MESSAGE, action_rows, button,
};
use cyberclub_channels::notify::{Notifier, NotifyKind};
use cyberclub_core::error::{ClubError, Result};
use cyberclub_core::traits::{
    ContentApi, EventsApi, FactsApi, JokesApi, QuizzesApi, QuotesApi,
};
use cyberclub_core::types::{Event, Fact, Joke, QuizItem, Quote};

use crate::quiz::{AnswerOutcome, QuizSessionManager};

const COLOR_BLUE: u32 = 0x3498db;
const COLOR_GREEN: u32 = 0x2ecc71;
const COLOR_PURPLE: u32 = 0x9b59b6;

/// The command definitions pushed to Discord at startup.
pub fn command_definitions() -> Value {
    let string = 3;
    let integer = 4;
    json!([
        { "name": "events", "description": "List upcoming club events." },
        {
            "name": "add_event", "description": "Add a new club event (Admin only).",
            "options": [
                { "type": string, "name": "title", "description": "Title of the event", "required": true },
                { "type": string, "name": "date", "description": "Date and time of the event (ISO format)", "required": true },
                { "type": string, "name": "description", "description": "Brief event description", "required": true },
                { "type": string, "name": "location", "description": "Event location or link", "required": true },
            ]
        },
        {
            "name": "remove_event", "description": "Remove an existing event (Admin only).",
            "options": [
                { "type": string, "name": "title", "description": "Title of the event to remove", "required": true },
            ]
        },
        { "name": "cyberfact", "description": "Get a random cybersecurity fact." },
        {
            "name": "add_fact", "description": "Add a new cybersecurity fact (Admin only).",
            "options": [
                { "type": string, "name": "fact", "description": "The fact text", "required": true },
            ]
        },
        { "name": "cyberjoke", "description": "Get a random cybersecurity joke." },
        {
            "name": "add_joke", "description": "Add a new cybersecurity joke (Admin only).",
            "options": [
                { "type": string, "name": "joke", "description": "The joke text", "required": true },
            ]
        },
        { "name": "cyberquote", "description": "Get a random cybersecurity quote." },
        {
            "name": "add_quote", "description": "Add a new quote (Admin only).",
            "options": [
                { "type": string, "name": "quote", "description": "The quote text", "required": true },
                { "type": string, "name": "author", "description": "Who said it", "required": false },
            ]
        },
        { "name": "quiz", "description": "Deal a random quiz question." },
        {
            "name": "add_quiz", "description": "Add a new quiz question (Admin only).",
            "options": [
                { "type": string, "name": "question", "description": "The question", "required": true },
                { "type": string, "name": "options", "description": "Comma-separated answer options", "required": true },
                { "type": integer, "name": "answer", "description": "Number of the correct option (1-based)", "required": true },
            ]
        },
        { "name": "about", "description": "About the club." },
        { "name": "help", "description": "Display all available commands." },
    ])
}

/// Command dispatch plus the quiz answer protocol.
pub struct Bot {
    api: Arc<dyn ContentApi>,
    discord: Arc<DiscordChannel>,
    notifier: Arc<Notifier>,
    quizzes: QuizSessionManager,
}

impl Bot {
    pub fn new(
        api: Arc<dyn ContentApi>,
        discord: Arc<DiscordChannel>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self { api, discord, notifier, quizzes: QuizSessionManager::new() }
    }

    /// Entry point for every gateway interaction. Errors become a single
    /// user-facing failure message; nothing escalates past here.
    pub async fn handle(&self, interaction: Interaction) {
        let result = match interaction.kind.clone() {
            InteractionKind::Command { name, .. } => {
                tracing::info!("Command /{name} from {}", interaction.user_name);
                self.handle_command(&interaction, &name).await
            }
            InteractionKind::Component { custom_id } => {
                self.handle_component(&interaction, &custom_id).await
            }
        };

        if let Err(e) = result {
            let message = match &e {
                ClubError::NotFound(what) => format!("⚠️ Not found: {what}"),
                ClubError::Validation(msg) => format!("⚠️ {msg}"),
                _ => {
                    tracing::error!("Interaction failed: {e}");
                    "⚠️ Something went wrong, please try again later.".to_string()
                }
            };
            let _ = self.respond_ephemeral(&interaction, &message).await;
        }
    }

    async fn handle_command(&self, interaction: &Interaction, name: &str) -> Result<()> {
        match name {
            "events" => self.cmd_events(interaction).await,
            "add_event" => self.cmd_add_event(interaction).await,
            "remove_event" => self.cmd_remove_event(interaction).await,
            "cyberfact" => self.cmd_cyberfact(interaction).await,
            "add_fact" => self.cmd_add_fact(interaction).await,
            "cyberjoke" => self.cmd_cyberjoke(interaction).await,
            "add_joke" => self.cmd_add_joke(interaction).await,
            "cyberquote" => self.cmd_cyberquote(interaction).await,
            "add_quote" => self.cmd_add_quote(interaction).await,
            "quiz" => self.cmd_quiz(interaction).await,
            "add_quiz" => self.cmd_add_quiz(interaction).await,
            "about" => self.cmd_about(interaction).await,
            "help" => self.cmd_help(interaction).await,
            other => {
                tracing::warn!("Unknown command /{other}");
                self.respond_ephemeral(interaction, "⚠️ Unknown command.").await
            }
        }
    }

    // ── Events ──────────────────────────────────────────

    async fn cmd_events(&self, interaction: &Interaction) -> Result<()> {
        let events = self.api.list_events().await?;
        if events.is_empty() {
            return self.respond_text(interaction, "📭 No upcoming events found.").await;
        }

        let fields: Vec<Value> = events
            .iter()
            .map(|e| {
                json!({
                    "name": format!("{} — {}", e.title, e.date),
                    "value": format!("{}\n📍 {}", e.description, e.location),
                    "inline": false,
                })
            })
            .collect();
        self.respond_embed(
            interaction,
            json!({ "title": "Upcoming Club Events", "color": COLOR_BLUE, "fields": fields }),
        )
        .await
    }

    async fn cmd_add_event(&self, interaction: &Interaction) -> Result<()> {
        if !self.require_admin(interaction).await? {
            return Ok(());
        }
        let event = Event {
            title: required_option(interaction, "title")?,
            date: required_option(interaction, "date")?,
            description: required_option(interaction, "description")?,
            location: required_option(interaction, "location")?,
        };

        let created = self.api.create_event(&event).await?;
        self.respond_text(
            interaction,
            &format!("✅ Event **{}** added successfully!", created.title),
        )
        .await?;

        // Announce after the reply is out; delivery failure never undoes it.
        self.notifier.dispatch(
            NotifyKind::EventAdded,
            format!(
                "📅 New event: **{}** on {} — {}",
                created.title, created.date, created.location
            ),
        );
        Ok(())
    }

    async fn cmd_remove_event(&self, interaction: &Interaction) -> Result<()> {
        if !self.require_admin(interaction).await? {
            return Ok(());
        }
        let title = required_option(interaction, "title")?;
        self.api.delete_event(&title).await?;
        self.respond_text(interaction, "🗑️ Event deleted successfully.").await
    }

    // ── Facts / jokes / quotes ──────────────────────────

    async fn cmd_cyberfact(&self, interaction: &Interaction) -> Result<()> {
        let facts = self.api.list_facts().await?;
        let Some(fact) = facts.choose(&mut rand::thread_rng()) else {
            return self
                .respond_text(interaction, "📭 No cybersecurity facts available.")
                .await;
        };
        self.respond_text(interaction, &format!("💡 **Cyber Fact:** {}", fact.content))
            .await
    }

    async fn cmd_add_fact(&self, interaction: &Interaction) -> Result<()> {
        if !self.require_admin(interaction).await? {
            return Ok(());
        }
        let content = required_option(interaction, "fact")?;
        self.api.create_fact(&Fact::new(content)).await?;
        self.respond_ephemeral(interaction, "✅ Cybersecurity fact added successfully!")
            .await
    }

    async fn cmd_cyberjoke(&self, interaction: &Interaction) -> Result<()> {
        let jokes = self.api.list_jokes().await?;
        let Some(joke) = jokes.choose(&mut rand::thread_rng()) else {
            return self
                .respond_text(interaction, "📭 No cybersecurity jokes available.")
                .await;
        };
        self.respond_text(interaction, &format!("😄 {}", joke.content)).await
    }

    async fn cmd_add_joke(&self, interaction: &Interaction) -> Result<()> {
        if !self.require_admin(interaction).await? {
            return Ok(());
        }
        let content = required_option(interaction, "joke")?;
        self.api.create_joke(&Joke::new(content)).await?;
        self.respond_ephemeral(interaction, "✅ Joke added successfully!").await
    }

    async fn cmd_cyberquote(&self, interaction: &Interaction) -> Result<()> {
        let quotes = self.api.list_quotes().await?;
        let Some(quote) = quotes.choose(&mut rand::thread_rng()) else {
            return self
                .respond_text(interaction, "📭 No quotes available.")
                .await;
        };
        self.respond_text(
            interaction,
            &format!("💬 *{}*\n— {}", quote.content, quote.author),
        )
        .await
    }

    async fn cmd_add_quote(&self, interaction: &Interaction) -> Result<()> {
        if !self.require_admin(interaction).await? {
            return Ok(());
        }
        let content = required_option(interaction, "quote")?;
        let author = interaction.option_str("author").unwrap_or("Unknown").to_string();
        self.api.create_quote(&Quote::new(content, author)).await?;
        self.respond_ephemeral(interaction, "✅ Quote added successfully!").await
    }

    // ── Quiz ────────────────────────────────────────────

    async fn cmd_quiz(&self, interaction: &Interaction) -> Result<()> {
        let quizzes = self.api.list_quizzes().await?;
        let Some(item) = quizzes.choose(&mut rand::thread_rng()) else {
            return self
                .respond_text(
                    interaction,
                    "📭 No quizzes available yet — add one with /add_quiz!",
                )
                .await;
        };

        let session_id = self.quizzes.deal(item)?;
        let rows = action_rows(quiz_buttons(&session_id, &item.options, false));
        self.discord
            .respond(
                interaction,
                RESPONSE_CHANNEL_MESSAGE,
                json!({
                    "embeds": [{
                        "title": "🧠 Cyber Quiz",
                        "description": item.question,
                        "color": COLOR_PURPLE,
                    }],
                    "components": rows,
                }),
            )
            .await
    }

    async fn cmd_add_quiz(&self, interaction: &Interaction) -> Result<()> {
        if !self.require_admin(interaction).await? {
            return Ok(());
        }
        let question = required_option(interaction, "question")?;
        let raw_options = required_option(interaction, "options")?;
        let answer = interaction
            .option_u64("answer")
            .ok_or_else(|| ClubError::validation("answer is required"))?;

        // Validation failures surface before anything reaches the store.
        let quiz = QuizItem::from_author_input(question, &raw_options, answer as usize)?;
        self.api.create_quiz(&quiz).await?;
        self.respond_ephemeral(interaction, "✅ Quiz added successfully!").await
    }

    /// A button press on a dealt quiz. The first press locks the session and
    /// disables the entries before the verdict goes out; any further press
    /// lands on a locked session and is acknowledged without effect.
    async fn handle_component(&self, interaction: &Interaction, custom_id: &str) -> Result<()> {
        let Some((session_id, index)) = parse_quiz_custom_id(custom_id) else {
            return self
                .discord
                .respond(interaction, RESPONSE_DEFERRED_UPDATE, json!({}))
                .await;
        };

        let verdict = match self.quizzes.answer(&session_id, index) {
            AnswerOutcome::Correct => "✅ Correct!".to_string(),
            AnswerOutcome::Incorrect { correct } => {
                format!("❌ Incorrect — the correct answer was **{correct}**.")
            }
            AnswerOutcome::AlreadyAnswered | AnswerOutcome::UnknownSession => {
                return self
                    .discord
                    .respond(interaction, RESPONSE_DEFERRED_UPDATE, json!({}))
                    .await;
            }
        };

        if let Some(session) = self.quizzes.snapshot(&session_id) {
            let rows = action_rows(quiz_buttons(&session_id, &session.options, true));
            self.discord
                .respond(
                    interaction,
                    RESPONSE_UPDATE_MESSAGE,
                    json!({ "components": rows }),
                )
                .await?;
        }
        self.discord.followup_ephemeral(interaction, &verdict).await
    }

    // ── About / help ────────────────────────────────────

    async fn cmd_about(&self, interaction: &Interaction) -> Result<()> {
        let about = self.api.get_about().await?;
        let name = about["name"].as_str().unwrap_or("CyberClub");
        let description = about["description"].as_str().unwrap_or_default();
        let mut fields = Vec::new();
        if let Some(founded) = about["founded"].as_str() {
            fields.push(json!({ "name": "Founded", "value": founded, "inline": true }));
        }
        if let Some(website) = about["contact"]["website"].as_str() {
            fields.push(json!({ "name": "Website", "value": website, "inline": true }));
        }
        self.respond_embed(
            interaction,
            json!({
                "title": name,
                "description": description,
                "color": COLOR_BLUE,
                "fields": fields,
            }),
        )
        .await
    }

    async fn cmd_help(&self, interaction: &Interaction) -> Result<()> {
        let commands = [
            ("/events", "List upcoming club events."),
            ("/add_event", "Add a new event (Admin only)."),
            ("/remove_event", "Remove an event (Admin only)."),
            ("/cyberfact", "Get a random cybersecurity fact."),
            ("/add_fact", "Add a new fact (Admin only)."),
            ("/cyberjoke", "Get a random cybersecurity joke."),
            ("/add_joke", "Add a new joke (Admin only)."),
            ("/cyberquote", "Get a random quote."),
            ("/add_quote", "Add a new quote (Admin only)."),
            ("/quiz", "Deal a random quiz question."),
            ("/add_quiz", "Add a quiz question (Admin only)."),
            ("/about", "About the club."),
            ("/help", "Show this help message."),
        ];
        let fields: Vec<Value> = commands
            .iter()
            .map(|(name, description)| {
                json!({ "name": name, "value": description, "inline": false })
            })
            .collect();
        self.respond_embed(
            interaction,
            json!({ "title": "📘 Command List", "color": COLOR_GREEN, "fields": fields }),
        )
        .await
    }

    // ── Response helpers ────────────────────────────────

    async fn require_admin(&self, interaction: &Interaction) -> Result<bool> {
        if interaction.is_admin {
            return Ok(true);
        }
        self.respond_ephemeral(interaction, "❌ You lack administrator permissions.")
            .await?;
        Ok(false)
    }

    async fn respond_text(&self, interaction: &Interaction, content: &str) -> Result<()> {
        self.discord
            .respond(
                interaction,
                RESPONSE_CHANNEL_MESSAGE,
                json!({ "content": content }),
            )
            .await
    }

    async fn respond_ephemeral(&self, interaction: &Interaction, content: &str) -> Result<()> {
        self.discord
            .respond(
                interaction,
                RESPONSE_CHANNEL_MESSAGE,
                json!({ "content": content, "flags": FLAG_EPHEMERAL }),
            )
            .await
    }

    async fn respond_embed(&self, interaction: &Interaction, embed: Value) -> Result<()> {
        self.discord
            .respond(
                interaction,
                RESPONSE_CHANNEL_MESSAGE,
                json!({ "embeds": [embed] }),
            )
            .await
    }
}

/// Discord enforces required options, but a malformed payload should fail
/// as validation, not a panic.
fn required_option(interaction: &Interaction, name: &str) -> Result<String> {
    interaction
        .option_str(name)
        .map(String::from)
        .ok_or_else(|| ClubError::validation(format!("{name} is required")))
}

/// Buttons for a dealt quiz: one per option, bound to its zero-based index.
fn quiz_buttons(session_id: &str, options: &[String], disabled: bool) -> Vec<Value> {
    options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            button(
                &format!("quiz:{session_id}:{index}"),
                &button_label(option),
                disabled,
            )
        })
        .collect()
}

/// Discord caps button labels at 80 characters.
fn button_label(text: &str) -> String {
    if text.chars().count() > 80 {
        let truncated: String = text.chars().take(77).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

/// Split `quiz:{session}:{index}` back apart.
fn parse_quiz_custom_id(custom_id: &str) -> Option<(String, usize)> {
    let rest = custom_id.strip_prefix("quiz:")?;
    let (session_id, index) = rest.rsplit_once(':')?;
    Some((session_id.to_string(), index.parse().ok()?))
}
