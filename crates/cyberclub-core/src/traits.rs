//! Trait seams between the bot, the content API, and the chat platform.
//!
//! The collection traits are split per content kind so the scheduler jobs
//! can depend on exactly the slice they touch (and tests can fake it).

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Event, EventPatch, Fact, FactPatch, Joke, JokePatch, QuizItem, QuizPatch, Quote, QuotePatch,
};

/// CRUD over the events collection. Identity is the event title.
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>>;
    async fn get_event(&self, title: &str) -> Result<Event>;
    async fn create_event(&self, event: &Event) -> Result<Event>;
    async fn update_event(&self, title: &str, patch: &EventPatch) -> Result<Event>;
    async fn delete_event(&self, title: &str) -> Result<()>;
}

/// CRUD over the facts collection. Identity is the store-assigned id.
#[async_trait]
pub trait FactsApi: Send + Sync {
    async fn list_facts(&self) -> Result<Vec<Fact>>;
    async fn get_fact(&self, id: &str) -> Result<Fact>;
    async fn create_fact(&self, fact: &Fact) -> Result<Fact>;
    async fn update_fact(&self, id: &str, patch: &FactPatch) -> Result<Fact>;
    async fn delete_fact(&self, id: &str) -> Result<()>;
}

/// CRUD over the jokes collection. Identity is the store-assigned id.
#[async_trait]
pub trait JokesApi: Send + Sync {
    async fn list_jokes(&self) -> Result<Vec<Joke>>;
    async fn get_joke(&self, id: &str) -> Result<Joke>;
    async fn create_joke(&self, joke: &Joke) -> Result<Joke>;
    async fn update_joke(&self, id: &str, patch: &JokePatch) -> Result<Joke>;
    async fn delete_joke(&self, id: &str) -> Result<()>;
}

/// CRUD over the quotes collection. Identity is the store-assigned id.
#[async_trait]
pub trait QuotesApi: Send + Sync {
    async fn list_quotes(&self) -> Result<Vec<Quote>>;
    async fn get_quote(&self, id: &str) -> Result<Quote>;
    async fn create_quote(&self, quote: &Quote) -> Result<Quote>;
    async fn update_quote(&self, id: &str, patch: &QuotePatch) -> Result<Quote>;
    async fn delete_quote(&self, id: &str) -> Result<()>;
}

/// CRUD over the quizzes collection. Identity is the store-assigned id.
#[async_trait]
pub trait QuizzesApi: Send + Sync {
    async fn list_quizzes(&self) -> Result<Vec<QuizItem>>;
    async fn get_quiz(&self, id: &str) -> Result<QuizItem>;
    async fn create_quiz(&self, quiz: &QuizItem) -> Result<QuizItem>;
    async fn update_quiz(&self, id: &str, patch: &QuizPatch) -> Result<QuizItem>;
    async fn delete_quiz(&self, id: &str) -> Result<()>;
}

/// The full content surface the bot consumes.
#[async_trait]
pub trait ContentApi:
    EventsApi + FactsApi + JokesApi + QuotesApi + QuizzesApi
{
    /// Fetch the static club profile.
    async fn get_about(&self) -> Result<serde_json::Value>;
}

/// An outbound chat channel the bot can post to.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver `content` to the platform channel `channel_id`.
    async fn send(&self, channel_id: &str, content: &str) -> Result<()>;
}
