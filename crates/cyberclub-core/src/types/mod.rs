//! Content record types shared across the store, gateway, client, and bot.

pub mod content;
pub mod quiz;

pub use content::{Event, EventPatch, Fact, FactPatch, Joke, JokePatch, Quote, QuotePatch};
pub use quiz::{QuizItem, QuizPatch};
