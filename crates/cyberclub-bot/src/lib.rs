//! # CyberClub Bot
//! The chat-side process: slash-command handling, the quiz session
//! protocol, and the recurring lifecycle jobs, all speaking to the content
//! API over HTTP.

pub mod client;
pub mod commands;
pub mod jobs;
pub mod quiz;
pub mod runtime;

pub use client::ApiClient;
pub use commands::Bot;
pub use quiz::{AnswerOutcome, QuizSessionManager};
pub use runtime::run;
