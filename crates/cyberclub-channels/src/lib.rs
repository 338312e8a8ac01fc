//! # CyberClub Channels
//! Chat-platform plumbing: the Discord adapter (REST + Gateway WebSocket)
//! and the best-effort notification fan-out.

pub mod discord;
pub mod notify;

pub use discord::{DiscordChannel, DiscordGatewayStream, Interaction, InteractionKind};
pub use notify::{Notifier, NotifyKind};
