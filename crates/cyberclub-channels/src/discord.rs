//! Discord channel — REST API + Gateway WebSocket.
//!
//! REST handles everything outbound (messages, embeds, command registration,
//! interaction responses); the Gateway connection exists only to receive
//! slash-command and button interactions, with auto-reconnect and
//! exponential backoff.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use cyberclub_core::config::DiscordConfig;
use cyberclub_core::error::{ClubError, Result};
use cyberclub_core::traits::Channel;

const API_BASE: &str = "https://discord.com/api/v10";

/// ADMINISTRATOR permission bit.
const PERM_ADMINISTRATOR: u64 = 1 << 3;

/// Interaction callback types.
pub const RESPONSE_CHANNEL_MESSAGE: u8 = 4;
pub const RESPONSE_DEFERRED_UPDATE: u8 = 6;
pub const RESPONSE_UPDATE_MESSAGE: u8 = 7;

/// Message flag for responses only the invoker can see.
pub const FLAG_EPHEMERAL: u64 = 64;

/// Discord Bot channel.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bot {}", config.bot_token)
            .parse()
            .map_err(|_| ClubError::config("Bot token is not a valid header value"))?;
        headers.insert("Authorization", auth);
        headers.insert("User-Agent", "CyberClub/0.3".parse().expect("static header"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClubError::channel(format!("HTTP client build failed: {e}")))?;

        Ok(Self { config, client })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClubError::channel(format!("Discord request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClubError::channel(format!("Discord {status}: {text}")));
        }
        // 204 No Content comes back from interaction callbacks.
        Ok(response.json().await.unwrap_or(Value::Null))
    }

    /// Send a plain message to a channel.
    pub async fn send_message(&self, channel_id: &str, content: &str) -> Result<()> {
        self.send_payload(channel_id, &json!({ "content": content }))
            .await
            .map(|_| ())
    }

    /// Send a full message payload (embeds, components) to a channel.
    /// Returns the created message id.
    pub async fn send_payload(&self, channel_id: &str, payload: &Value) -> Result<String> {
        let url = format!("{API_BASE}/channels/{channel_id}/messages");
        let created = self.post_json(&url, payload).await?;
        Ok(created["id"].as_str().unwrap_or_default().to_string())
    }

    /// Answer an interaction. `kind` is one of the RESPONSE_* constants.
    pub async fn respond(&self, interaction: &Interaction, kind: u8, data: Value) -> Result<()> {
        let url = format!(
            "{API_BASE}/interactions/{}/{}/callback",
            interaction.id, interaction.token
        );
        self.post_json(&url, &json!({ "type": kind, "data": data }))
            .await
            .map(|_| ())
    }

    /// Post a follow-up message on an interaction, visible to the invoker
    /// only.
    pub async fn followup_ephemeral(&self, interaction: &Interaction, content: &str) -> Result<()> {
        let url = format!(
            "{API_BASE}/webhooks/{}/{}",
            self.config.application_id, interaction.token
        );
        self.post_json(&url, &json!({ "content": content, "flags": FLAG_EPHEMERAL }))
            .await
            .map(|_| ())
    }

    /// Overwrite the application's slash commands. Guild-scoped when a guild
    /// id is configured (instant), global otherwise (propagates slowly).
    pub async fn register_commands(&self, commands: &Value) -> Result<()> {
        let app = &self.config.application_id;
        let url = match &self.config.guild_id {
            Some(guild) => format!("{API_BASE}/applications/{app}/guilds/{guild}/commands"),
            None => format!("{API_BASE}/applications/{app}/commands"),
        };
        let response = self
            .client
            .put(&url)
            .json(commands)
            .send()
            .await
            .map_err(|e| ClubError::channel(format!("Command registration failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ClubError::channel(format!("Discord {status}: {text}")));
        }
        Ok(())
    }

    /// Get current bot info.
    pub async fn get_me(&self) -> Result<DiscordUser> {
        let response = self
            .client
            .get(format!("{API_BASE}/users/@me"))
            .send()
            .await
            .map_err(|e| ClubError::channel(format!("getMe failed: {e}")))?;
        response
            .json()
            .await
            .map_err(|e| ClubError::channel(format!("Invalid response: {e}")))
    }

    /// Get Gateway WebSocket URL.
    pub async fn get_gateway_url(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{API_BASE}/gateway/bot"))
            .send()
            .await
            .map_err(|e| ClubError::channel(format!("Gateway request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClubError::channel(format!("Invalid gateway response: {e}")))?;

        body["url"]
            .as_str()
            .map(|s| format!("{s}/?v=10&encoding=json"))
            .ok_or_else(|| ClubError::channel("No gateway URL"))
    }

    /// Start the Gateway connection — returns a stream of interactions.
    /// Auto-reconnects on disconnect with exponential backoff.
    pub fn start_gateway(self: Arc<Self>) -> DiscordGatewayStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let channel = self;
            let mut backoff_secs: u64 = 5;

            // ═══ Reconnect loop ═══
            loop {
                tracing::info!("Discord Gateway connecting...");

                let gateway_url = match channel.get_gateway_url().await {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::error!(
                            "Failed to get gateway URL: {e}, retrying in {backoff_secs}s..."
                        );
                        tokio::time::sleep(tokio::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let ws_result = tokio_tungstenite::connect_async(&gateway_url).await;
                let (mut ws, _) = match ws_result {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::error!(
                            "Gateway WebSocket failed: {e}, retrying in {backoff_secs}s..."
                        );
                        tokio::time::sleep(tokio::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                // Reset backoff on successful connect
                backoff_secs = 5;
                tracing::info!("Discord Gateway connected");

                use futures::{SinkExt, StreamExt};
                use tokio_tungstenite::tungstenite::Message as WsMsg;

                let mut heartbeat_interval_ms: u64 = 41250;
                let mut seq: Option<u64> = None;
                let mut identified = false;

                loop {
                    tokio::select! {
                        msg = ws.next() => {
                            match msg {
                                Some(Ok(WsMsg::Text(text))) => {
                                    let payload: Value = match serde_json::from_str(&text) {
                                        Ok(v) => v,
                                        Err(_) => continue,
                                    };

                                    let op = payload["op"].as_u64().unwrap_or(0);
                                    if let Some(s) = payload["s"].as_u64() {
                                        seq = Some(s);
                                    }

                                    match op {
                                        10 => {
                                            heartbeat_interval_ms = payload["d"]["heartbeat_interval"]
                                                .as_u64().unwrap_or(41250);
                                            tracing::debug!("Gateway Hello: heartbeat={}ms", heartbeat_interval_ms);

                                            if !identified {
                                                let identify = json!({
                                                    "op": 2,
                                                    "d": {
                                                        "token": channel.config.bot_token,
                                                        "intents": channel.config.intents,
                                                        "properties": {
                                                            "os": std::env::consts::OS,
                                                            "browser": "cyberclub",
                                                            "device": "cyberclub"
                                                        }
                                                    }
                                                });
                                                let _ = ws.send(WsMsg::Text(identify.to_string())).await;
                                                identified = true;
                                            }
                                        }
                                        11 => { tracing::trace!("Heartbeat ACK"); }
                                        0 => {
                                            let event_name = payload["t"].as_str().unwrap_or("");
                                            match event_name {
                                                "READY" => {
                                                    let user = payload["d"]["user"]["username"]
                                                        .as_str().unwrap_or("unknown");
                                                    tracing::info!("Discord Gateway READY as {user}");
                                                }
                                                "INTERACTION_CREATE" => {
                                                    let Some(interaction) = parse_interaction(&payload["d"]) else {
                                                        tracing::trace!("Ignoring unsupported interaction");
                                                        continue;
                                                    };
                                                    if tx.send(interaction).is_err() {
                                                        tracing::info!("Discord stream closed (receiver dropped)");
                                                        return; // Stop completely
                                                    }
                                                }
                                                _ => { tracing::trace!("Ignoring event: {event_name}"); }
                                            }
                                        }
                                        7 => {
                                            tracing::warn!("Gateway requesting reconnect");
                                            break; // → outer reconnect loop
                                        }
                                        9 => {
                                            tracing::warn!("Invalid session, re-identifying");
                                            identified = false;
                                        }
                                        _ => {}
                                    }
                                }
                                Some(Ok(WsMsg::Close(_))) => {
                                    tracing::warn!("Discord Gateway closed by server");
                                    break; // → reconnect
                                }
                                Some(Err(e)) => {
                                    tracing::error!("Gateway error: {e}");
                                    break; // → reconnect
                                }
                                None => break,
                                _ => {}
                            }
                        }
                        _ = tokio::time::sleep(tokio::time::Duration::from_millis(heartbeat_interval_ms)) => {
                            let heartbeat = json!({ "op": 1, "d": seq });
                            if ws.send(WsMsg::Text(heartbeat.to_string())).await.is_err() {
                                tracing::error!("Heartbeat send failed");
                                break; // → reconnect
                            }
                            tracing::trace!("Heartbeat sent (seq={:?})", seq);
                        }
                    }
                }

                // Disconnected — reconnect after backoff
                tracing::info!("Discord Gateway disconnected, reconnecting in {backoff_secs}s...");
                tokio::time::sleep(tokio::time::Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs * 2).min(60);
            } // end reconnect loop
        });

        DiscordGatewayStream { rx }
    }
}

/// Stream of interactions from the Gateway connection.
pub struct DiscordGatewayStream {
    rx: tokio::sync::mpsc::UnboundedReceiver<Interaction>,
}

impl Stream for DiscordGatewayStream {
    type Item = Interaction;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Unpin for DiscordGatewayStream {}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send(&self, channel_id: &str, content: &str) -> Result<()> {
        self.send_message(channel_id, content).await
    }
}

// --- Interactions ---

/// A slash-command or button interaction, reduced to what the bot needs.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: String,
    pub token: String,
    pub channel_id: String,
    pub user_name: String,
    /// Whether the invoking member carries the administrator permission.
    pub is_admin: bool,
    pub kind: InteractionKind,
}

#[derive(Debug, Clone)]
pub enum InteractionKind {
    Command {
        name: String,
        options: serde_json::Map<String, Value>,
    },
    Component {
        custom_id: String,
    },
}

impl Interaction {
    pub fn option_str(&self, name: &str) -> Option<&str> {
        match &self.kind {
            InteractionKind::Command { options, .. } => options.get(name)?.as_str(),
            InteractionKind::Component { .. } => None,
        }
    }

    pub fn option_u64(&self, name: &str) -> Option<u64> {
        match &self.kind {
            InteractionKind::Command { options, .. } => options.get(name)?.as_u64(),
            InteractionKind::Component { .. } => None,
        }
    }
}

/// Reduce a raw INTERACTION_CREATE payload. Returns `None` for interaction
/// types the bot does not handle (autocomplete, modals, pings).
pub fn parse_interaction(d: &Value) -> Option<Interaction> {
    let kind = match d["type"].as_u64()? {
        // APPLICATION_COMMAND
        2 => {
            let data = &d["data"];
            let name = data["name"].as_str()?.to_string();
            let mut options = serde_json::Map::new();
            if let Some(raw) = data["options"].as_array() {
                for option in raw {
                    if let Some(key) = option["name"].as_str() {
                        options.insert(key.to_string(), option["value"].clone());
                    }
                }
            }
            InteractionKind::Command { name, options }
        }
        // MESSAGE_COMPONENT
        3 => InteractionKind::Component {
            custom_id: d["data"]["custom_id"].as_str()?.to_string(),
        },
        _ => return None,
    };

    // Guild interactions carry the user under `member`, DMs at top level.
    let user = if d["member"].is_object() {
        &d["member"]["user"]
    } else {
        &d["user"]
    };
    let is_admin = d["member"]["permissions"]
        .as_str()
        .and_then(|p| p.parse::<u64>().ok())
        .map(|p| p & PERM_ADMINISTRATOR != 0)
        .unwrap_or(false);

    Some(Interaction {
        id: d["id"].as_str()?.to_string(),
        token: d["token"].as_str()?.to_string(),
        channel_id: d["channel_id"].as_str().unwrap_or_default().to_string(),
        user_name: user["username"].as_str().unwrap_or("unknown").to_string(),
        is_admin,
        kind,
    })
}

// --- Message building helpers ---

/// A single button component.
pub fn button(custom_id: &str, label: &str, disabled: bool) -> Value {
    json!({
        "type": 2,
        "style": 2,
        "custom_id": custom_id,
        "label": label,
        "disabled": disabled,
    })
}

/// Pack buttons into action rows (Discord allows 5 per row).
pub fn action_rows(buttons: Vec<Value>) -> Vec<Value> {
    buttons
        .chunks(5)
        .map(|row| json!({ "type": 1, "components": row }))
        .collect()
}

// --- Discord API Types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    pub discriminator: Option<String>,
    pub bot: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_payload() -> Value {
        json!({
            "id": "111",
            "token": "tok",
            "type": 2,
            "channel_id": "222",
            "member": {
                "permissions": "8",
                "user": { "id": "333", "username": "alice" }
            },
            "data": {
                "name": "add_fact",
                "options": [ { "name": "fact", "type": 3, "value": "DNS is UDP 53" } ]
            }
        })
    }

    #[test]
    fn test_parse_command_interaction() {
        let interaction = parse_interaction(&command_payload()).expect("parses");
        assert_eq!(interaction.id, "111");
        assert_eq!(interaction.user_name, "alice");
        assert!(interaction.is_admin);
        assert_eq!(interaction.option_str("fact"), Some("DNS is UDP 53"));
        assert!(matches!(
            interaction.kind,
            InteractionKind::Command { ref name, .. } if name == "add_fact"
        ));
    }

    #[test]
    fn test_parse_component_interaction() {
        let payload = json!({
            "id": "444",
            "token": "tok2",
            "type": 3,
            "channel_id": "222",
            "user": { "id": "333", "username": "bob" },
            "data": { "custom_id": "quiz:abc:2", "component_type": 2 }
        });
        let interaction = parse_interaction(&payload).expect("parses");
        assert!(!interaction.is_admin);
        assert!(matches!(
            interaction.kind,
            InteractionKind::Component { ref custom_id } if custom_id == "quiz:abc:2"
        ));
    }

    #[test]
    fn test_non_admin_permissions() {
        let mut payload = command_payload();
        // Manage-messages and friends, but no administrator bit.
        payload["member"]["permissions"] = json!("104320576");
        let interaction = parse_interaction(&payload).expect("parses");
        assert!(!interaction.is_admin);
    }

    #[test]
    fn test_ping_interaction_ignored() {
        let payload = json!({ "id": "1", "token": "t", "type": 1 });
        assert!(parse_interaction(&payload).is_none());
    }

    #[test]
    fn test_action_rows_chunk_by_five() {
        let buttons: Vec<Value> = (0..7)
            .map(|i| button(&format!("quiz:s:{i}"), &format!("{}", i + 1), false))
            .collect();
        let rows = action_rows(buttons);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["components"].as_array().unwrap().len(), 5);
        assert_eq!(rows[1]["components"].as_array().unwrap().len(), 2);
    }
}
