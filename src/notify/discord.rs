// Discord bot REST API implementation.
//
// Messages go to one fixed channel via `POST /channels/{id}/messages`.
// Only the REST API is used; there is no gateway connection, so the bot
// never appears online and needs no intents.
//
// API docs: https://discord.com/developers/docs/resources/message#create-message

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::Notifier;

/// Default Discord REST endpoint.
pub const DEFAULT_API_URL: &str = "https://discord.com/api/v10";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Posts announcements to a single Discord channel as a bot user.
pub struct DiscordNotifier {
    client: Client,
    base_url: String,
    token: String,
    channel_id: String,
}

impl DiscordNotifier {
    pub fn new(base_url: &str, token: &str, channel_id: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("DiscordBot (https://github.com/reactwatch/reactwatch, 0.1)")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Check the bot token and the destination channel before polling starts.
    ///
    /// Returns the bot's username. Any failure here is fatal at startup.
    pub async fn verify(&self) -> Result<String> {
        let me: DiscordUser = self
            .get_json("users/@me")
            .await
            .context("Failed to authenticate to Discord. Check DISCORD_TOKEN")?;

        let channel: DiscordChannel = self
            .get_json(&format!("channels/{}", self.channel_id))
            .await
            .with_context(|| {
                format!(
                    "Invalid Discord channel ID {}. Check DISCORD_CHANNEL_ID",
                    self.channel_id
                )
            })?;

        info!(
            bot = me.username.as_str(),
            channel = channel.name.as_deref().unwrap_or(channel.id.as_str()),
            "Logged in to Discord"
        );
        Ok(me.username)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .with_context(|| format!("Discord request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Discord {path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse Discord {path} response"))
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/channels/{}/messages", self.base_url, self.channel_id);

        let request = CreateMessage {
            content: text,
            // Reactor names are user-controlled; never let them ping anyone.
            allowed_mentions: AllowedMentions { parse: Vec::new() },
        };

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&request)
            .send()
            .await
            .context("Failed to post message to Discord")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Discord returned {}: {}", status, body);
        }

        debug!(channel_id = self.channel_id.as_str(), "Posted message to Discord");
        Ok(())
    }
}

// -- Serde types for the Discord REST API --

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
    allowed_mentions: AllowedMentions,
}

#[derive(Debug, Serialize)]
struct AllowedMentions {
    parse: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    username: String,
}

#[derive(Debug, Deserialize)]
struct DiscordChannel {
    id: String,
    #[serde(default)]
    name: Option<String>,
}
