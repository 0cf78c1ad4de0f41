use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::Result;

/// Default polling interval between cycle starts.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default pause between two posts inside one cycle.
pub const DEFAULT_POST_DELAY_MS: u64 = 2000;

/// What kind of LinkedIn entity owns the tracked posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Organization,
}

impl EntityKind {
    /// Parse the `LINKEDIN_ENTITY_TYPE` value. Only the exact upper-case
    /// names are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PERSON" => Some(EntityKind::Person),
            "ORGANIZATION" => Some(EntityKind::Organization),
            _ => None,
        }
    }

    /// The URN namespace segment LinkedIn uses for this kind of author.
    pub fn urn_segment(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Organization => "organization",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => write!(f, "PERSON"),
            EntityKind::Organization => write!(f, "ORGANIZATION"),
        }
    }
}

/// The single person or organization whose posts are watched.
///
/// Validated lazily: a missing id or an unknown kind is not a startup
/// failure, it degrades to "track nothing" and is reported on every cycle
/// (see `LinkedInClient::list_tracked_posts`).
#[derive(Debug, Clone, Default)]
pub struct TrackedEntity {
    pub id: String,
    pub kind: String,
}

impl TrackedEntity {
    /// The author URN for the posts listing, e.g. `urn:li:person:abc123`.
    ///
    /// Fails when the id is empty or the kind is not PERSON / ORGANIZATION.
    pub fn author_urn(&self) -> Result<String> {
        if self.id.is_empty() {
            anyhow::bail!("LINKEDIN_USER_ID not set");
        }
        let kind = EntityKind::parse(&self.kind).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid LINKEDIN_ENTITY_TYPE {:?}. Must be PERSON or ORGANIZATION",
                self.kind
            )
        })?;
        Ok(format!("urn:li:{}:{}", kind.urn_segment(), self.id))
    }
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Bearer token for the LinkedIn REST API.
    pub linkedin_api_key: String,
    /// LinkedIn API base (defaults to https://api.linkedin.com/v2).
    pub linkedin_api_url: String,
    pub entity: TrackedEntity,
    pub discord_token: String,
    pub discord_channel_id: String,
    /// Discord API base (defaults to https://discord.com/api/v10).
    pub discord_api_url: String,
    pub db_path: String,
    /// PostgreSQL connection URL (when set and starts with postgres://, uses Postgres backend)
    pub database_url: Option<String>,
    pub poll_interval: Duration,
    pub post_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Credentials are not checked here. `init` and `status` work without
    /// them; `run` and `poll-once` call the `require_*` checks.
    pub fn load() -> Result<Self> {
        let poll_interval_secs = parse_env_u64(
            "REACTWATCH_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        let post_delay_ms = parse_env_u64("REACTWATCH_POST_DELAY_MS", DEFAULT_POST_DELAY_MS)?;
        if poll_interval_secs == 0 {
            anyhow::bail!("REACTWATCH_POLL_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            linkedin_api_key: env::var("LINKEDIN_API_KEY").unwrap_or_default(),
            linkedin_api_url: env::var("LINKEDIN_API_URL")
                .unwrap_or_else(|_| crate::linkedin::client::DEFAULT_API_URL.to_string()),
            entity: TrackedEntity {
                id: env::var("LINKEDIN_USER_ID").unwrap_or_default(),
                kind: env::var("LINKEDIN_ENTITY_TYPE").unwrap_or_else(|_| "PERSON".to_string()),
            },
            discord_token: env::var("DISCORD_TOKEN").unwrap_or_default(),
            discord_channel_id: env::var("DISCORD_CHANNEL_ID").unwrap_or_default(),
            discord_api_url: env::var("DISCORD_API_URL")
                .unwrap_or_else(|_| crate::notify::discord::DEFAULT_API_URL.to_string()),
            db_path: env::var("REACTWATCH_DB_PATH")
                .unwrap_or_else(|_| "./reactwatch.db".to_string()),
            database_url: env::var("DATABASE_URL").ok(),
            poll_interval: Duration::from_secs(poll_interval_secs),
            post_delay: Duration::from_millis(post_delay_ms),
        })
    }

    /// Check that the LinkedIn credential is configured.
    ///
    /// The tracked entity is not checked: a missing LINKEDIN_USER_ID only
    /// means there is nothing to track.
    pub fn require_linkedin(&self) -> Result<()> {
        if self.linkedin_api_key.is_empty() {
            anyhow::bail!(
                "LINKEDIN_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Check that the Discord bot token and destination channel are configured.
    pub fn require_discord(&self) -> Result<()> {
        if self.discord_token.is_empty() {
            anyhow::bail!(
                "DISCORD_TOKEN not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        if self.discord_channel_id.is_empty() {
            anyhow::bail!(
                "DISCORD_CHANNEL_ID not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} must be a whole number, got {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}
