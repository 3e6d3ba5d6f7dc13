use solana_sdk::pubkey::Pubkey;
use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_GAME_ID, DEFAULT_PROGRAM_ID, DEFAULT_SERVICE_ICON_URL, DEFAULT_SERVICE_LABEL,
    DEFAULT_SOLANA_RPC_URL,
};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub public_base_url: Option<String>,

    // Blockchain
    pub solana_rpc_url: String,
    pub program_id: String,
    pub game_id: String,

    // Organizer signing key, JSON-encoded byte array
    pub event_organizer: String,

    // Transaction request descriptor
    pub service_label: String,
    pub service_icon_url: String,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source; `from_env` passes
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let event_organizer = lookup("EVENT_ORGANIZER")
            .ok_or_else(|| anyhow::anyhow!("EVENT_ORGANIZER environment variable not found"))?;

        Ok(Config {
            host: or("HOST", "0.0.0.0"),
            port: or("PORT", "3000")
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT is invalid: {}", e))?,
            environment: or("ENVIRONMENT", "development"),
            public_base_url: lookup("PUBLIC_BASE_URL"),

            solana_rpc_url: or("SOLANA_RPC_URL", DEFAULT_SOLANA_RPC_URL),
            program_id: or("PROGRAM_ID", DEFAULT_PROGRAM_ID),
            game_id: or("GAME_ID", DEFAULT_GAME_ID),

            event_organizer,

            service_label: or("SERVICE_LABEL", DEFAULT_SERVICE_LABEL),
            service_icon_url: or("SERVICE_ICON_URL", DEFAULT_SERVICE_ICON_URL),

            cors_allowed_origins: or("CORS_ALLOWED_ORIGINS", "*"),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.event_organizer.trim().is_empty() {
            anyhow::bail!("EVENT_ORGANIZER is empty");
        }
        if self.solana_rpc_url.trim().is_empty() {
            anyhow::bail!("SOLANA_RPC_URL is empty");
        }
        url::Url::parse(&self.solana_rpc_url)
            .map_err(|e| anyhow::anyhow!("SOLANA_RPC_URL is invalid: {}", e))?;
        self.program_pubkey()?;
        self.game_pubkey()?;

        if let Some(base) = &self.public_base_url {
            url::Url::parse(base)
                .map_err(|e| anyhow::anyhow!("PUBLIC_BASE_URL is invalid: {}", e))?;
        }

        if self.program_id == DEFAULT_PROGRAM_ID {
            tracing::warn!("Using built-in program id; set PROGRAM_ID for a real deployment");
        }
        if !self.is_devnet() && self.environment != "production" {
            tracing::warn!(
                "Non-devnet RPC configured while ENVIRONMENT={}",
                self.environment
            );
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn program_pubkey(&self) -> anyhow::Result<Pubkey> {
        Pubkey::from_str(self.program_id.trim())
            .map_err(|e| anyhow::anyhow!("PROGRAM_ID is not a valid public key: {}", e))
    }

    pub fn game_pubkey(&self) -> anyhow::Result<Pubkey> {
        Pubkey::from_str(self.game_id.trim())
            .map_err(|e| anyhow::anyhow!("GAME_ID is not a valid public key: {}", e))
    }

    /// Origin used when rendering links that wallets call back into.
    pub fn base_url(&self) -> String {
        match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }

    pub fn is_devnet(&self) -> bool {
        let rpc = self.solana_rpc_url.to_ascii_lowercase();
        rpc.contains("devnet") || rpc.contains("localhost") || rpc.contains("127.0.0.1")
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "development".to_string(),
        public_base_url: Some("https://hunt.example.com/".to_string()),
        solana_rpc_url: "http://localhost:8899".to_string(),
        program_id: DEFAULT_PROGRAM_ID.to_string(),
        game_id: DEFAULT_GAME_ID.to_string(),
        event_organizer: "[1,2,3]".to_string(),
        service_label: DEFAULT_SERVICE_LABEL.to_string(),
        service_icon_url: DEFAULT_SERVICE_ICON_URL.to_string(),
        cors_allowed_origins: "*".to_string(),
    }
}
