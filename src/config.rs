use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::constants::*;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Base chain
    pub base_rpc_url: String,

    // Block explorer (Etherscan v2 compatible)
    pub explorer_api_url: String,
    pub explorer_chain_id: u64,
    pub explorer_api_key: Option<String>,
    pub activity_page_size: u32,

    // Token holdings
    pub holdings_api_url: String,
    pub holdings_fallback_api_url: String,
    pub holdings_fallback_api_key: Option<String>,

    // Name resolution
    pub ens_api_url: String,
    pub web3bio_api_url: String,
    pub basename_resolver_address: String,

    // Timeouts
    pub rpc_timeout_ms: u64,
    pub explorer_timeout_ms: u64,
    pub name_timeout_ms: u64,
    pub holdings_timeout_ms: u64,

    // Share redirect
    pub share_text: String,
    pub app_url: String,

    // CORS
    pub cors_allowed_origins: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            base_rpc_url: DEFAULT_BASE_RPC_URL.to_string(),
            explorer_api_url: DEFAULT_EXPLORER_API_URL.to_string(),
            explorer_chain_id: BASE_CHAIN_ID,
            explorer_api_key: None,
            activity_page_size: DEFAULT_ACTIVITY_PAGE_SIZE,
            holdings_api_url: DEFAULT_HOLDINGS_API_URL.to_string(),
            holdings_fallback_api_url: DEFAULT_HOLDINGS_FALLBACK_API_URL.to_string(),
            holdings_fallback_api_key: None,
            ens_api_url: DEFAULT_ENS_API_URL.to_string(),
            web3bio_api_url: DEFAULT_WEB3BIO_API_URL.to_string(),
            basename_resolver_address: DEFAULT_BASENAME_RESOLVER_ADDRESS.to_string(),
            rpc_timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
            explorer_timeout_ms: DEFAULT_EXPLORER_TIMEOUT_MS,
            name_timeout_ms: DEFAULT_NAME_TIMEOUT_MS,
            holdings_timeout_ms: DEFAULT_HOLDINGS_TIMEOUT_MS,
            share_text: DEFAULT_SHARE_TEXT.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            cors_allowed_origins: "*".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        Ok(Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT", defaults.port)?,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            base_rpc_url: env::var("BASE_RPC_URL").unwrap_or(defaults.base_rpc_url),

            explorer_api_url: env::var("EXPLORER_API_URL").unwrap_or(defaults.explorer_api_url),
            explorer_chain_id: env_parse("EXPLORER_CHAIN_ID", defaults.explorer_chain_id)?,
            explorer_api_key: env_secret("BASESCAN_API_KEY")
                .or_else(|| env_secret("ETHERSCAN_API_KEY")),
            activity_page_size: env_parse("ACTIVITY_PAGE_SIZE", defaults.activity_page_size)?,

            holdings_api_url: env::var("HOLDINGS_API_URL").unwrap_or(defaults.holdings_api_url),
            holdings_fallback_api_url: env::var("HOLDINGS_FALLBACK_API_URL")
                .unwrap_or(defaults.holdings_fallback_api_url),
            holdings_fallback_api_key: env_secret("HOLDINGS_FALLBACK_API_KEY"),

            ens_api_url: env::var("ENS_API_URL").unwrap_or(defaults.ens_api_url),
            web3bio_api_url: env::var("WEB3BIO_API_URL").unwrap_or(defaults.web3bio_api_url),
            basename_resolver_address: env::var("BASENAME_RESOLVER_ADDRESS")
                .unwrap_or(defaults.basename_resolver_address),

            rpc_timeout_ms: env_parse("RPC_TIMEOUT_MS", defaults.rpc_timeout_ms)?,
            explorer_timeout_ms: env_parse("EXPLORER_TIMEOUT_MS", defaults.explorer_timeout_ms)?,
            name_timeout_ms: env_parse("NAME_TIMEOUT_MS", defaults.name_timeout_ms)?,
            holdings_timeout_ms: env_parse("HOLDINGS_TIMEOUT_MS", defaults.holdings_timeout_ms)?,

            share_text: env::var("SHARE_TEXT").unwrap_or(defaults.share_text),
            app_url: env::var("APP_URL").unwrap_or(defaults.app_url),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_rpc_url.trim().is_empty() {
            anyhow::bail!("BASE_RPC_URL is empty");
        }
        if self.holdings_api_url.trim().is_empty() {
            anyhow::bail!("HOLDINGS_API_URL is empty");
        }
        if self.rpc_timeout_ms == 0
            || self.explorer_timeout_ms == 0
            || self.name_timeout_ms == 0
            || self.holdings_timeout_ms == 0
        {
            anyhow::bail!("Upstream timeouts must be > 0ms");
        }
        if self.activity_page_size == 0 || self.activity_page_size > MAX_ACTIVITY_PAGE_SIZE {
            anyhow::bail!(
                "ACTIVITY_PAGE_SIZE must be between 1 and {}",
                MAX_ACTIVITY_PAGE_SIZE
            );
        }

        if self.explorer_api_key.is_none() {
            tracing::warn!(
                "No BASESCAN_API_KEY/ETHERSCAN_API_KEY set; activity will use the RPC nonce fallback"
            );
        }
        if self.explorer_chain_id != BASE_CHAIN_ID {
            tracing::warn!(
                "EXPLORER_CHAIN_ID={} is not Base mainnet ({})",
                self.explorer_chain_id,
                BASE_CHAIN_ID
            );
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn explorer_timeout(&self) -> Duration {
        Duration::from_millis(self.explorer_timeout_ms)
    }

    pub fn name_timeout(&self) -> Duration {
        Duration::from_millis(self.name_timeout_ms)
    }

    pub fn holdings_timeout(&self) -> Duration {
        Duration::from_millis(self.holdings_timeout_ms)
    }
}

// Blank or unset falls back to `default`.
fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e)),
        _ => Ok(default),
    }
}

// Blank counts as unset.
fn env_secret(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
