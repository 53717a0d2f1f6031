use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use crate::sizing::ScoreWeighting;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub headlines: HeadlineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Budget quoted to the reasoning service when the caller gives none
    #[serde(default)]
    pub budget_usdt: Option<Decimal>,
}

/// Knobs of the fallback allocator, passed explicitly to the core
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdvisorConfig {
    /// Quote asset appended to bare candidate symbols (e.g., "USDT")
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
    /// Number of candidates the fallback looks at
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
    /// Number of picks the fallback returns at most
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Liquidity term of the fallback score
    #[serde(default)]
    pub score_weighting: ScoreWeighting,
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

fn default_candidate_cap() -> usize {
    20
}

fn default_top_n() -> usize {
    3
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            quote_asset: default_quote_asset(),
            candidate_cap: default_candidate_cap(),
            top_n: default_top_n(),
            score_weighting: ScoreWeighting::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// API key; falls back to OPENAI_API_KEY when empty
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
    /// Attempts per query before giving up
    #[serde(default = "default_openai_retries")]
    pub max_retries: u8,
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_timeout() -> u64 {
    30
}

fn default_openai_retries() -> u8 {
    2
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_url(),
            model: default_openai_model(),
            timeout_secs: default_openai_timeout(),
            max_retries: default_openai_retries(),
        }
    }
}

impl OpenAiConfig {
    /// Configured key, else `OPENAI_API_KEY`, else empty
    pub fn resolved_api_key(&self) -> String {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// REST endpoint for 24h tickers
    #[serde(default = "default_exchange_url")]
    pub base_url: String,
    #[serde(default = "default_exchange_timeout")]
    pub timeout_secs: u64,
}

fn default_exchange_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_exchange_timeout() -> u64 {
    10
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_exchange_url(),
            timeout_secs: default_exchange_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadlineConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_headline_url")]
    pub base_url: String,
    #[serde(default = "default_headline_items")]
    pub max_items: usize,
    #[serde(default = "default_headline_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_headline_url() -> String {
    "https://cryptopanic.com".to_string()
}

fn default_headline_items() -> usize {
    6
}

fn default_headline_timeout() -> u64 {
    6
}

impl Default for HeadlineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_headline_url(),
            max_items: default_headline_items(),
            timeout_secs: default_headline_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Environment-specific overrides (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("ADVISOR_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // ADVISOR_ADVISOR__TOP_N, ADVISOR_OPENAI__MODEL, ...
            .add_source(
                Environment::with_prefix("ADVISOR")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.advisor.quote_asset.trim().is_empty() {
            errors.push("advisor.quote_asset must not be empty".to_string());
        }

        if self.advisor.candidate_cap == 0 {
            errors.push("advisor.candidate_cap must be positive".to_string());
        }

        if self.advisor.top_n == 0 {
            errors.push("advisor.top_n must be positive".to_string());
        }

        if let Some(budget) = self.budget_usdt {
            if budget <= Decimal::ZERO {
                errors.push("budget_usdt must be positive".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.advisor.quote_asset, "USDT");
        assert_eq!(config.advisor.candidate_cap, 20);
        assert_eq!(config.advisor.top_n, 3);
        assert_eq!(config.advisor.score_weighting, ScoreWeighting::Log10Volume);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("default.toml")).unwrap();
        writeln!(
            file,
            r#"
budget_usdt = 750

[advisor]
quote_asset = "USDC"
top_n = 2
score_weighting = "flat"

[openai]
model = "gpt-4o"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.advisor.quote_asset, "USDC");
        assert_eq!(config.advisor.top_n, 2);
        assert_eq!(config.advisor.candidate_cap, 20);
        assert_eq!(config.advisor.score_weighting, ScoreWeighting::Flat);
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.budget_usdt, Some(dec!(750)));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let mut config = AppConfig::default();
        config.advisor.top_n = 0;
        let errors = config.validate().unwrap_err();
        assert_eq!(errors, vec!["advisor.top_n must be positive".to_string()]);
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key(), "sk-test");
    }
}
