use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// How many numbered `GEMINI_API_KEY_{n}` fallback variables to probe.
const EXTRA_API_KEY_SLOTS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct HoroscopeConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub database: DatabaseConfig,
    pub gemini: GeminiSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// Text model used for every prediction (e.g., gemini-2.0-flash).
    pub model: String,
    /// Ordered credential list; never empty once loaded.
    pub api_keys: Vec<String>,
    /// Credential selection strategy: "random" or "round_robin".
    pub strategy: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Records older than this are removed by the cleanup sweep.
    pub max_age_days: i64,
    /// Interval between background sweeps.
    pub sweep_interval_hours: u64,
}

impl HoroscopeConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let api_keys = load_api_keys();
        if api_keys.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "No Gemini API keys found: set GEMINI_API_KEY (and optionally GEMINI_API_KEY_1..{})",
                EXTRA_API_KEY_SLOTS
            )));
        }

        Ok(HoroscopeConfig {
            common: common_config,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", Some("sqlite://horoscope.db"), is_prod)?,
            },
            gemini: GeminiSettings {
                model: get_env("GEMINI_TEXT_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                api_keys,
                strategy: get_env("CREDENTIAL_STRATEGY", Some("random"), is_prod)?,
            },
            cache: CacheSettings {
                max_age_days: get_env("CACHE_MAX_AGE_DAYS", Some("7"), is_prod)?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!("Invalid CACHE_MAX_AGE_DAYS: {}", e))
                    })?,
                sweep_interval_hours: get_env("CACHE_SWEEP_INTERVAL_HOURS", Some("24"), is_prod)?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "Invalid CACHE_SWEEP_INTERVAL_HOURS: {}",
                            e
                        ))
                    })?,
            },
        })
    }
}

/// Collect the ordered credential pool from the environment.
///
/// `GEMINI_API_KEY` comes first, then `GEMINI_API_KEY_1` through
/// `GEMINI_API_KEY_5` when present. Order is preserved so round-robin
/// selection is deterministic.
fn load_api_keys() -> Vec<String> {
    let mut keys = Vec::new();

    if let Ok(main_key) = env::var("GEMINI_API_KEY") {
        if !main_key.is_empty() {
            keys.push(main_key);
        }
    }

    for i in 1..=EXTRA_API_KEY_SLOTS {
        if let Ok(key) = env::var(format!("GEMINI_API_KEY_{}", i)) {
            if !key.is_empty() {
                keys.push(key);
            }
        }
    }

    keys
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
