use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted prediction, one row per (sign, date).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HoroscopeRecord {
    pub sign: String,
    pub date: String,
    pub prediction: String,
    pub created_at: DateTime<Utc>,
}

/// Where a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Served from the store without touching the provider.
    Cache,
    /// Freshly generated on the first provider attempt.
    Api,
    /// Generated on the rotated-credential retry.
    ApiFallback,
    /// Both attempts failed; prediction is a placeholder and not persisted.
    Error,
}

/// The caller-facing result of a horoscope request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Horoscope {
    pub sign: String,
    pub date: String,
    pub prediction: String,
    pub source: Source,
}

/// Entry in the `/api/signs` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInfo {
    pub id: String,
    pub name: String,
    pub icon: String,
}
