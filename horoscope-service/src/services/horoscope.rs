//! The horoscope cache manager.
//!
//! Sits between the HTTP handlers and the text-generation provider and
//! guarantees at most one provider call per (sign, date) under normal
//! operation: cache lookup first, then one provider attempt, then one
//! retry with a rotated credential, then a degraded placeholder that is
//! deliberately never persisted.

use crate::models::{Horoscope, Sign, Source};
use crate::services::credentials::CredentialPool;
use crate::services::database::HoroscopeStore;
use crate::services::providers::TextGenerator;
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Africa::Cairo;
use chrono_tz::Tz;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;

const ARABIC_MONTHS: [&str; 12] = [
    "يناير",
    "فبراير",
    "مارس",
    "إبريل",
    "مايو",
    "يونيو",
    "يوليو",
    "أغسطس",
    "سبتمبر",
    "أكتوبر",
    "نوفمبر",
    "ديسمبر",
];

#[derive(Clone)]
pub struct HoroscopeService {
    store: HoroscopeStore,
    generator: Arc<dyn TextGenerator>,
    credentials: CredentialPool,
}

impl HoroscopeService {
    pub fn new(
        store: HoroscopeStore,
        generator: Arc<dyn TextGenerator>,
        credentials: CredentialPool,
    ) -> Self {
        Self {
            store,
            generator,
            credentials,
        }
    }

    /// Answer "give me today's horoscope for `sign`".
    ///
    /// Never fails: the worst outcome is a placeholder prediction with
    /// `source = error`, which is not persisted so the next request for
    /// the same day goes back to the provider.
    #[instrument(skip(self), fields(sign = %sign.id()))]
    pub async fn get_horoscope(&self, sign: Sign) -> Horoscope {
        let date = today_in_cairo();
        let name = sign.arabic_name();

        // A read failure must not look like a successful miss; log it
        // distinctly and fall through to the provider.
        match self.store.get(name, &date).await {
            Ok(Some(record)) => {
                tracing::debug!(date = %date, "Cache hit");
                return Horoscope {
                    sign: name.to_string(),
                    date,
                    prediction: record.prediction,
                    source: Source::Cache,
                };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(date = %date, error = %e, "Cache read failed, treating as miss");
            }
        }

        let prompt = build_prompt(name, &date);
        let (first_index, first_key) = self.credentials.select();

        let (prediction, source) = match self.generator.generate(&prompt, &first_key).await {
            Ok(text) => (text, Source::Api),
            Err(first_err) => {
                tracing::warn!(
                    date = %date,
                    error = %first_err,
                    pool_size = self.credentials.len(),
                    "Provider call failed, rotating credential for one retry"
                );

                let (_, retry_key) = self.credentials.select_excluding(first_index);
                match self.generator.generate(&prompt, &retry_key).await {
                    Ok(text) => (text, Source::ApiFallback),
                    Err(retry_err) => {
                        tracing::error!(
                            date = %date,
                            error = %retry_err,
                            "Retry with rotated credential failed, returning placeholder"
                        );
                        return Horoscope {
                            sign: name.to_string(),
                            date,
                            prediction: format!("عذراً، لم نتمكن من جلب توقعات {}", name),
                            source: Source::Error,
                        };
                    }
                }
            }
        };

        // Losing the write only costs a future cache miss; the fetched
        // text is still returned.
        if let Err(e) = self.store.upsert(name, &date, &prediction, Utc::now()).await {
            tracing::error!(date = %date, error = %e, "Failed to persist prediction");
        }

        Horoscope {
            sign: name.to_string(),
            date,
            prediction,
            source,
        }
    }

    /// Delete cached predictions older than `max_age_days`.
    ///
    /// Idempotent; a no-op on an empty store.
    #[instrument(skip(self))]
    pub async fn cleanup_old_cache(&self, max_age_days: i64) -> Result<u64, AppError> {
        let deleted = self.store.delete_older_than(max_age_days).await?;
        if deleted > 0 {
            tracing::info!(deleted = deleted, max_age_days = max_age_days, "Cleaned up old cache entries");
        }
        Ok(deleted)
    }

    pub fn store(&self) -> &HoroscopeStore {
        &self.store
    }
}

/// Today's calendar date in the fixed reference timezone, rendered in
/// Arabic ("{day} {month} {year}"). This string is the cache key's date
/// component, so it must be stable for the whole Cairo calendar day.
pub fn today_in_cairo() -> String {
    arabic_date(Utc::now().with_timezone(&Cairo))
}

fn arabic_date(now: DateTime<Tz>) -> String {
    format!(
        "{} {} {}",
        now.day(),
        ARABIC_MONTHS[now.month0() as usize],
        now.year()
    )
}

/// Fixed prompt template, parameterized by (sign, date).
fn build_prompt(sign_name: &str, date: &str) -> String {
    format!(
        "اكتب توقعات تفصيلية لـ برج {sign} ليوم {date}.\n\
         يجب أن تشمل التوقعات المجالات التالية بالترتيب:\n\n\
         1. نظرة عامة على اليوم\n\
         2. الحب والعلاقات العاطفية\n\
         3. العمل والحياة المهنية\n\
         4. الصحة والطاقة\n\
         5. المال والأمور المادية\n\n\
         اجعل التوقعات إيجابية ومفصلة ومفيدة.",
        sign = sign_name,
        date = date,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn arabic_date_uses_arabic_month_names() {
        let date = Cairo.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(arabic_date(date), "9 مارس 2025");

        let date = Cairo.with_ymd_and_hms(2025, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(arabic_date(date), "31 ديسمبر 2025");
    }

    #[test]
    fn prompt_contains_sign_and_date() {
        let prompt = build_prompt("الحمل", "9 مارس 2025");
        assert!(prompt.contains("برج الحمل"));
        assert!(prompt.contains("9 مارس 2025"));
    }
}
