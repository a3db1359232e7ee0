use crate::models::{Horoscope, Sign, SignInfo};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Serialize)]
pub struct SignListResponse {
    pub signs: Vec<SignInfo>,
}

/// `GET /api/signs` — the fixed list the mobile client renders.
pub async fn list_signs() -> impl IntoResponse {
    let signs = Sign::ALL
        .iter()
        .map(|sign| SignInfo {
            id: sign.id().to_string(),
            name: sign.arabic_name().to_string(),
            icon: sign.icon(),
        })
        .collect();

    Json(SignListResponse { signs })
}

/// `GET /api/horoscope/{sign}` — today's prediction for one sign.
///
/// Sign validation happens here, before the cache manager is invoked;
/// the manager itself only ever sees one of the twelve values.
pub async fn get_horoscope(
    State(state): State<AppState>,
    Path(sign): Path<String>,
) -> Result<Json<Horoscope>, AppError> {
    let sign: Sign = sign
        .parse()
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("برج غير صحيح")))?;

    Ok(Json(state.horoscopes.get_horoscope(sign).await))
}

#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    pub days: Option<i64>,
}

#[derive(Serialize)]
pub struct CleanupResponse {
    pub deleted: u64,
}

/// `POST /api/cache/cleanup` — delete predictions older than `days`
/// (default from config). Idempotent.
pub async fn cleanup_cache(
    State(state): State<AppState>,
    Query(params): Query<CleanupParams>,
) -> Result<Json<CleanupResponse>, AppError> {
    let days = params.days.unwrap_or(state.config.cache.max_age_days);
    if days < 0 {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "days must be non-negative"
        )));
    }

    let deleted = state.horoscopes.cleanup_old_cache(days).await?;
    Ok(Json(CleanupResponse { deleted }))
}
