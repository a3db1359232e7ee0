//! HTTP behavior with an injected mock generator: sign listing and
//! validation, cache-source transitions, and the cleanup endpoint.

use horoscope_service::config::{
    CacheSettings, DatabaseConfig, GeminiSettings, HoroscopeConfig,
};
use horoscope_service::services::providers::mock::MockGenerator;
use horoscope_service::services::providers::TextGenerator;
use horoscope_service::services::{
    CredentialPool, HoroscopeService, HoroscopeStore, SelectionStrategy,
};
use horoscope_service::startup::{router, AppState};
use reqwest::Client;
use std::sync::Arc;
use tempfile::TempDir;

/// Spawn the router with a mock generator on an ephemeral port.
async fn spawn_app() -> (String, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}/horoscope.db", dir.path().display());

    let store = HoroscopeStore::connect(&url)
        .await
        .expect("Failed to open store");
    store.run_migrations().await.expect("Failed to migrate");

    let config = HoroscopeConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig { url },
        gemini: GeminiSettings {
            model: "gemini-2.0-flash".to_string(),
            api_keys: vec!["key-a".to_string(), "key-b".to_string()],
            strategy: "round_robin".to_string(),
        },
        cache: CacheSettings {
            max_age_days: 7,
            sweep_interval_hours: 24,
        },
    };

    let generator: Arc<dyn TextGenerator> = Arc::new(MockGenerator::new());
    let credentials = CredentialPool::from_raw(
        &config.gemini.api_keys,
        SelectionStrategy::RoundRobin,
    )
    .expect("Failed to build pool");
    let horoscopes = HoroscopeService::new(store.clone(), generator, credentials);

    let state = AppState {
        config,
        store,
        horoscopes,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .await
            .expect("Server error");
    });

    (format!("http://127.0.0.1:{}", port), dir)
}

#[tokio::test]
async fn signs_endpoint_lists_all_twelve() {
    let (base, _dir) = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/signs", base))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let signs = body["signs"].as_array().expect("signs must be an array");
    assert_eq!(signs.len(), 12);

    assert_eq!(signs[0]["id"], "aries");
    assert_eq!(signs[0]["name"], "الحمل");
    assert_eq!(signs[0]["icon"], "aries.png");
}

#[tokio::test]
async fn horoscope_is_fetched_once_then_cached() {
    let (base, _dir) = spawn_app().await;
    let client = Client::new();

    let first: serde_json::Value = client
        .get(format!("{}/api/horoscope/aries", base))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(first["sign"], "الحمل");
    assert_eq!(first["source"], "api");
    assert!(!first["prediction"].as_str().unwrap().is_empty());
    assert!(!first["date"].as_str().unwrap().is_empty());

    // Second request, this time by Arabic name; same key, served from cache.
    let second: serde_json::Value = client
        .get(format!("{}/api/horoscope/{}", base, "الحمل"))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(second["source"], "cache");
    assert_eq!(second["prediction"], first["prediction"]);
}

#[tokio::test]
async fn unknown_sign_is_rejected_before_the_manager() {
    let (base, _dir) = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/horoscope/ophiuchus", base))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 400);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Bad request: برج غير صحيح");
}

#[tokio::test]
async fn cleanup_endpoint_is_idempotent_and_spares_fresh_rows() {
    let (base, _dir) = spawn_app().await;
    let client = Client::new();

    // Cache one fresh row.
    client
        .get(format!("{}/api/horoscope/leo", base))
        .send()
        .await
        .expect("Failed to send request");

    let body: serde_json::Value = client
        .post(format!("{}/api/cache/cleanup", base))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(body["deleted"], 0);

    // The fresh row survived the sweep.
    let cached: serde_json::Value = client
        .get(format!("{}/api/horoscope/leo", base))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(cached["source"], "cache");
}

#[tokio::test]
async fn cleanup_rejects_negative_days() {
    let (base, _dir) = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/cache/cleanup?days=-1", base))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 400);
}
