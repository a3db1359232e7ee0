//! Configuration loading. Kept in its own binary, as a single test,
//! because it mutates the credential environment variables that other
//! test binaries rely on being stable.

use horoscope_service::config::HoroscopeConfig;

fn clear_api_keys() {
    std::env::remove_var("GEMINI_API_KEY");
    for i in 1..=5 {
        std::env::remove_var(format!("GEMINI_API_KEY_{}", i));
    }
}

#[test]
fn credential_pool_loading() {
    // Without any key, startup must fail.
    clear_api_keys();
    assert!(HoroscopeConfig::load().is_err());

    // Numbered fallback keys join the pool after the primary, in order.
    std::env::set_var("GEMINI_API_KEY", "primary");
    std::env::set_var("GEMINI_API_KEY_1", "backup-1");
    std::env::set_var("GEMINI_API_KEY_2", "backup-2");

    let config = HoroscopeConfig::load().expect("Failed to load config");
    assert_eq!(
        config.gemini.api_keys,
        vec!["primary", "backup-1", "backup-2"]
    );
    assert_eq!(config.cache.max_age_days, 7);
    assert_eq!(config.gemini.strategy, "random");

    clear_api_keys();
}
