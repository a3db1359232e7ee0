use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`. Output is JSON with
/// flattened event fields so the collector side stays schema-free.
pub fn init_tracing(service_name: &str, log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .try_init()
        .unwrap_or_else(|e| {
            eprintln!(
                "Tracing subscriber for '{}' already initialized: {}",
                service_name, e
            );
        });
}
