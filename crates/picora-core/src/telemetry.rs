use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with an env-filtered fmt subscriber.
///
/// Intended for embedding applications and integration tests; safe to call
/// more than once, later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "picora=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
