use crate::settings::Settings;

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// `log_filter` setting.
#[cfg(not(feature = "profile-console"))]
pub fn init(settings: &Settings) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

/// tokio-console build: the console layer owns the subscriber.
#[cfg(feature = "profile-console")]
pub fn init(_settings: &Settings) {
    console_subscriber::init();
}
