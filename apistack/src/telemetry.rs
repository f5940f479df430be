//! Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(log_level: &str) -> String {
    format!("apistack={log_level},apistack_core={log_level},apistack_handlers={log_level},apistack_secrets={log_level},apistack_auth={log_level},tower_http=debug")
}

/// Install the global subscriber. Lambda output goes to CloudWatch, which
/// timestamps lines itself and does not render colours.
pub fn init(log_level: &str, lambda: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if lambda {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false).without_time())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
