//! Structured logging for the back office server
//!
//! Sets up tracing-based logging with configurable levels. HTTP request spans
//! come from `tower_http::trace::TraceLayer` in the router.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system
///
/// - Environment-based filtering via RUST_LOG env var
/// - Default level of INFO in release builds, DEBUG in debug builds
/// - Compact console output with target, file and line
pub fn init() {
    let default_level = if cfg!(debug_assertions) {
        "backoffice=debug,backoffice_lib=debug,tower_http=debug,info"
    } else {
        "backoffice=info,backoffice_lib=info,warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Initialize logging for tests
///
/// Uses try_init() so repeated calls across tests do not panic.
#[cfg(test)]
pub(crate) fn init_test() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// Span for a named back office operation, e.g. a login or a bulk action.
#[macro_export]
macro_rules! operation_span {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
