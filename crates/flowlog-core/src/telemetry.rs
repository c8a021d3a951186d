//! Subscriber setup for applications that do not install their own.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directive used by [`init_default_tracing`]
pub const DEFAULT_DIRECTIVE: &str = "info,flowlog=info,flowlog::batch=info";

/// Install a global subscriber that prints records to stdout.
///
/// The filter comes from `RUST_LOG`, else `default_directive`. Fails if a
/// global subscriber is already set, in which case records keep going to
/// that subscriber.
pub fn init_tracing(default_directive: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// [`init_tracing`] with [`DEFAULT_DIRECTIVE`], ignoring an existing
/// subscriber
pub fn init_default_tracing() {
    let _ = init_tracing(DEFAULT_DIRECTIVE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_without_panicking() {
        init_default_tracing();
        assert!(init_tracing("debug").is_err());
    }
}
