//! Log output setup.
//!
//! Development builds print multi-line, human-readable events with source
//! locations. Production emits one flattened JSON object per event, carrying
//! the fields of the enclosing `request` span (request id, method, uri).
//! `RUST_LOG` always takes precedence over the defaults below.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

const DEVELOPMENT_FILTER: &str = "debug,tower_http=debug,sqlx=warn";
const PRODUCTION_FILTER: &str = "info,tower_http=info,sqlx=warn";

/// Default directives used when `RUST_LOG` is not set.
pub const fn default_filter(env: Environment) -> &'static str {
    match env {
        Environment::Development => DEVELOPMENT_FILTER,
        Environment::Production => PRODUCTION_FILTER,
    }
}

pub fn init_tracing(env: Environment) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .pretty()
                    .with_filter(env_filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .flatten_event(true)
                    .with_target(true)
                    .with_filter(env_filter),
            )
            .init();
    }

    tracing::info!(environment = %env, "Tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        for env in [Environment::Development, Environment::Production] {
            assert!(EnvFilter::try_new(default_filter(env)).is_ok());
        }
        assert!(default_filter(Environment::Production).starts_with("info"));
    }
}
