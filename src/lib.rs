use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod api;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod messaging;
pub mod metrics;
pub mod notifications;
pub mod orders;
pub mod restaurants;
pub mod utils;

/// Initialize structured logging with environment-based filtering.
/// Default directive can be overridden with the RUST_LOG env var.
/// Example: RUST_LOG=debug cargo run --bin order-service
pub fn init_tracing(default_directive: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();
}
