//! Mamatoto: maternal and child health calculations.
//!
//! The engine modules (`dates`, `pregnancy`, `vaccination`, `growth`,
//! `mental_health`, `chat`) are pure functions over explicit inputs,
//! including "today". `db` stores records and `services` ties the two
//! together for an outer request layer.

pub mod config;
pub mod models;
pub mod reference;
pub mod dates;
pub mod pregnancy;
pub mod vaccination;
pub mod growth;
pub mod mental_health;
pub mod chat;
pub mod db;
pub mod services;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
