//! Food World
//!
//! Conversational backend for a voice-driven recipe assistant. A user
//! collects ingredients by voice, the service finds recipes that use all of
//! them, then walks the user through the ingredient list and the cooking
//! steps, one short stateless turn at a time.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP endpoint that accepts decoded intents
//! - **Dialog**: state machine over four states plus a restart confirmation
//! - **Recipes**: read-only catalog, ingredient normalizer and superset matcher
//! - **Session**: per-user dialog state persisted between turns
//!
//! # Modules
//!
//! - [`recipes`]: catalog loading, normalization and matching
//! - [`dialog`]: intents, transitions and reply rendering
//! - [`session`]: typed session model and store adapter
//! - [`persistence`]: storage providers (memory, SurrealDB, Postgres)
//! - [`turn`]: one request/response cycle

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod dialog;
pub mod persistence;
pub mod rate_limit;
pub mod recipes;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod turn;

use crate::config::AppConfig;
use crate::rate_limit::SimpleRateLimiter;

use persistence::UserRepository;
use recipes::RecipeCatalog;
use session::SessionStore;
use std::sync::Arc;
use turn::TurnService;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Dialog turn pipeline.
    pub turns: Arc<TurnService>,
    /// Read-only recipe corpus.
    pub catalog: Arc<RecipeCatalog>,
    /// Global Rate Limiter
    pub rate_limiter: Arc<SimpleRateLimiter>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        catalog: Arc<RecipeCatalog>,
        repository: Arc<dyn UserRepository>,
    ) -> Self {
        let store = SessionStore::new(repository, Arc::clone(&catalog));
        let rate_limiter = Arc::new(SimpleRateLimiter::new(
            config.resilience.requests_per_second,
            config.resilience.burst_size,
        ));
        Self {
            turns: Arc::new(TurnService::new(store, Arc::clone(&catalog))),
            catalog,
            rate_limiter,
            config,
        }
    }
}
