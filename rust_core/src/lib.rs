//! SEA Core - signal detection and confidence scoring for emotion arbitrage.
//!
//! This module provides:
//! - Narrative classification of operator notes (English and Chinese)
//! - A fixed rule catalog that turns one market entry into directional signals
//! - Score aggregation with a corroboration bonus
//! - Recommendation synthesis keyed off the spread sign
//! - Parallel batch analysis via rayon
//! - Queue records and stores (in-memory, Redis) for analyzed uploads
//! - A thin Redis pub/sub bus for services

mod types;

pub mod config;
pub mod engine;
pub mod narrative;
pub mod recommendation;
pub mod rules;
pub mod scoring;

// Service modules
pub mod models;
pub mod queue;
pub mod redis;
pub mod utils;

pub use config::EngineConfig;
pub use engine::{analyze, SignalEngine};
pub use narrative::{classify, Category, CategorySet, Narrative, StreakPolarity};
pub use queue::{InMemoryQueueStore, QueueError, QueueStore, RedisQueueStore};
pub use recommendation::{synthesize, Recommendation};
pub use rules::{evaluate, RULE_CATALOG};
pub use scoring::aggregate;
pub use types::*;
