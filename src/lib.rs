//! # gundi-dlq
//!
//! A foreground CLI tool that drains dead-lettered Gundi events out of a
//! Pub/Sub subscription, either republishing them to a topic for another
//! delivery attempt or purging them for good.
//!
//! ## Usage
//!
//! ```bash
//! gundi-dlq --from-sub errors-dlq --project my-project --reprocess --to-topic events
//! gundi-dlq --from-sub errors-dlq --project my-project --purge
//! ```
//!
//! ## Modules
//!
//! - `cli` - Command-line argument structures
//! - `drain` - Classification, batch processing, session orchestration, crash recovery
//! - `error` - Error taxonomy shared across the crate
//! - `pubsub` - Pub/Sub REST clients, credentials, and message model
pub mod cli;
pub mod drain;
pub mod error;
pub mod pubsub;
