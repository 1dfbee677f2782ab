//! Cadence Scheduler Core (engine-agnostic)
//!
//! A per-frame update scheduler over two time domains (scaled and unscaled).
//! Entities implement [`Updatable`], register through [`UpdateScheduler`],
//! and are advanced once per [`UpdateScheduler::tick`]. Registration changes
//! are deferred to the next tick so they are safe to issue from anywhere,
//! including from inside another entity's update.

pub mod config;
pub mod error;
pub mod global;
pub mod scheduler;
pub mod updatable;

// Re-exports for consumers (adapters)
pub use config::SchedulerConfig;
pub use error::{Result, SchedulerError};
pub use scheduler::{Registration, TickStats, Unregistration, UpdateScheduler};
pub use updatable::{EntityKey, TimeDomain, Updatable};
