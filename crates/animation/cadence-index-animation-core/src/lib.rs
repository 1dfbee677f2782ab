//! Discrete index animation driven by the cadence update scheduler.
//!
//! An [`IndexAnimation`] steps an integer index through a sequence of frames,
//! each held for its own delay, in linear or yoyo order with an optional loop
//! budget. [`IndexAnimationHandle`] owns one and keeps it registered with an
//! [`UpdateScheduler`](cadence_scheduler_core::UpdateScheduler).

pub mod animation;
pub mod config;
pub mod error;
pub mod handle;
pub mod ids;
pub mod listeners;
pub mod loader;

pub use animation::{Direction, IndexAnimation, PlaybackState};
pub use config::{IndexAnimationCfg, PlayMode, FALLBACK_DELAY};
pub use error::AnimationError;
pub use handle::{IndexAnimationHandle, SharedIndexAnimation};
pub use ids::ListenerId;
pub use listeners::{IndexListener, ListenerRegistry, Subscription};
pub use loader::{index_animation_from_value, parse_index_animation_json};
