//! Error types for the scheduler crate.

use thiserror::Error;

/// Failures around the process-wide scheduler slot.
///
/// Per-entity operations never fail; they report through
/// [`crate::Registration`] and [`crate::Unregistration`] instead.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchedulerError {
    #[error("a process-wide scheduler is already installed")]
    AlreadyInstalled,
    #[error("no process-wide scheduler is installed")]
    NotInstalled,
}

pub type Result<T> = core::result::Result<T, SchedulerError>;
