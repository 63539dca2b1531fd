//! Core error types for habitxp-core.
//!
//! Negative outcomes that are part of normal operation (an active cooldown,
//! a conflicting bonus effect) are **not** errors -- they are result
//! variants on the operations that produce them. The enums here cover the
//! cases that abort an operation.

use std::fmt;

use thiserror::Error;

/// Core error type for habitxp-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Duration string could not be parsed
    #[error("Duration error: {0}")]
    Duration(#[from] DurationError),

    /// Storage collaborator failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Reward oracle failed in a non-recoverable way
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
}

/// Kind of entity named in a [`CoreError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    User,
    Space,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Task => "Task",
            EntityKind::User => "User",
            EntityKind::Space => "Space",
        };
        f.write_str(s)
    }
}

/// Duration parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// The raw string matches no recognized duration shape, or carries a
    /// malformed number inside a recognized suffix.
    #[error("Invalid duration format: {0:?}")]
    InvalidFormat(String),
}

/// Storage collaborator errors.
///
/// An absent entity is `Ok(None)` on the lookup, never an error; this enum
/// only covers backend failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store failed to execute the operation
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Reward oracle errors.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The oracle rejected the request due to rate limiting. Recovered at
    /// the task-creation boundary by substituting the configured default
    /// reward; never surfaced to the end user.
    #[error("Reward oracle rate limited")]
    RateLimited,

    /// The oracle is unreachable or returned garbage
    #[error("Reward oracle unavailable: {0}")]
    Unavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// The user already owns as many tasks as their limit allows
    #[error("Task limit reached: {limit}")]
    TaskLimitReached { limit: u32 },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
