//! Unified error handling for the bot core.
//!
//! Component errors live next to their components ([`LogError`],
//! [`StoreError`], [`DbError`], [`ConfigError`]); [`HandlerError`] is what
//! the event pipeline and the actor handle return.

use crate::config::ConfigError;
use crate::db::DbError;
use crate::logging::LogError;
use crate::store::StoreError;
use thiserror::Error;

// ============================================================================
// Handler Errors (event processing)
// ============================================================================

/// Errors that abort processing of one event.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("event log error: {0}")]
    Log(#[from] LogError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("no database configured")]
    NoDatabase,

    /// The bot task has stopped and can no longer take commands.
    #[error("bot task is gone")]
    ActorGone,
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Log(_) => "log_error",
            Self::Store(_) => "store_error",
            Self::Db(_) => "db_error",
            Self::Config(_) => "config_error",
            Self::NoDatabase => "no_database",
            Self::ActorGone => "actor_gone",
        }
    }
}

pub type HandlerResult<T = ()> = Result<T, HandlerError>;
