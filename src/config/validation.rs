//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::logging::template::{Template, is_valid_time_format};
use seshet_proto::EventKind;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("client.nickname is required")]
    MissingNickname,
    #[error("locale.utc_offset is not a valid offset: '{0}'")]
    InvalidUtcOffset(String),
    #[error("{field} is not a valid strftime format: '{value}'")]
    InvalidTimeFormat { field: &'static str, value: String },
    #[error("logging.templates has unknown event kind '{0}'")]
    UnknownEventKind(String),
    #[error("{location} uses unknown placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder {
        location: String,
        placeholder: String,
    },
    #[error("state.history_len must be at least 1")]
    ZeroHistoryLen,
    #[error("database.path must not be empty")]
    EmptyDatabasePath,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.client.nickname.trim().is_empty() {
        errors.push(ValidationError::MissingNickname);
    }

    // Locale
    if config.locale.offset().is_none() {
        errors.push(ValidationError::InvalidUtcOffset(
            config.locale.utc_offset.clone(),
        ));
    }
    for (field, value) in config.locale.formats() {
        if !is_valid_time_format(value) {
            errors.push(ValidationError::InvalidTimeFormat {
                field,
                value: value.to_string(),
            });
        }
    }

    // Templates
    let mut check_template = |location: String, source: &str| {
        for placeholder in Template::parse(source).unknown_placeholders() {
            errors.push(ValidationError::UnknownPlaceholder {
                location: location.clone(),
                placeholder: placeholder.to_string(),
            });
        }
    };
    check_template("logging.file".to_string(), &config.logging.file);
    let mut kinds: Vec<_> = config.logging.templates.iter().collect();
    kinds.sort();
    for (kind, template) in kinds {
        check_template(format!("logging.templates.{kind}"), template);
    }
    for kind in config.logging.templates.keys() {
        if kind.parse::<EventKind>().is_err() {
            errors.push(ValidationError::UnknownEventKind(kind.clone()));
        }
    }

    if config.state.history_len == 0 {
        errors.push(ValidationError::ZeroHistoryLen);
    }

    // Missing parent directories are created when the database is opened.
    if let Some(ref db) = config.database
        && db.path.trim().is_empty()
    {
        errors.push(ValidationError::EmptyDatabasePath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
