//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Client Defaults
// =============================================================================

pub fn default_nickname() -> String {
    "Seshet".to_string()
}

pub fn default_user() -> String {
    "seshet".to_string()
}

pub fn default_realname() -> String {
    "seshetbot".to_string()
}

// =============================================================================
// Locale Defaults
// =============================================================================

pub fn default_utc_offset() -> String {
    "+00:00".to_string()
}

pub fn default_locale() -> String {
    "en_US".to_string()
}

/// e.g. `071415`
pub fn default_date_fmt() -> String {
    "%m%d%y".to_string()
}

/// e.g. `11:49:57`
pub fn default_time_fmt() -> String {
    "%H:%M:%S".to_string()
}

/// e.g. `2015-07-14 11:49:57`
pub fn default_short_datetime_fmt() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

/// e.g. `Tuesday 14 July 2015 at 11:49:57 +00:00`
pub fn default_long_datetime_fmt() -> String {
    "%A %d %B %Y at %H:%M:%S %Z".to_string()
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_file() -> String {
    "logs/{target}_{date}.log".to_string()
}

/// Templates used when the config has no `[logging.templates]` table.
pub fn default_templates() -> Vec<(&'static str, &'static str)> {
    vec![
        ("message", "[{time}] <{source}> {msg}"),
        ("action", "[{time}] * {source} {msg}"),
        ("notice", "[{time}] -{source}- {msg}"),
        ("join", "[{time}] --> {source} ({hostmask}) has joined {target}"),
        ("part", "[{time}] <-- {source} ({hostmask}) has left {target} ({msg})"),
        ("quit", "[{time}] <-- {source} ({hostmask}) has quit ({msg})"),
        ("kick", "[{time}] <-- {params} was kicked from {target} by {source} ({msg})"),
        ("nick", "[{time}] -- {source} is now known as {params}"),
        ("mode", "[{time}] -- {source} sets mode {msg} {params}"),
    ]
}

// =============================================================================
// State / Debug Defaults
// =============================================================================

pub fn default_history_len() -> usize {
    100
}

pub fn default_verbosity() -> String {
    "warn".to_string()
}

pub fn default_database_path() -> String {
    "seshet.db".to_string()
}
