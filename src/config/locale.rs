//! Timestamp rendering configuration for text logs.

use chrono::FixedOffset;
use serde::Deserialize;

use super::defaults::{
    default_date_fmt, default_locale, default_long_datetime_fmt, default_short_datetime_fmt,
    default_time_fmt, default_utc_offset,
};

/// Locale configuration.
///
/// Formats are `chrono` strftime strings. Day and month names are always
/// English; `locale` is informational.
#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// Fixed offset applied to UTC event times, e.g. `"+02:00"` or `"UTC"`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Rendered as `{date}`.
    #[serde(default = "default_date_fmt")]
    pub date_fmt: String,
    /// Rendered as `{time}`.
    #[serde(default = "default_time_fmt")]
    pub time_fmt: String,
    /// Rendered as `{datetime_s}`.
    #[serde(default = "default_short_datetime_fmt")]
    pub short_datetime_fmt: String,
    /// Rendered as `{datetime_l}`.
    #[serde(default = "default_long_datetime_fmt")]
    pub long_datetime_fmt: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
            locale: default_locale(),
            date_fmt: default_date_fmt(),
            time_fmt: default_time_fmt(),
            short_datetime_fmt: default_short_datetime_fmt(),
            long_datetime_fmt: default_long_datetime_fmt(),
        }
    }
}

impl LocaleConfig {
    /// The configured offset, or `None` if `utc_offset` does not parse.
    pub fn offset(&self) -> Option<FixedOffset> {
        parse_utc_offset(&self.utc_offset)
    }

    /// Every strftime field, paired with its config key.
    pub fn formats(&self) -> [(&'static str, &str); 4] {
        [
            ("locale.date_fmt", self.date_fmt.as_str()),
            ("locale.time_fmt", self.time_fmt.as_str()),
            ("locale.short_datetime_fmt", self.short_datetime_fmt.as_str()),
            ("locale.long_datetime_fmt", self.long_datetime_fmt.as_str()),
        ]
    }
}

/// Parse `UTC`, `Z`, `+HH:MM`, `-HHMM` or `+HH`.
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match s.as_bytes()[0] {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    if !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }
    let (hours, minutes) = match rest.len() {
        2 => (rest, "00"),
        4 if !rest.contains(':') => (&rest[..2], &rest[2..]),
        5 if rest.as_bytes()[2] == b':' => (&rest[..2], &rest[3..]),
        _ => return None,
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
