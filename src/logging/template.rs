//! Placeholder templates for text log lines and paths.
//!
//! A template is literal text with `{name}` placeholders. Recognised names
//! are listed in [`PLACEHOLDERS`]; anything else in braces is kept verbatim
//! when rendering so a typo shows up in the log instead of vanishing.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt::Write;

/// Placeholder names a template may use.
pub const PLACEHOLDERS: [&str; 9] = [
    "time",
    "date",
    "datetime_s",
    "datetime_l",
    "source",
    "target",
    "msg",
    "hostmask",
    "params",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Time,
    Date,
    DatetimeShort,
    DatetimeLong,
    Source,
    Target,
    Msg,
    Hostmask,
    Params,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "time" => Self::Time,
            "date" => Self::Date,
            "datetime_s" => Self::DatetimeShort,
            "datetime_l" => Self::DatetimeLong,
            "source" => Self::Source,
            "target" => Self::Target,
            "msg" => Self::Msg,
            "hostmask" => Self::Hostmask,
            "params" => Self::Params,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
    Unknown(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template. Parsing never fails: malformed braces are literal.
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let name = after
                .find('}')
                .map(|close| &after[..close])
                .filter(|name| is_placeholder_name(name));

            match name {
                Some(name) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(match Field::from_name(name) {
                        Some(field) => Segment::Field(field),
                        None => Segment::Unknown(name.to_string()),
                    });
                    rest = &after[name.len() + 1..];
                }
                None => {
                    literal.push('{');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Placeholder names that are not in [`PLACEHOLDERS`].
    pub fn unknown_placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Unknown(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Substitute every placeholder from `values`.
    pub fn render(&self, values: &Values<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(values.get(*field)),
                Segment::Unknown(name) => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Rendered values for one event.
#[derive(Debug, Clone, Default)]
pub struct Values<'a> {
    pub time: String,
    pub date: String,
    pub datetime_s: String,
    pub datetime_l: String,
    pub source: &'a str,
    pub target: &'a str,
    pub msg: &'a str,
    pub hostmask: &'a str,
    pub params: String,
}

impl Values<'_> {
    fn get(&self, field: Field) -> &str {
        match field {
            Field::Time => &self.time,
            Field::Date => &self.date,
            Field::DatetimeShort => &self.datetime_s,
            Field::DatetimeLong => &self.datetime_l,
            Field::Source => self.source,
            Field::Target => self.target,
            Field::Msg => self.msg,
            Field::Hostmask => self.hostmask,
            Field::Params => &self.params,
        }
    }
}

/// Whether `fmt` is a strftime string chrono can render.
pub fn is_valid_time_format(fmt: &str) -> bool {
    !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

/// Converts UTC event times into the four rendered timestamp fields.
#[derive(Debug, Clone)]
pub struct Clock {
    offset: FixedOffset,
    date_fmt: String,
    time_fmt: String,
    short_fmt: String,
    long_fmt: String,
}

/// The four timestamp fields of [`Values`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamps {
    pub time: String,
    pub date: String,
    pub datetime_s: String,
    pub datetime_l: String,
}

impl Clock {
    pub fn new(
        offset: FixedOffset,
        date_fmt: impl Into<String>,
        time_fmt: impl Into<String>,
        short_fmt: impl Into<String>,
        long_fmt: impl Into<String>,
    ) -> Self {
        Self {
            offset,
            date_fmt: date_fmt.into(),
            time_fmt: time_fmt.into(),
            short_fmt: short_fmt.into(),
            long_fmt: long_fmt.into(),
        }
    }

    pub fn stamps(&self, time: DateTime<Utc>) -> Stamps {
        let local = time.with_timezone(&self.offset);
        Stamps {
            time: format_time(&local, &self.time_fmt),
            date: format_time(&local, &self.date_fmt),
            datetime_s: format_time(&local, &self.short_fmt),
            datetime_l: format_time(&local, &self.long_fmt),
        }
    }
}

// An invalid format yields an empty field rather than a panic.
fn format_time(time: &DateTime<FixedOffset>, fmt: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", time.format(fmt)).is_err() {
        out.clear();
    }
    out
}
