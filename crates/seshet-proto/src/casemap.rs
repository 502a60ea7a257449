//! IRC case-mapping functions.
//!
//! IRC uses a special case-insensitive comparison where some characters
//! are considered equivalent (e.g., `[` and `{`). This implements the
//! `rfc1459` case mapping which is the most common.

/// Convert a single character to IRC lowercase using RFC 1459 case mapping.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `[` → `{`
/// - `]` → `}`
/// - `\` → `|`
/// - `~` → `^`
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Convert a single character to IRC uppercase using RFC 1459 case mapping.
///
/// The inverse of [`irc_lower_char`]: `{` → `[`, `}` → `]`, `|` → `\`,
/// `^` → `~`, plus ASCII uppercase conversion.
#[inline]
pub const fn irc_upper_char(c: char) -> char {
    match c {
        '{' => '[',
        '}' => ']',
        '|' => '\\',
        '^' => '~',
        'a'..='z' => (c as u8 - 32) as char,
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Convert a string to IRC uppercase using RFC 1459 case mapping.
pub fn irc_to_upper(s: &str) -> String {
    s.chars().map(irc_upper_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
///
/// Uses the RFC 1459 case mapping where certain characters are equivalent.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}
