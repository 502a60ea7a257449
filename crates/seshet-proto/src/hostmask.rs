//! User hostmasks (`nick!user@host`).
//!
//! Events carry the origin of a message as a hostmask. The event logger
//! records the `user@host` part, and the state tracker keeps the host on
//! each user it observes.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::fmt;

/// A parsed `nick!user@host` origin. Any component may be empty.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hostmask {
    /// Nickname part, before `!`.
    pub nick: String,
    /// Username (ident) part, between `!` and `@`.
    pub user: String,
    /// Hostname part, after `@`.
    pub host: String,
}

impl Hostmask {
    /// Create a hostmask from its components.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// Parse a hostmask leniently.
    ///
    /// Accepts the full `nick!user@host` form as well as the `user@host`
    /// form that the external protocol layer delivers with events. No
    /// component is validated.
    ///
    /// ```
    /// use seshet_proto::Hostmask;
    ///
    /// let full = Hostmask::parse("alice!al@example.org");
    /// assert_eq!(full.nick, "alice");
    /// assert_eq!(full.user_host(), "al@example.org");
    ///
    /// let short = Hostmask::parse("al@example.org");
    /// assert_eq!(short.nick, "");
    /// assert_eq!(short.host, "example.org");
    /// ```
    pub fn parse(s: &str) -> Self {
        #[derive(Copy, Clone, Eq, PartialEq)]
        enum Part {
            Name,
            User,
            Host,
        }

        let has_bang = s.contains('!');
        let mut mask = Hostmask::default();
        let mut part = if has_bang { Part::Name } else { Part::User };

        for c in s.chars() {
            match c {
                '!' if part == Part::Name => part = Part::User,
                '@' if part != Part::Host => part = Part::Host,
                _ => match part {
                    Part::Name => mask.nick.push(c),
                    Part::User => mask.user.push(c),
                    Part::Host => mask.host.push(c),
                },
            }
        }

        // A bare word with neither separator is a hostname, not an ident.
        if !has_bang && !s.contains('@') {
            mask.host = std::mem::take(&mut mask.user);
        }

        mask
    }

    /// The `user@host` portion, as recorded in event logs.
    pub fn user_host(&self) -> String {
        match (self.user.is_empty(), self.host.is_empty()) {
            (true, true) => String::new(),
            (true, false) => self.host.clone(),
            _ => format!("{}@{}", self.user, self.host),
        }
    }
}

impl fmt::Display for Hostmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.nick.is_empty() {
            f.write_str(&self.nick)?;
            if !self.user.is_empty() {
                write!(f, "!{}", self.user)?;
            }
            if !self.host.is_empty() {
                write!(f, "@{}", self.host)?;
            }
            Ok(())
        } else {
            f.write_str(&self.user_host())
        }
    }
}
