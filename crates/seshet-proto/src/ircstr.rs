//! Case-insensitive IRC identifiers.
//!
//! Nicknames and channel names compare equal under the RFC 1459 case
//! mapping, but must be displayed with the casing the server sent. [`IrcStr`]
//! keeps both: the original text for display and the folded form for
//! equality, hashing and ordering.
//!
//! # Example
//!
//! ```
//! use seshet_proto::IrcStr;
//!
//! let a = IrcStr::new("Nick[1]");
//! let b = IrcStr::new("nick{1}");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "Nick[1]");
//! assert!(IrcStr::new("A") == "a");
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::casemap::{irc_eq, irc_to_lower, irc_to_upper};

/// Channel name prefixes recognised by [`IrcStr::is_channel`].
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// An immutable IRC identifier compared under RFC 1459 case mapping.
#[derive(Clone)]
pub struct IrcStr {
    original: String,
    folded: String,
}

impl IrcStr {
    /// Create an identifier, retaining the given casing for display.
    pub fn new(s: impl Into<String>) -> Self {
        let original = s.into();
        let folded = irc_to_lower(&original);
        Self { original, folded }
    }

    /// The identifier as it was received.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// The case-folded (IRC lowercase) form used for comparison.
    #[inline]
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// A new identifier with every character in IRC lowercase.
    pub fn to_irc_lowercase(&self) -> Self {
        Self {
            original: self.folded.clone(),
            folded: self.folded.clone(),
        }
    }

    /// A new identifier with every character in IRC uppercase.
    ///
    /// `{`, `}`, `|` and `^` become `[`, `]`, `\` and `~`.
    pub fn to_irc_uppercase(&self) -> Self {
        Self {
            original: irc_to_upper(&self.original),
            folded: self.folded.clone(),
        }
    }

    /// Whether this names a channel rather than a user.
    pub fn is_channel(&self) -> bool {
        self.original.starts_with(CHANNEL_PREFIXES)
    }

    /// Whether the identifier has no characters.
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Consume the identifier, returning the original text.
    pub fn into_string(self) -> String {
        self.original
    }
}

impl PartialEq for IrcStr {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for IrcStr {}

impl Hash for IrcStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl PartialOrd for IrcStr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IrcStr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl PartialEq<str> for IrcStr {
    fn eq(&self, other: &str) -> bool {
        irc_eq(&self.original, other)
    }
}

impl PartialEq<&str> for IrcStr {
    fn eq(&self, other: &&str) -> bool {
        irc_eq(&self.original, other)
    }
}

impl PartialEq<String> for IrcStr {
    fn eq(&self, other: &String) -> bool {
        irc_eq(&self.original, other)
    }
}

impl PartialEq<IrcStr> for str {
    fn eq(&self, other: &IrcStr) -> bool {
        other == self
    }
}

impl PartialEq<IrcStr> for &str {
    fn eq(&self, other: &IrcStr) -> bool {
        other == *self
    }
}

impl fmt::Display for IrcStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl fmt::Debug for IrcStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IrcStr({:?})", self.original)
    }
}

impl AsRef<str> for IrcStr {
    fn as_ref(&self) -> &str {
        &self.original
    }
}

impl From<&str> for IrcStr {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IrcStr {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for IrcStr {
    fn from(s: &String) -> Self {
        Self::new(s.as_str())
    }
}

impl<'a> From<Cow<'a, str>> for IrcStr {
    fn from(s: Cow<'a, str>) -> Self {
        Self::new(s.into_owned())
    }
}

impl From<IrcStr> for String {
    fn from(s: IrcStr) -> Self {
        s.original
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for IrcStr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for IrcStr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
