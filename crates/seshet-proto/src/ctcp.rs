//! CTCP (Client-to-Client Protocol) payload handling.
//!
//! CTCP requests travel inside PRIVMSG bodies wrapped in `\x01`. The only
//! one this crate cares about is `ACTION` (`/me`), which is logged as its
//! own event kind.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// A parsed CTCP message borrowed from a PRIVMSG body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The CTCP command, uppercased by the sender by convention.
    pub command: &'a str,
    /// Optional parameters following the command.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Parse a CTCP message from a PRIVMSG/NOTICE body.
    ///
    /// Returns `None` if the message is not a CTCP message. A missing
    /// trailing delimiter is tolerated.
    ///
    /// ```
    /// use seshet_proto::Ctcp;
    ///
    /// let ctcp = Ctcp::parse("\x01ACTION waves\x01").unwrap();
    /// assert!(ctcp.is_action());
    /// assert_eq!(ctcp.params, Some("waves"));
    /// ```
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.strip_prefix(CTCP_DELIM)?;
        let text = text.strip_suffix(CTCP_DELIM).unwrap_or(text);

        if text.is_empty() {
            return None;
        }

        let (command, params) = match text.find(' ') {
            Some(pos) => {
                let params = &text[pos + 1..];
                (&text[..pos], (!params.is_empty()).then_some(params))
            }
            None => (text, None),
        };

        Some(Self { command, params })
    }

    /// Check if a message body contains a CTCP message.
    #[inline]
    pub fn is_ctcp(text: &str) -> bool {
        text.starts_with(CTCP_DELIM)
    }

    /// Whether this is a CTCP `ACTION`.
    pub fn is_action(&self) -> bool {
        self.command.eq_ignore_ascii_case("ACTION")
    }

    /// Create an ACTION CTCP message.
    pub fn action(text: &'a str) -> Self {
        Self {
            command: "ACTION",
            params: Some(text),
        }
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CTCP_DELIM, self.command)?;
        if let Some(params) = self.params {
            write!(f, " {}", params)?;
        }
        write!(f, "{}", CTCP_DELIM)
    }
}

/// If `body` is a CTCP ACTION, return the action text.
pub fn action_text(body: &str) -> Option<&str> {
    let ctcp = Ctcp::parse(body)?;
    if ctcp.is_action() {
        Some(ctcp.params.unwrap_or(""))
    } else {
        None
    }
}
