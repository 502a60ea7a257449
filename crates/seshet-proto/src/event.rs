//! Decoded protocol events.
//!
//! The wire layer (framing, parsing, connection lifecycle) lives outside
//! this crate. It hands over one [`Event`] per protocol occurrence, already
//! split into the fields the event logger and state tracker consume.
//!
//! Field placement per kind:
//!
//! | kind      | target          | message          | params                 |
//! |-----------|-----------------|------------------|------------------------|
//! | `message` | channel or nick | text             |                        |
//! | `action`  | channel or nick | action text      |                        |
//! | `notice`  | channel or nick | text             |                        |
//! | `join`    | channel         |                  | `[account]` (optional) |
//! | `part`    | channel         | reason           |                        |
//! | `quit`    | (empty)         | reason           |                        |
//! | `kick`    | channel         | reason           | `[kicked nick]`        |
//! | `nick`    | new nick        |                  | `[new nick]`           |
//! | `mode`    | channel or nick | mode string      | mode arguments         |
//! | `names`   | channel         |                  | member names           |

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::ctcp;
use crate::hostmask::Hostmask;
use crate::ircstr::IrcStr;

/// Error returned when an event kind name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

/// The kind of a protocol event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EventKind {
    /// PRIVMSG.
    Message,
    /// PRIVMSG carrying a CTCP ACTION.
    Action,
    /// NOTICE.
    Notice,
    /// JOIN.
    Join,
    /// PART.
    Part,
    /// QUIT.
    Quit,
    /// KICK.
    Kick,
    /// NICK.
    Nick,
    /// MODE.
    Mode,
    /// RPL_NAMREPLY (353).
    Names,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 10] = [
        Self::Message,
        Self::Action,
        Self::Notice,
        Self::Join,
        Self::Part,
        Self::Quit,
        Self::Kick,
        Self::Nick,
        Self::Mode,
        Self::Names,
    ];

    /// The lowercase name used as a configuration key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Action => "action",
            Self::Notice => "notice",
            Self::Join => "join",
            Self::Part => "part",
            Self::Quit => "quit",
            Self::Kick => "kick",
            Self::Nick => "nick",
            Self::Mode => "mode",
            Self::Names => "names",
        }
    }

    /// Whether events of this kind carry conversation text.
    pub const fn is_chat(self) -> bool {
        matches!(self, Self::Message | Self::Action | Self::Notice)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownEventKind(s.to_owned()))
    }
}

/// One decoded protocol event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// When it was received, in UTC.
    pub time: DateTime<Utc>,
    /// Who caused it (nickname, or server name for numerics).
    pub source: IrcStr,
    /// Channel or user the event is addressed to.
    pub target: IrcStr,
    /// Free text: message body, part/quit/kick reason, or mode string.
    pub message: String,
    /// `user@host` of the source.
    pub hostmask: String,
    /// Kind-specific parameters.
    pub params: Vec<String>,
}

impl Event {
    /// Create an event of `kind` stamped with the current time.
    pub fn new(kind: EventKind, source: impl Into<IrcStr>, target: impl Into<IrcStr>) -> Self {
        Self {
            kind,
            time: Utc::now(),
            source: source.into(),
            target: target.into(),
            message: String::new(),
            hostmask: String::new(),
            params: Vec::new(),
        }
    }

    /// Set the free-text field.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the source hostmask. Both `nick!user@host` and `user@host` are
    /// accepted; only `user@host` is kept.
    pub fn with_hostmask(mut self, mask: &str) -> Self {
        self.hostmask = Hostmask::parse(mask).user_host();
        self
    }

    /// Replace the parameter list.
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Override the timestamp.
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// A PRIVMSG. CTCP ACTION bodies become [`EventKind::Action`] with the
    /// action text as the message.
    pub fn privmsg(source: impl Into<IrcStr>, target: impl Into<IrcStr>, body: &str) -> Self {
        match ctcp::action_text(body) {
            Some(text) => Self::new(EventKind::Action, source, target).with_message(text),
            None => Self::new(EventKind::Message, source, target).with_message(body),
        }
    }

    /// A NOTICE.
    pub fn notice(source: impl Into<IrcStr>, target: impl Into<IrcStr>, body: &str) -> Self {
        Self::new(EventKind::Notice, source, target).with_message(body)
    }

    /// A JOIN.
    pub fn join(source: impl Into<IrcStr>, channel: impl Into<IrcStr>) -> Self {
        Self::new(EventKind::Join, source, channel)
    }

    /// A PART with an optional reason.
    pub fn part(source: impl Into<IrcStr>, channel: impl Into<IrcStr>, reason: &str) -> Self {
        Self::new(EventKind::Part, source, channel).with_message(reason)
    }

    /// A QUIT. Quits have no target.
    pub fn quit(source: impl Into<IrcStr>, reason: &str) -> Self {
        Self::new(EventKind::Quit, source, "").with_message(reason)
    }

    /// A KICK of `kicked` from `channel` by `source`.
    pub fn kick(
        source: impl Into<IrcStr>,
        channel: impl Into<IrcStr>,
        kicked: &str,
        reason: &str,
    ) -> Self {
        Self::new(EventKind::Kick, source, channel)
            .with_message(reason)
            .with_params([kicked])
    }

    /// A NICK change from `old` to `new`.
    pub fn nick(old: impl Into<IrcStr>, new: &str) -> Self {
        Self::new(EventKind::Nick, old, new).with_params([new])
    }

    /// A MODE change.
    pub fn mode(source: impl Into<IrcStr>, target: impl Into<IrcStr>, modes: &str) -> Self {
        Self::new(EventKind::Mode, source, target).with_message(modes)
    }

    /// A names reply listing the members of `channel`.
    pub fn names<I, S>(source: impl Into<IrcStr>, channel: impl Into<IrcStr>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(EventKind::Names, source, channel).with_params(names)
    }

    /// The kicked nickname of a KICK event.
    pub fn kicked(&self) -> Option<IrcStr> {
        match self.kind {
            EventKind::Kick => self.params.first().map(IrcStr::from),
            _ => None,
        }
    }

    /// The new nickname of a NICK event.
    pub fn new_nick(&self) -> Option<IrcStr> {
        match self.kind {
            EventKind::Nick => self
                .params
                .first()
                .map(IrcStr::from)
                .or_else(|| (!self.target.is_empty()).then(|| self.target.clone())),
            _ => None,
        }
    }

    /// The account name of an extended JOIN, if the server sent one.
    pub fn account(&self) -> Option<&str> {
        match self.kind {
            EventKind::Join => self
                .params
                .first()
                .map(String::as_str)
                .filter(|a| !a.is_empty() && *a != "*"),
            _ => None,
        }
    }

    /// The host part of the source hostmask.
    pub fn host(&self) -> &str {
        self.hostmask
            .rsplit_once('@')
            .map_or(self.hostmask.as_str(), |(_, host)| host)
    }
}
