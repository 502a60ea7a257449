//! Tracked users.

use seshet_proto::IrcStr;
use std::collections::HashSet;

/// A user seen in at least one tracked channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub nick: IrcStr,
    /// Services account, when the server reports one on join.
    pub account: Option<String>,
    pub host: String,
    /// Channels this user occupies; always non-empty while registered.
    pub channels: HashSet<IrcStr>,
}

impl User {
    pub fn new(nick: IrcStr) -> Self {
        Self {
            nick,
            account: None,
            host: String::new(),
            channels: HashSet::new(),
        }
    }

    pub fn is_in(&self, channel: &IrcStr) -> bool {
        self.channels.contains(channel)
    }
}
