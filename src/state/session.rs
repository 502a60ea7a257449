//! The per-bot membership graph.

use super::{Channel, MEMBER_PREFIXES, User};
use crate::config::Config;
use seshet_proto::{Event, EventKind, IrcStr};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

/// A broken membership edge found by [`Session::check_consistency`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("{nick} is a member of {channel} but is not registered")]
    UnregisteredMember { nick: IrcStr, channel: IrcStr },
    #[error("{nick} lists {channel} but is not in its member set")]
    MissingMember { nick: IrcStr, channel: IrcStr },
    #[error("{nick} lists untracked channel {channel}")]
    UntrackedChannel { nick: IrcStr, channel: IrcStr },
    #[error("{0} is registered without any channel")]
    Orphan(IrcStr),
    #[error("own nickname {nick} is tracked in {channel}")]
    SelfTracked { nick: IrcStr, channel: IrcStr },
}

/// Users, channels and the edges between them, as seen by one client.
///
/// Invariant: `user.channels` contains `c` iff `channels[c].members`
/// contains `user.nick`, and every registered user occupies at least one
/// channel.
#[derive(Debug, Clone)]
pub struct Session {
    nickname: IrcStr,
    users: HashMap<IrcStr, User>,
    channels: HashMap<IrcStr, Channel>,
    history_len: usize,
}

impl Session {
    pub fn new(nickname: impl Into<IrcStr>, history_len: usize) -> Self {
        Self {
            nickname: nickname.into(),
            users: HashMap::new(),
            channels: HashMap::new(),
            history_len,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.client.nickname.as_str(), config.state.history_len)
    }

    // -------------------------------------------------------------------------
    // Event dispatch
    // -------------------------------------------------------------------------

    /// Update the graph for one event.
    pub fn apply(&mut self, event: &Event) {
        match event.kind {
            EventKind::Message | EventKind::Action | EventKind::Notice => self.on_message(event),
            EventKind::Join => self.on_join(
                &event.source,
                &event.target,
                event.account(),
                event.host(),
            ),
            EventKind::Part => {
                self.on_part(&event.source, &event.target);
            }
            EventKind::Quit => {
                self.on_quit(&event.source);
            }
            EventKind::Kick => match event.kicked() {
                Some(kicked) => {
                    self.on_kick(&kicked, &event.target);
                }
                None => warn!(channel = %event.target, "KICK without a kicked nick ignored"),
            },
            EventKind::Nick => match event.new_nick() {
                Some(new) => {
                    self.on_nick_change(&event.source, &new);
                }
                None => warn!(nick = %event.source, "NICK without a new nick ignored"),
            },
            EventKind::Names => self.on_names_reply(&event.target, &event.params),
            EventKind::Mode => {}
        }
    }

    // -------------------------------------------------------------------------
    // Membership operations
    // -------------------------------------------------------------------------

    pub fn on_join(&mut self, nick: &IrcStr, channel: &IrcStr, account: Option<&str>, host: &str) {
        if self.is_self(nick) {
            let history_len = self.history_len;
            self.channels
                .entry(channel.clone())
                .or_insert_with(|| Channel::new(channel.clone(), history_len));
            debug!(channel = %channel, "Joined channel");
            return;
        }

        let Some(chan) = self.channels.get_mut(channel) else {
            debug!(nick = %nick, channel = %channel, "Join to untracked channel ignored");
            return;
        };
        chan.members.insert(nick.clone());

        let user = self
            .users
            .entry(nick.clone())
            .or_insert_with(|| User::new(nick.clone()));
        if let Some(account) = account {
            user.account = Some(account.to_string());
        }
        if !host.is_empty() {
            user.host = host.to_string();
        }
        user.channels.insert(channel.clone());
        debug!(nick = %nick, channel = %channel, "User joined");
    }

    /// Returns the users that stopped being observable.
    pub fn on_part(&mut self, nick: &IrcStr, channel: &IrcStr) -> Vec<IrcStr> {
        if self.is_self(nick) {
            return self.leave_channel(channel);
        }

        if self.remove_membership(nick, channel) {
            vec![nick.clone()]
        } else {
            Vec::new()
        }
    }

    /// Remove `nick` everywhere. Returns the channels it was in.
    ///
    /// The bot's own quit forgets every channel and user.
    pub fn on_quit(&mut self, nick: &IrcStr) -> Vec<IrcStr> {
        if self.is_self(nick) {
            let channels = self.channel_names();
            self.reset();
            return channels;
        }

        let mut left = Vec::new();
        for chan in self.channels.values_mut() {
            if chan.members.remove(nick) {
                left.push(chan.name.clone());
            }
        }
        self.users.remove(nick);
        left.sort();
        debug!(nick = %nick, channels = left.len(), "User quit");
        left
    }

    /// Rename `old` to `new` in the registry and in every channel it occupies.
    pub fn on_nick_change(&mut self, old: &IrcStr, new: &IrcStr) {
        if self.is_self(old) {
            debug!(old = %old, new = %new, "Own nickname changed");
            self.nickname = new.clone();
            return;
        }

        let Some(mut user) = self.users.remove(old) else {
            debug!(old = %old, new = %new, "Nick change of untracked user ignored");
            return;
        };
        if let Some(stale) = self.users.remove(new) {
            warn!(nick = %new, "Nick change onto a tracked user; merging");
            user.channels.extend(stale.channels);
        }

        for name in &user.channels {
            if let Some(chan) = self.channels.get_mut(name) {
                chan.members.remove(old);
                chan.members.insert(new.clone());
            }
        }
        user.nick = new.clone();
        self.users.insert(new.clone(), user);
        debug!(old = %old, new = %new, "User changed nickname");
    }

    /// A kick is a forced part.
    pub fn on_kick(&mut self, kicked: &IrcStr, channel: &IrcStr) -> Vec<IrcStr> {
        self.on_part(kicked, channel)
    }

    /// Replace the member list of `channel` with `names`.
    ///
    /// Membership prefixes are stripped and the bot's own nick is skipped.
    /// Only the bot's own join creates a channel; a reply for a channel it
    /// is not in (for example an explicit `NAMES` query) is ignored.
    pub fn on_names_reply<S: AsRef<str>>(&mut self, channel: &IrcStr, names: &[S]) {
        let Some(chan) = self.channels.get(channel) else {
            debug!(channel = %channel, "Names reply for untracked channel ignored");
            return;
        };

        let members: BTreeSet<IrcStr> = names
            .iter()
            .map(|n| IrcStr::new(n.as_ref().trim_start_matches(MEMBER_PREFIXES)))
            .filter(|n| !n.is_empty() && !self.is_self(n))
            .collect();

        let previous: Vec<IrcStr> = chan
            .members
            .iter()
            .filter(|m| !members.contains(*m))
            .cloned()
            .collect();
        for nick in &previous {
            self.remove_membership(nick, channel);
        }

        for nick in &members {
            if let Some(chan) = self.channels.get_mut(channel) {
                chan.members.insert(nick.clone());
            }
            self.users
                .entry(nick.clone())
                .or_insert_with(|| User::new(nick.clone()))
                .channels
                .insert(channel.clone());
        }
        debug!(channel = %channel, members = members.len(), "Names reply applied");
    }

    /// Remember a conversation event in its channel's recent buffer.
    pub fn on_message(&mut self, event: &Event) {
        if let Some(chan) = self.channels.get_mut(&event.target) {
            chan.remember(event.clone());
        }
    }

    /// Members of `channel` that occupy no other tracked channel.
    pub fn unique_users(&self, channel: impl Into<IrcStr>) -> BTreeSet<IrcStr> {
        let channel = channel.into();
        let Some(chan) = self.channels.get(&channel) else {
            return BTreeSet::new();
        };
        let elsewhere: BTreeSet<&IrcStr> = self
            .channels
            .values()
            .filter(|c| c.name != channel)
            .flat_map(|c| c.members.iter())
            .collect();
        chan.members
            .iter()
            .filter(|m| !elsewhere.contains(m))
            .cloned()
            .collect()
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.users.clear();
        self.channels.clear();
    }

    fn leave_channel(&mut self, channel: &IrcStr) -> Vec<IrcStr> {
        let unique = self.unique_users(channel.clone());
        let Some(chan) = self.channels.remove(channel) else {
            debug!(channel = %channel, "Left untracked channel");
            return Vec::new();
        };

        for nick in &unique {
            self.users.remove(nick);
        }
        for nick in &chan.members {
            if let Some(user) = self.users.get_mut(nick) {
                user.channels.remove(channel);
            }
        }
        debug!(channel = %channel, forgotten = unique.len(), "Left channel");
        unique.into_iter().collect()
    }

    /// Drop one edge. Returns true if the user was removed from the registry.
    fn remove_membership(&mut self, nick: &IrcStr, channel: &IrcStr) -> bool {
        if let Some(chan) = self.channels.get_mut(channel) {
            chan.members.remove(nick);
        }
        let Some(user) = self.users.get_mut(nick) else {
            return false;
        };
        user.channels.remove(channel);
        if user.channels.is_empty() {
            self.users.remove(nick);
            debug!(nick = %nick, "User no longer visible");
            return true;
        }
        false
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The bot's current nickname.
    pub fn nickname(&self) -> &IrcStr {
        &self.nickname
    }

    pub fn is_self(&self, nick: &IrcStr) -> bool {
        self.nickname == *nick
    }

    pub fn user(&self, nick: impl Into<IrcStr>) -> Option<&User> {
        self.users.get(&nick.into())
    }

    pub fn channel(&self, name: impl Into<IrcStr>) -> Option<&Channel> {
        self.channels.get(&name.into())
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Tracked channel names, sorted.
    pub fn channel_names(&self) -> Vec<IrcStr> {
        let mut names: Vec<IrcStr> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    /// Channels `nick` occupies, sorted. For the bot itself that is every
    /// tracked channel.
    pub fn channels_of(&self, nick: impl Into<IrcStr>) -> Vec<IrcStr> {
        let nick = nick.into();
        if self.is_self(&nick) {
            return self.channel_names();
        }
        let mut channels: Vec<IrcStr> = self
            .users
            .get(&nick)
            .map(|u| u.channels.iter().cloned().collect())
            .unwrap_or_default();
        channels.sort();
        channels
    }

    pub fn is_member(&self, nick: impl Into<IrcStr>, channel: impl Into<IrcStr>) -> bool {
        let nick = nick.into();
        let channel = channel.into();
        match self.channels.get(&channel) {
            Some(_) if self.is_self(&nick) => true,
            Some(chan) => chan.has_member(&nick),
            None => false,
        }
    }

    /// Verify both directions of every membership edge.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        for chan in self.channels.values() {
            for nick in &chan.members {
                if self.is_self(nick) {
                    return Err(ConsistencyError::SelfTracked {
                        nick: nick.clone(),
                        channel: chan.name.clone(),
                    });
                }
                match self.users.get(nick) {
                    Some(user) if user.is_in(&chan.name) => {}
                    Some(user) => {
                        return Err(ConsistencyError::MissingMember {
                            nick: user.nick.clone(),
                            channel: chan.name.clone(),
                        });
                    }
                    None => {
                        return Err(ConsistencyError::UnregisteredMember {
                            nick: nick.clone(),
                            channel: chan.name.clone(),
                        });
                    }
                }
            }
        }

        for user in self.users.values() {
            if user.channels.is_empty() {
                return Err(ConsistencyError::Orphan(user.nick.clone()));
            }
            for name in &user.channels {
                match self.channels.get(name) {
                    Some(chan) if chan.has_member(&user.nick) => {}
                    Some(_) => {
                        return Err(ConsistencyError::MissingMember {
                            nick: user.nick.clone(),
                            channel: name.clone(),
                        });
                    }
                    None => {
                        return Err(ConsistencyError::UntrackedChannel {
                            nick: user.nick.clone(),
                            channel: name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn is_consistent(&self) -> bool {
        self.check_consistency().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("Seshet", 10)
    }

    fn joined(channels: &[&str]) -> Session {
        let mut s = session();
        for c in channels {
            s.apply(&Event::join("Seshet", *c));
        }
        s
    }

    fn names(set: BTreeSet<IrcStr>) -> Vec<String> {
        set.into_iter().map(IrcStr::into_string).collect()
    }

    #[test]
    fn test_self_join_creates_empty_channel() {
        let s = joined(&["#a"]);
        let chan = s.channel("#A").unwrap();
        assert!(chan.members.is_empty());
        assert_eq!(s.users().count(), 0);
        assert!(s.is_member("seshet", "#a"));
    }

    #[test]
    fn test_join_records_account_and_host() {
        let mut s = joined(&["#a"]);
        s.apply(
            &Event::join("bob", "#a")
                .with_params(["bobacct"])
                .with_hostmask("bob!b@host.example"),
        );
        let bob = s.user("BOB").unwrap();
        assert_eq!(bob.account.as_deref(), Some("bobacct"));
        assert_eq!(bob.host, "host.example");
        assert!(s.is_consistent());
    }

    #[test]
    fn test_join_to_untracked_channel_is_ignored() {
        let mut s = joined(&["#a"]);
        s.apply(&Event::join("bob", "#elsewhere"));
        assert!(s.user("bob").is_none());
        assert!(s.channel("#elsewhere").is_none());
    }

    #[test]
    fn test_part_last_channel_unregisters() {
        let mut s = joined(&["#a", "#b"]);
        s.apply(&Event::join("bob", "#a"));
        s.apply(&Event::join("bob", "#b"));
        s.apply(&Event::part("bob", "#a", ""));
        assert_eq!(s.channels_of("bob"), vec![IrcStr::new("#b")]);
        assert!(s.is_consistent());

        s.apply(&Event::part("bob", "#b", ""));
        assert!(s.user("bob").is_none());
        assert!(s.is_consistent());
    }

    #[test]
    fn test_self_part_forgets_unique_users_only() {
        let mut s = joined(&["#a", "#b"]);
        s.apply(&Event::names("irc.example", "#a", ["@alice", "+bob", "Seshet"]));
        s.apply(&Event::names("irc.example", "#b", ["bob"]));

        let forgotten = s.on_part(&IrcStr::new("SESHET"), &IrcStr::new("#a"));
        assert_eq!(forgotten, vec![IrcStr::new("alice")]);
        assert!(s.channel("#a").is_none());
        assert!(s.user("alice").is_none());
        assert_eq!(s.channels_of("bob"), vec![IrcStr::new("#b")]);
        assert!(s.is_consistent());
    }

    #[test]
    fn test_kick_of_self_leaves_channel() {
        let mut s = joined(&["#a"]);
        s.apply(&Event::join("bob", "#a"));
        s.apply(&Event::kick("op", "#a", "seshet", "bye"));
        assert!(s.channel("#a").is_none());
        assert!(s.user("bob").is_none());
    }

    #[test]
    fn test_kick_removes_member() {
        let mut s = joined(&["#a"]);
        s.apply(&Event::join("bob", "#a"));
        s.apply(&Event::kick("op", "#a", "Bob", "spam"));
        assert!(!s.is_member("bob", "#a"));
        assert!(s.user("bob").is_none());
        assert!(s.is_consistent());
    }

    #[test]
    fn test_quit_removes_from_every_channel() {
        let mut s = joined(&["#a", "#b", "#c"]);
        s.apply(&Event::join("bob", "#a"));
        s.apply(&Event::join("bob", "#c"));
        s.apply(&Event::join("carol", "#b"));

        let left = s.on_quit(&IrcStr::new("bob"));
        assert_eq!(left, vec![IrcStr::new("#a"), IrcStr::new("#c")]);
        assert!(s.user("bob").is_none());
        assert!(s.channels().all(|c| !c.has_member(&IrcStr::new("bob"))));
        assert!(s.user("carol").is_some());
        assert!(s.is_consistent());
    }

    #[test]
    fn test_own_quit_resets() {
        let mut s = joined(&["#a"]);
        s.apply(&Event::join("bob", "#a"));
        s.apply(&Event::quit("Seshet", "bye"));
        assert_eq!(s.channels().count(), 0);
        assert_eq!(s.users().count(), 0);
    }

    #[test]
    fn test_nick_change_rekeys_every_channel() {
        let mut s = joined(&["#a", "#b"]);
        s.apply(&Event::join("bob", "#a"));
        s.apply(&Event::join("bob", "#b"));
        s.apply(&Event::join("carol", "#a"));

        s.apply(&Event::nick("bob", "Robert"));
        assert!(s.user("bob").is_none());
        assert_eq!(s.user("robert").unwrap().nick.as_str(), "Robert");
        assert!(s.is_member("robert", "#a"));
        assert!(s.is_member("robert", "#b"));
        assert!(!s.is_member("bob", "#a"));
        assert_eq!(s.channel("#a").unwrap().members.len(), 2);
        assert_eq!(s.channel("#b").unwrap().members.len(), 1);
        assert!(s.is_consistent());
    }

    #[test]
    fn test_case_only_nick_change_keeps_new_casing() {
        let mut s = joined(&["#a"]);
        s.apply(&Event::join("bob", "#a"));
        s.apply(&Event::nick("bob", "BOB"));
        assert_eq!(s.user("bob").unwrap().nick.as_str(), "BOB");
        assert!(s.is_consistent());
    }

    #[test]
    fn test_own_nick_change() {
        let mut s = joined(&["#a"]);
        s.apply(&Event::nick("Seshet", "Seshet_"));
        assert_eq!(s.nickname().as_str(), "Seshet_");
        assert!(s.user("Seshet_").is_none());
        s.apply(&Event::names("irc.example", "#a", ["Seshet_", "bob"]));
        assert_eq!(s.channel("#a").unwrap().members.len(), 1);
    }

    #[test]
    fn test_names_reply_replaces_members() {
        let mut s = joined(&["#a", "#b"]);
        s.apply(&Event::names("irc.example", "#a", ["alice", "bob"]));
        s.apply(&Event::names("irc.example", "#b", ["bob"]));
        s.apply(&Event::names("irc.example", "#a", ["~carol", "bob"]));

        assert!(s.user("alice").is_none());
        assert!(s.is_member("carol", "#a"));
        assert_eq!(s.channels_of("bob").len(), 2);
        assert!(s.is_consistent());
    }

    #[test]
    fn test_names_reply_for_unjoined_channel_is_ignored() {
        let mut s = joined(&["#a"]);
        s.apply(&Event::names("irc.example", "#elsewhere", ["alice", "@bob"]));

        assert!(s.channel("#elsewhere").is_none());
        assert!(!s.is_member("Seshet", "#elsewhere"));
        assert!(s.user("alice").is_none());
        assert!(s.users().next().is_none());
        assert!(s.is_consistent());
    }

    #[test]
    fn test_unique_users() {
        let mut s = joined(&["#a", "#b"]);
        s.apply(&Event::names("irc.example", "#a", ["alice", "bob", "dave"]));
        s.apply(&Event::names("irc.example", "#b", ["bob", "carol"]));

        assert_eq!(names(s.unique_users("#a")), vec!["alice", "dave"]);
        assert_eq!(names(s.unique_users("#B")), vec!["carol"]);
        assert!(s.unique_users("#none").is_empty());
    }

    #[test]
    fn test_messages_fill_recent_buffer() {
        let mut s = Session::new("Seshet", 2);
        s.apply(&Event::join("Seshet", "#a"));
        s.apply(&Event::privmsg("bob", "#a", "one"));
        s.apply(&Event::privmsg("bob", "#A", "\x01ACTION two\x01"));
        s.apply(&Event::notice("bob", "#a", "three"));
        s.apply(&Event::privmsg("bob", "Seshet", "private"));

        let kinds: Vec<EventKind> = s.channel("#a").unwrap().recent().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Action, EventKind::Notice]);
    }

    #[test]
    fn test_mode_is_ignored() {
        let mut s = joined(&["#a"]);
        s.apply(&Event::join("bob", "#a"));
        s.apply(&Event::mode("op", "#a", "+o").with_params(["bob"]));
        assert!(s.is_member("bob", "#a"));
    }

    #[test]
    fn test_consistency_check_reports_orphan() {
        let mut s = joined(&["#a"]);
        s.users.insert(IrcStr::new("ghost"), User::new(IrcStr::new("ghost")));
        assert_eq!(
            s.check_consistency(),
            Err(ConsistencyError::Orphan(IrcStr::new("ghost")))
        );
    }
}
