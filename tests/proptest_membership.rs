//! Property-based tests for session membership tracking.
//!
//! Generates random but protocol-valid sequences of joins, parts, kicks,
//! quits, nick changes and names replies, and checks after every event
//! that:
//! 1. The user and channel indexes agree in both directions
//! 2. `unique_users` is exactly the set of users seen in that channel only

use proptest::prelude::*;
use seshet::state::Session;
use seshet::{Event, IrcStr};
use std::collections::BTreeSet;

const OWN_NICK: &str = "Seshet";
const NICKS: [&str; 6] = ["alice", "Bob", "carol", "dave", "Eve", "frank"];
const CHANNELS: [&str; 3] = ["#rust", "#Irc", "#ops"];

#[derive(Debug, Clone)]
enum Op {
    Join { nick: usize, channel: usize },
    Part { nick: usize, channel: usize, shout: bool },
    Kick { nick: usize, channel: usize },
    Quit { nick: usize, shout: bool },
    Nick { old: usize, new: usize },
    Names { channel: usize, mask: u8 },
    SelfPart { channel: usize },
    SelfJoin { channel: usize },
}

// =============================================================================
// STRATEGIES - Generators for membership events
// =============================================================================

fn nick_strategy() -> impl Strategy<Value = usize> {
    0..NICKS.len()
}

fn channel_strategy() -> impl Strategy<Value = usize> {
    0..CHANNELS.len()
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (nick_strategy(), channel_strategy())
            .prop_map(|(nick, channel)| Op::Join { nick, channel }),
        2 => (nick_strategy(), channel_strategy(), any::<bool>())
            .prop_map(|(nick, channel, shout)| Op::Part { nick, channel, shout }),
        1 => (nick_strategy(), channel_strategy())
            .prop_map(|(nick, channel)| Op::Kick { nick, channel }),
        1 => (nick_strategy(), any::<bool>()).prop_map(|(nick, shout)| Op::Quit { nick, shout }),
        2 => (nick_strategy(), nick_strategy()).prop_map(|(old, new)| Op::Nick { old, new }),
        1 => (channel_strategy(), any::<u8>())
            .prop_map(|(channel, mask)| Op::Names { channel, mask }),
        1 => channel_strategy().prop_map(|channel| Op::SelfPart { channel }),
        1 => channel_strategy().prop_map(|channel| Op::SelfJoin { channel }),
    ]
}

// =============================================================================
// HELPERS
// =============================================================================

fn cased(nick: &str, shout: bool) -> String {
    if shout {
        nick.to_uppercase()
    } else {
        nick.to_string()
    }
}

/// The event a server could send for `op` in the current state, or `None`
/// when `op` makes no sense right now.
fn event_for(session: &Session, op: &Op) -> Option<Event> {
    match *op {
        Op::Join { nick, channel } => {
            let (nick, channel) = (NICKS[nick], CHANNELS[channel]);
            (session.channel(channel).is_some() && !session.is_member(nick, channel))
                .then(|| Event::join(nick, channel))
        }
        Op::Part { nick, channel, shout } => {
            let (nick, channel) = (NICKS[nick], CHANNELS[channel]);
            session
                .is_member(nick, channel)
                .then(|| Event::part(cased(nick, shout), channel, "bye"))
        }
        Op::Kick { nick, channel } => {
            let (nick, channel) = (NICKS[nick], CHANNELS[channel]);
            session
                .is_member(nick, channel)
                .then(|| Event::kick("ChanServ", channel, nick, "out"))
        }
        Op::Quit { nick, shout } => {
            let nick = NICKS[nick];
            session
                .user(nick)
                .is_some()
                .then(|| Event::quit(cased(nick, shout), "gone"))
        }
        Op::Nick { old, new } => {
            let (old, new) = (NICKS[old], NICKS[new]);
            let lands_free = session.user(new).is_none() && !session.is_self(&IrcStr::new(new));
            (session.user(old).is_some() && lands_free).then(|| Event::nick(old, new))
        }
        Op::Names { channel, mask } => {
            let channel = CHANNELS[channel];
            session.channel(channel)?;
            let mut names: Vec<String> = NICKS
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(i, nick)| if i % 2 == 0 { format!("@{nick}") } else { nick.to_string() })
                .collect();
            names.push(OWN_NICK.to_string());
            Some(Event::names("irc.example.org", channel, names))
        }
        Op::SelfPart { channel } => {
            let channel = CHANNELS[channel];
            session
                .channel(channel)
                .is_some()
                .then(|| Event::part(OWN_NICK, channel, "bye"))
        }
        Op::SelfJoin { channel } => {
            let channel = CHANNELS[channel];
            session
                .channel(channel)
                .is_none()
                .then(|| Event::join(OWN_NICK, channel))
        }
    }
}

/// Users whose only tracked channel is `channel`.
fn only_in(session: &Session, channel: &IrcStr) -> BTreeSet<IrcStr> {
    session
        .users()
        .filter(|u| session.channels_of(u.nick.clone()) == vec![channel.clone()])
        .map(|u| u.nick.clone())
        .collect()
}

fn joined_session() -> Session {
    let mut session = Session::new(OWN_NICK, 4);
    for channel in CHANNELS {
        session.apply(&Event::join(OWN_NICK, channel));
    }
    session
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Indexes stay mirror images of each other through any valid history.
    #[test]
    fn membership_stays_consistent(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut session = joined_session();
        for op in &ops {
            let Some(event) = event_for(&session, op) else { continue };
            session.apply(&event);
            prop_assert_eq!(
                session.check_consistency().map_err(|e| e.to_string()),
                Ok(()),
                "after {:?}", event
            );
        }
    }

    /// `unique_users` agrees with a brute-force scan of every user.
    #[test]
    fn unique_users_matches_single_channel_users(
        ops in prop::collection::vec(op_strategy(), 1..80)
    ) {
        let mut session = joined_session();
        for op in &ops {
            let Some(event) = event_for(&session, op) else { continue };
            session.apply(&event);

            let channels: Vec<IrcStr> = session.channels().map(|c| c.name.clone()).collect();
            for channel in &channels {
                prop_assert_eq!(
                    session.unique_users(channel.clone()),
                    only_in(&session, channel),
                    "channel {} after {:?}", channel, event
                );
            }
        }
    }

    /// A user leaving every shared channel is forgotten entirely.
    #[test]
    fn users_without_channels_are_dropped(
        ops in prop::collection::vec(op_strategy(), 1..80)
    ) {
        let mut session = joined_session();
        for op in &ops {
            let Some(event) = event_for(&session, op) else { continue };
            session.apply(&event);
            for user in session.users() {
                prop_assert!(!user.channels.is_empty(), "{} has no channels", user.nick);
            }
        }
    }
}
