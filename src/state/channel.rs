//! Tracked channels.

use seshet_proto::{Event, IrcStr};
use std::collections::{HashSet, VecDeque};

/// A channel the bot has joined.
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: IrcStr,
    /// Nicknames of the other members. The bot itself is never listed.
    pub members: HashSet<IrcStr>,
    recent: VecDeque<Event>,
    capacity: usize,
}

impl Channel {
    /// Create an empty channel keeping at most `capacity` recent messages.
    pub fn new(name: IrcStr, capacity: usize) -> Self {
        Self {
            name,
            members: HashSet::new(),
            recent: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn has_member(&self, nick: &IrcStr) -> bool {
        self.members.contains(nick)
    }

    /// Recent conversation events, oldest first.
    pub fn recent(&self) -> impl ExactSizeIterator<Item = &Event> + DoubleEndedIterator {
        self.recent.iter()
    }

    pub(crate) fn remember(&mut self, event: Event) {
        if self.capacity == 0 {
            return;
        }
        while self.recent.len() >= self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(event);
    }
}
