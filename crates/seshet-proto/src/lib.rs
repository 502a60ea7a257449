//! # seshet-proto
//!
//! Protocol vocabulary shared by the seshet bot core. Nothing here does I/O:
//! the types describe IRC data after the wire layer has decoded it.
//!
//! ## Features
//!
//! - RFC 1459 case mapping and the case-insensitive [`IrcStr`] identifier
//! - Lenient `nick!user@host` parsing
//! - CTCP ACTION detection
//! - The decoded [`Event`] shape consumed by the logger and state tracker
//!
//! ## Quick Start
//!
//! ```rust
//! use seshet_proto::{Event, EventKind, IrcStr};
//!
//! let ev = Event::privmsg("alice", "#Rust", "\x01ACTION waves\x01")
//!     .with_hostmask("alice!al@example.org");
//!
//! assert_eq!(ev.kind, EventKind::Action);
//! assert_eq!(ev.target, IrcStr::new("#rust"));
//! assert_eq!(ev.hostmask, "al@example.org");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod ctcp;
pub mod event;
pub mod hostmask;
pub mod ircstr;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower, irc_to_upper, irc_upper_char};
pub use self::ctcp::Ctcp;
pub use self::event::{Event, EventKind, UnknownEventKind};
pub use self::hostmask::Hostmask;
pub use self::ircstr::IrcStr;
