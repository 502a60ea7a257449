//! Session state tracking.
//!
//! A [`Session`] owns the user registry, the channel registry and the
//! membership edges between them for one bot instance. It is driven one
//! [`Event`](seshet_proto::Event) at a time and never shared mutably.

mod channel;
mod session;
mod user;

pub use channel::Channel;
pub use session::{ConsistencyError, Session};
pub use user::User;

/// Membership prefixes servers put in front of names replies.
pub const MEMBER_PREFIXES: &[char] = &['~', '&', '@', '%', '+'];
