//! Join progress: what the client knows about its room, and the session
//! lifecycle phase.

use std::fmt;

use jigsaw_protocol::{Room, User};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Everything the server has told this client about itself and the room.
///
/// Owned and mutated by the session's read task only. Other tasks see it as
/// an immutable snapshot handed out when the join completes.
///
/// The join sequence is complete once three independent pieces have
/// arrived, in any order: the user id, the room snapshot and the user
/// list. `joined` flips to `true` the first time all three are present and
/// never flips back, even if any of them is refreshed later.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Set once the join sequence has completed.
    pub joined: bool,

    /// Id the server assigned this client. 0 means not yet known.
    pub user_id: u16,

    /// Latest room snapshot.
    pub room: Option<Room>,

    /// Latest user list.
    pub users: Option<Vec<User>>,
}

impl SessionState {
    /// Returns `true` once user id, room and user list are all known.
    pub fn has_join_fields(&self) -> bool {
        self.user_id != 0 && self.room.is_some() && self.users.is_some()
    }

    /// Marks the state joined if the join fields just became complete.
    ///
    /// Returns `true` exactly once over the lifetime of the state: on the
    /// call where `joined` flips.
    pub fn try_join(&mut self) -> bool {
        if self.joined || !self.has_join_fields() {
            return false;
        }
        self.joined = true;
        true
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Lifecycle phase of a session.
///
/// Phases only move forward:
///
/// ```text
/// Connected → Challenged → Joined → Closed
/// ```
///
/// - **Connected**: socket open, waiting for the challenge. A session
///   starts here; dialing happens before one exists.
/// - **Challenged**: challenge answered and join sent; waiting for user id,
///   room and user list.
/// - **Joined**: all join fields known; commands make sense now.
/// - **Closed**: terminal. Reached by explicit exit or any fatal error.
///
/// Forward skips are allowed (a server may hand out the join fields before
/// any challenge), going back is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Connected,
    Challenged,
    Joined,
    Closed,
}

impl Phase {
    /// Returns `true` if moving to `target` is a forward step.
    pub fn can_transition_to(self, target: Self) -> bool {
        self != Self::Closed && target > self
    }

    /// Returns `true` for the terminal phase.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Moves to `target` if that is a forward step; otherwise stays put.
    pub fn advance(&mut self, target: Self) -> bool {
        if self.can_transition_to(target) {
            tracing::debug!(from = %self, to = %target, "session phase");
            *self = target;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Challenged => write!(f, "Challenged"),
            Self::Joined => write!(f, "Joined"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}
