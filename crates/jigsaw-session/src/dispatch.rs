//! The session state machine, free of any I/O.
//!
//! [`Dispatcher`] takes one decoded [`Inbound`] message at a time and
//! returns the [`Action`]s the pump should perform. It never touches the
//! socket, so every ordering of the join sequence can be exercised
//! directly in unit tests.

use std::sync::Arc;

use jigsaw_protocol::challenge::{self, CHALLENGE_VERSION, Coefficients};
use jigsaw_protocol::{Challenge, Inbound, Outbound, ProtocolError};

use crate::options::SessionOptions;
use crate::state::{Phase, SessionState};

/// Something the pump must do in response to an inbound message.
#[derive(Debug, Clone)]
pub enum Action {
    /// Queue a message for the write task.
    Send(Outbound),

    /// The join sequence just completed. Carries a snapshot of the state
    /// for the joined callback.
    Joined(Arc<SessionState>),
}

/// Owns the session state and decides how to react to each message.
pub struct Dispatcher {
    options: SessionOptions,
    state: SessionState,
    phase: Phase,
}

impl Dispatcher {
    /// Creates a dispatcher for a freshly opened connection.
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            state: SessionState::default(),
            phase: Phase::Connected,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The options this dispatcher was created with.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Id to stamp on outbound binary frames. 0 until the server assigns
    /// one.
    pub fn user_id(&self) -> u16 {
        self.state.user_id
    }

    /// Marks the session closed. Further messages are still decoded by
    /// callers but produce no actions.
    pub fn close(&mut self) {
        self.phase.advance(Phase::Closed);
    }

    /// Handles one inbound message.
    ///
    /// # Errors
    /// A version mismatch (without override) or a malformed challenge. The
    /// session must end; no actions are produced for the failing message.
    pub fn handle(&mut self, msg: Inbound) -> Result<Vec<Action>, ProtocolError> {
        if self.phase.is_closed() {
            return Ok(Vec::new());
        }

        let mut actions = Vec::new();
        match msg {
            Inbound::Ping => {
                actions.push(Action::Send(Outbound::Pong));
                return Ok(actions);
            }
            Inbound::Challenge(challenge) => {
                let value = self.answer(&challenge)?;
                actions.push(Action::Send(Outbound::ChallengeResponse(value)));
                actions.push(Action::Send(Outbound::Join(self.options.join_request())));
                self.phase.advance(Phase::Challenged);
            }
            Inbound::Version(version) => {
                if version != CHALLENGE_VERSION {
                    tracing::info!(%version, "puzzle server version");
                    challenge::check_version(&version, self.options.override_version)?;
                }
            }
            Inbound::UserId(id) | Inbound::Me(id) => {
                tracing::info!(user_id = id, "assigned user id");
                self.state.user_id = id;
            }
            Inbound::Room(room) => {
                tracing::debug!(name = %room.name, pieces = room.pieces, "room snapshot");
                self.state.room = Some(room);
            }
            Inbound::Users(users) => {
                tracing::debug!(count = users.len(), "user list");
                self.state.users = Some(users);
            }
            Inbound::Ignored => {}
        }

        if self.state.try_join() {
            self.phase.advance(Phase::Joined);
            tracing::info!(room = %self.options.room, user_id = self.state.user_id, "joined room");
            actions.push(Action::Joined(Arc::new(self.state.clone())));
        }

        Ok(actions)
    }

    fn answer(&self, challenge: &Challenge) -> Result<u32, ProtocolError> {
        tracing::info!(version = %challenge.version, "puzzle server version");
        challenge::check_version(&challenge.version, self.options.override_version)?;

        let value = Coefficients::parse(&challenge.formula)?.solve();
        tracing::debug!(formula = %challenge.formula, value, "solved challenge");
        Ok(value)
    }
}
