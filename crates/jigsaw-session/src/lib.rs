//! Client session for the puzzle service.
//!
//! This crate turns a raw connection into a joined room:
//!
//! 1. **Handshake**: answering the server's challenge and sending the join
//!    request ([`Dispatcher`])
//! 2. **Join tracking**: collecting user id, room snapshot and user list in
//!    any order, and firing the joined callback exactly once
//!    ([`SessionState`], [`Phase`])
//! 3. **Pumping**: a read task and a write task sharing one cancellation
//!    signal ([`Session::run`])
//! 4. **Commands**: queuing piece moves from anywhere ([`SessionHandle`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Bot strategies (above)  ← issue commands once joined
//!     ↕
//! Session Layer (this crate)  ← handshake, join state, read/write pump
//!     ↕
//! Protocol Layer (below)  ← Inbound / Outbound messages, challenge solver
//! ```

mod dispatch;
mod error;
mod handle;
mod options;
mod session;
mod state;

pub use dispatch::{Action, Dispatcher};
pub use error::SessionError;
pub use handle::SessionHandle;
pub use options::{
    DEFAULT_USER_COLOR, DEFAULT_USER_NAME, GATEWAY_URL, SessionOptions, USER_AGENT,
};
pub use session::Session;
pub use state::{Phase, SessionState};
