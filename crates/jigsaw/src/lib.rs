//! # Jigsaw
//!
//! Client library for collaborative online jigsaw puzzle rooms.
//!
//! Jigsaw connects to a puzzle server over WebSocket, passes its join
//! challenge, tracks the room it joined, and lets you move and combine
//! pieces. The layers live in their own crates; this one re-exports them
//! behind a single [`prelude`] and a single [`JigsawError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jigsaw::prelude::*;
//!
//! # async fn demo() -> Result<(), JigsawError> {
//! let session = Session::connect(SessionOptions::new("abcd"))
//!     .await?
//!     .on_joined(|handle, state| async move {
//!         if let Some(room) = &state.room {
//!             let (x, y) = room.board_center();
//!             let _ = handle.combine_pieces(1, 2, x, y);
//!         }
//!         handle.exit();
//!     });
//! session.run().await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod logging;

pub use error::JigsawError;

pub use jigsaw_protocol as protocol;
pub use jigsaw_session as session;
pub use jigsaw_transport as transport;

/// Everything needed to connect, join and issue commands.
pub mod prelude {
    pub use crate::JigsawError;
    pub use jigsaw_protocol::{Group, ProtocolError, Room, Set, User};
    pub use jigsaw_session::{
        Phase, Session, SessionError, SessionHandle, SessionOptions, SessionState,
    };
    pub use jigsaw_transport::TransportError;
}
