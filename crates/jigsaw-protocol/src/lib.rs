//! Wire protocol of the puzzle service.
//!
//! This crate defines everything that travels on the socket:
//!
//! - **Binary view** ([`DataView`]) — little-endian primitives the binary
//!   frames are built from.
//! - **Messages** ([`Outbound`], [`Inbound`]) — what the client sends and
//!   understands, with their exact encodings.
//! - **Room model** ([`Room`], [`Set`], [`Group`], [`User`]) — the JSON
//!   snapshots the server broadcasts.
//! - **Challenge** ([`challenge`]) — the arithmetic gate passed before a
//!   room can be joined.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (frames) and session (join
//! state). It holds no state of its own.
//!
//! ```text
//! Transport (Frame) → Protocol (Inbound / Outbound) → Session (state machine)
//! ```

pub mod challenge;
mod error;
mod message;
mod room;
mod view;

pub use challenge::{Coefficients, EXPECTED_VERSION};
pub use error::ProtocolError;
pub use message::{
    Challenge, CombinePieces, Inbound, JoinRequest, Outbound, PiecePosition,
    tag,
};
pub use room::{Group, Room, Set, User};
pub use view::DataView;
