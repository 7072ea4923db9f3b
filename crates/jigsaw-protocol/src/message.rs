//! Outbound and inbound messages and their exact wire encodings.
//!
//! The puzzle service mixes two framings on one socket:
//!
//! - **binary frames** start with a one-byte type tag; client frames then
//!   carry the sender's user id as a `u16`, followed by a fixed layout:
//!
//! ```text
//! Pong          [11][user:u16]                                      3 bytes
//! PickUp        [ 1][user:u16][piece:u16][x:f32][y:f32]            13 bytes
//! Move          [ 2][user:u16][piece:u16][x:f32][y:f32]            13 bytes
//! PutDown       [ 3][user:u16][piece:u16][x:f32][y:f32]            13 bytes
//! Combine       [ 6][user:u16][first:u16][second:u16][x:f32][y:f32] 15 bytes
//! Challenge     [12][ 0][ 0][decimal ASCII digits ...]         3 + digits
//! ```
//!
//! - **text frames** carry JSON objects tagged by a `type` field.

use jigsaw_transport::Frame;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::view::DataView;
use crate::{ProtocolError, Room, User};

/// One-byte type tags of binary frames.
pub mod tag {
    pub const PICK_UP: u8 = 1;
    pub const MOVE: u8 = 2;
    pub const PUT_DOWN: u8 = 3;
    pub const COMBINE: u8 = 6;
    /// Server ping; the client's pong reuses the tag.
    pub const PING: u8 = 11;
    /// Server challenge; the client's response reuses the tag.
    pub const CHALLENGE: u8 = 12;
    pub const USER_ID: u8 = 15;
}

const PONG_LEN: usize = 3;
const PIECE_LEN: usize = 13;
const COMBINE_LEN: usize = 15;
const CHALLENGE_DIGITS_OFFSET: usize = 3;
const CHALLENGE_STRINGS_OFFSET: usize = 3;

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A piece id and the board position it is held at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiecePosition {
    pub id: u16,
    pub x: f32,
    pub y: f32,
}

/// Request to merge the group containing `second_id` into `first_id`'s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinePieces {
    pub first_id: u16,
    pub second_id: u16,
    pub x: f32,
    pub y: f32,
}

/// Identity and room the client joins with.
///
/// `secret` is `None` for public rooms and goes out as JSON `null`, never
/// as an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub name: String,
    pub color: String,
    pub room: String,
    pub secret: Option<String>,
}

#[derive(Serialize)]
struct JoinWire<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    color: &'a str,
    room: &'a str,
    secret: Option<&'a str>,
}

/// Messages the client sends.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Reply to a server ping.
    Pong,
    /// Join the configured room.
    Join(JoinRequest),
    PickUp(PiecePosition),
    Move(PiecePosition),
    PutDown(PiecePosition),
    Combine(CombinePieces),
    /// Answer to the server's challenge.
    ChallengeResponse(u32),
}

impl Outbound {
    /// Stable name used in trace logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pong => "Pong",
            Self::Join(_) => "Join",
            Self::PickUp(_) => "PickUp",
            Self::Move(_) => "Move",
            Self::PutDown(_) => "PutDown",
            Self::Combine(_) => "Combine",
            Self::ChallengeResponse(_) => "ChallengeResponse",
        }
    }

    /// Encodes the message as the frame to put on the wire.
    ///
    /// `user_id` is the id the server assigned this client; binary piece
    /// commands and pongs carry it right after the tag.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if JSON serialization of a join fails.
    pub fn encode(&self, user_id: u16) -> Result<Frame, ProtocolError> {
        let frame = match self {
            Self::Pong => {
                let mut view = DataView::new(vec![0u8; PONG_LEN]);
                view.put_u8(tag::PING, 0);
                view.put_u16(user_id, 1);
                Frame::Binary(view.into_inner())
            }
            Self::Join(join) => {
                let wire = JoinWire {
                    kind: "user",
                    name: &join.name,
                    color: &join.color,
                    room: &join.room,
                    secret: join.secret.as_deref(),
                };
                let text = serde_json::to_string(&wire)
                    .map_err(ProtocolError::Encode)?;
                Frame::Text(text)
            }
            Self::PickUp(p) => encode_piece(tag::PICK_UP, user_id, p),
            Self::Move(p) => encode_piece(tag::MOVE, user_id, p),
            Self::PutDown(p) => encode_piece(tag::PUT_DOWN, user_id, p),
            Self::Combine(c) => {
                let mut view = DataView::new(vec![0u8; COMBINE_LEN]);
                view.put_u8(tag::COMBINE, 0);
                view.put_u16(user_id, 1);
                view.put_u16(c.first_id, 3);
                view.put_u16(c.second_id, 5);
                view.put_f32(c.x, 7);
                view.put_f32(c.y, 11);
                Frame::Binary(view.into_inner())
            }
            Self::ChallengeResponse(value) => {
                let digits = value.to_string();
                let mut view = DataView::new(vec![
                    0u8;
                    CHALLENGE_DIGITS_OFFSET + digits.len()
                ]);
                view.put_u8(tag::CHALLENGE, 0);
                view.put_raw_bytes(digits.as_bytes(), CHALLENGE_DIGITS_OFFSET);
                Frame::Binary(view.into_inner())
            }
        };
        Ok(frame)
    }
}

fn encode_piece(tag: u8, user_id: u16, p: &PiecePosition) -> Frame {
    let mut view = DataView::new(vec![0u8; PIECE_LEN]);
    view.put_u8(tag, 0);
    view.put_u16(user_id, 1);
    view.put_u16(p.id, 3);
    view.put_f32(p.x, 5);
    view.put_f32(p.y, 9);
    Frame::Binary(view.into_inner())
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Version announcement and formula of a server challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub version: String,
    pub formula: String,
}

/// Messages the client understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Binary ping; answer with [`Outbound::Pong`].
    Ping,
    /// Binary challenge gating the join.
    Challenge(Challenge),
    /// Binary user id assignment.
    UserId(u16),
    /// JSON server version announcement.
    Version(String),
    /// JSON user id assignment.
    Me(u16),
    /// JSON room snapshot.
    Room(Room),
    /// JSON user list.
    Users(Vec<User>),
    /// A tag or type this client doesn't handle.
    Ignored,
}

/// The JSON envelope. The room and user documents sit under capitalized
/// keys even though their own fields are camelCase.
///
/// Only `type` is typed up front; every other field is decoded in the arm
/// of the type that owns it, so foreign fields on other types never fail.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(rename = "Room", alias = "room", default)]
    room: Option<Value>,
    #[serde(rename = "Users", alias = "users", default)]
    users: Option<Value>,
}

impl Inbound {
    /// Decodes a binary frame by its leading tag.
    ///
    /// Unknown tags decode to [`Inbound::Ignored`].
    ///
    /// # Errors
    /// [`ProtocolError::Truncated`] if the frame is shorter than the layout
    /// of its tag.
    pub fn decode_binary(data: &[u8]) -> Result<Self, ProtocolError> {
        let view = DataView::new(data);
        require(&view, 1)?;

        match view.u8(0) {
            tag::PING => Ok(Self::Ping),
            tag::CHALLENGE => {
                let mut pos = CHALLENGE_STRINGS_OFFSET;
                let (version, consumed) = read_string_checked(&view, pos)?;
                pos += consumed;
                let (formula, _) = read_string_checked(&view, pos)?;
                Ok(Self::Challenge(Challenge { version, formula }))
            }
            tag::USER_ID => {
                require(&view, 3)?;
                Ok(Self::UserId(view.u16(1)))
            }
            _ => Ok(Self::Ignored),
        }
    }

    /// Decodes a JSON text frame by its `type` field.
    ///
    /// Unknown types decode to [`Inbound::Ignored`].
    ///
    /// # Errors
    /// [`ProtocolError::Decode`] for malformed JSON, an
    /// [`InvalidMessage`](ProtocolError::InvalidMessage) for a room or user
    /// message without its document, and [`ProtocolError::SetCount`] for a
    /// room that doesn't have exactly one set.
    pub fn decode_json(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(ProtocolError::Decode)?;

        match envelope.kind.as_str() {
            "version" => Ok(Self::Version(field_or_default(envelope.version)?)),
            "me" => Ok(Self::Me(field_or_default(envelope.id)?)),
            "room" => {
                let doc = document(envelope.room).ok_or_else(|| {
                    ProtocolError::InvalidMessage("room message without Room".into())
                })?;
                let room: Room =
                    serde_json::from_value(doc).map_err(ProtocolError::Decode)?;
                room.set()?;
                Ok(Self::Room(room))
            }
            "users" => {
                let doc = document(envelope.users).ok_or_else(|| {
                    ProtocolError::InvalidMessage("users message without Users".into())
                })?;
                let users =
                    serde_json::from_value(doc).map_err(ProtocolError::Decode)?;
                Ok(Self::Users(users))
            }
            _ => Ok(Self::Ignored),
        }
    }
}

/// Decodes an envelope field; missing or `null` yields the zero value.
fn field_or_default<T>(value: Option<Value>) -> Result<T, ProtocolError>
where
    T: DeserializeOwned + Default,
{
    match document(value) {
        Some(value) => serde_json::from_value(value).map_err(ProtocolError::Decode),
        None => Ok(T::default()),
    }
}

fn document(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

fn require(view: &DataView<&[u8]>, needed: usize) -> Result<(), ProtocolError> {
    if view.len() < needed {
        Err(ProtocolError::Truncated {
            needed,
            len: view.len(),
        })
    } else {
        Ok(())
    }
}

fn read_string_checked(
    view: &DataView<&[u8]>,
    offset: usize,
) -> Result<(String, usize), ProtocolError> {
    require(view, offset + 2)?;
    require(view, offset + 2 + view.u16(offset) as usize)?;
    Ok(view.read_string(offset))
}
