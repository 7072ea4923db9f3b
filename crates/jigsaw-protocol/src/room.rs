//! Room and user snapshots as the server sends them.
//!
//! These arrive inside the JSON "room" and "users" messages and are
//! read-only to the client: pieces only ever change through combine
//! commands, and the server answers with fresh broadcasts.

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A participant in the room.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u16,
    pub name: String,
    pub color: String,
}

// ---------------------------------------------------------------------------
// Set
// ---------------------------------------------------------------------------

/// The grid layout of a puzzle: rows, columns and physical size.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Set {
    pub rows: u16,
    #[serde(rename = "cols")]
    pub columns: u16,
    pub width: f32,
    pub height: f32,
}

impl Set {
    /// Width of a single piece.
    pub fn piece_width(&self) -> f32 {
        self.width / f32::from(self.columns)
    }

    /// Height of a single piece.
    pub fn piece_height(&self) -> f32 {
        self.height / f32::from(self.rows)
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A cluster of pieces the server has joined into one movable unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: u16,
    pub ids: Vec<u16>,
    pub indices: Vec<u16>,
    pub locked: bool,
    pub x: f32,
    pub y: f32,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// Full snapshot of the active puzzle.
///
/// Field names follow the server's camelCase keys. Missing keys fall back
/// to their zero value, except that the set list is checked: every grid
/// accessor goes through [`Room::set`], which insists on exactly one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    pub board_height: u32,
    pub board_width: u32,
    pub groups: Vec<Group>,
    pub hide_preview: bool,
    pub jitter: f32,
    pub name: String,
    pub no_lock_unlock: bool,
    pub no_multi_select: bool,
    pub pieces: u16,
    pub rotation: bool,
    pub seed: i64,
    pub start_time: i64,
    pub tab_size: f32,
    pub sets: Vec<Set>,
}

impl Room {
    /// Returns the room's only piece set.
    ///
    /// # Errors
    /// [`ProtocolError::SetCount`] if the room has zero or several sets.
    pub fn set(&self) -> Result<&Set, ProtocolError> {
        match self.sets.as_slice() {
            [set] => Ok(set),
            sets => Err(ProtocolError::SetCount(sets.len())),
        }
    }

    /// Number of piece rows.
    pub fn rows(&self) -> Result<u16, ProtocolError> {
        Ok(self.set()?.rows)
    }

    /// Number of piece columns.
    pub fn columns(&self) -> Result<u16, ProtocolError> {
        Ok(self.set()?.columns)
    }

    /// Width of a single piece.
    pub fn piece_width(&self) -> Result<f32, ProtocolError> {
        Ok(self.set()?.piece_width())
    }

    /// Height of a single piece.
    pub fn piece_height(&self) -> Result<f32, ProtocolError> {
        Ok(self.set()?.piece_height())
    }

    /// Centre of the board in board coordinates.
    pub fn board_center(&self) -> (f32, f32) {
        (self.board_width as f32 / 2.0, self.board_height as f32 / 2.0)
    }

    /// Looks up a group by its id.
    pub fn group_by_id(&self, id: u16) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_room_json() -> &'static str {
        r#"{
            "boardHeight": 1200,
            "boardWidth": 1600,
            "groups": [
                {"id": 1, "ids": [1, 2], "indices": [0, 1], "locked": false, "x": 10.5, "y": 20.0},
                {"id": 7, "ids": [7], "indices": [6], "locked": true, "x": 0, "y": 0}
            ],
            "hidePreview": false,
            "jitter": 0.25,
            "name": "Mountains",
            "noLockUnlock": false,
            "noMultiSelect": true,
            "pieces": 12,
            "rotation": false,
            "seed": 987654321,
            "startTime": 1700000000000,
            "tabSize": 0.2,
            "sets": [{"rows": 3, "cols": 4, "width": 800, "height": 600}]
        }"#
    }

    #[test]
    fn test_room_deserializes_camel_case_fields() {
        let room: Room = serde_json::from_str(sample_room_json()).unwrap();

        assert_eq!(room.board_width, 1600);
        assert_eq!(room.board_height, 1200);
        assert_eq!(room.name, "Mountains");
        assert!(room.no_multi_select);
        assert_eq!(room.pieces, 12);
        assert_eq!(room.start_time, 1_700_000_000_000);
        assert_eq!(room.groups.len(), 2);
    }

    #[test]
    fn test_room_grid_accessors_use_single_set() {
        let room: Room = serde_json::from_str(sample_room_json()).unwrap();

        assert_eq!(room.rows().unwrap(), 3);
        assert_eq!(room.columns().unwrap(), 4);
        assert_eq!(room.piece_width().unwrap(), 200.0);
        assert_eq!(room.piece_height().unwrap(), 200.0);
        assert_eq!(room.board_center(), (800.0, 600.0));
    }

    #[test]
    fn test_room_without_sets_is_a_shape_error() {
        let room = Room::default();
        assert!(matches!(room.set(), Err(ProtocolError::SetCount(0))));
        assert!(room.rows().is_err());
    }

    #[test]
    fn test_room_with_two_sets_is_a_shape_error() {
        let room = Room {
            sets: vec![Set::default(), Set::default()],
            ..Room::default()
        };
        assert!(matches!(room.columns(), Err(ProtocolError::SetCount(2))));
    }

    #[test]
    fn test_group_by_id() {
        let room: Room = serde_json::from_str(sample_room_json()).unwrap();

        let group = room.group_by_id(7).expect("group 7 exists");
        assert!(group.locked);
        assert_eq!(group.ids, vec![7]);
        assert!(room.group_by_id(3).is_none());
    }

    #[test]
    fn test_user_list_deserializes() {
        let users: Vec<User> = serde_json::from_str(
            r##"[{"id": 1, "name": "Ann", "color": "#ff0000"}, {"id": 2, "name": "Bot"}]"##,
        )
        .unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].color, "#ff0000");
        assert_eq!(users[1].color, "");
    }
}
