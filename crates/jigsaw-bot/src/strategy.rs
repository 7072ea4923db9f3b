//! Assembly strategies.
//!
//! A strategy looks at the joined room and produces a plan: the list of
//! combine commands that assemble some part of the puzzle. Planning is
//! pure, so the piece arithmetic is tested without a server; [`execute`]
//! then feeds the plan to a live session with a pause between commands.
//!
//! Pieces are numbered row-major starting at 1: the piece at `(row, col)`
//! has id `col + row * cols + 1`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use jigsaw::prelude::*;
use jigsaw::protocol::CombinePieces;

/// Every edge strategy collects pieces into this one.
pub const ROOT_PIECE: u16 = 1;

/// Errors that stop a strategy before any command is sent.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("invalid region {0:?}: expected (row,col):(row,col) with start <= end")]
    InvalidRegion(String),

    #[error("region {region} starts outside the {rows}x{cols} grid")]
    OutsideGrid { region: Region, rows: u16, cols: u16 },

    #[error("could not find root group {0}")]
    RootNotFound(u16),

    #[error("root group {0} is locked")]
    RootLocked(u16),

    #[error("a {rows}x{cols} grid exceeds the piece id range")]
    GridTooLarge { rows: u16, cols: u16 },

    #[error("joined without a room snapshot")]
    NoRoom,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Id of the piece at `(row, col)` in a grid `cols` pieces wide.
pub fn rc(row: u16, col: u16, cols: u16) -> u16 {
    col + row * cols + 1
}

// ---------------------------------------------------------------------------
// Grid / Region
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grid {
    rows: u16,
    cols: u16,
}

impl Grid {
    fn from_room(room: &Room) -> Result<Self, StrategyError> {
        let rows = room.rows()?;
        let cols = room.columns()?;
        if u32::from(rows) * u32::from(cols) > u32::from(u16::MAX) {
            return Err(StrategyError::GridTooLarge { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    fn is_empty(self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    fn id(self, row: u16, col: u16) -> u16 {
        rc(row, col, self.cols)
    }

    /// The region covering every piece, or `None` for an empty grid.
    fn full_region(self) -> Option<Region> {
        (!self.is_empty()).then(|| Region {
            start_row: 0,
            start_col: 0,
            end_row: self.rows - 1,
            end_col: self.cols - 1,
        })
    }
}

/// An inclusive rectangle of grid cells, written `(row,col):(row,col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start_row: u16,
    pub start_col: u16,
    pub end_row: u16,
    pub end_col: u16,
}

impl Region {
    /// Shrinks the region to the grid.
    ///
    /// # Errors
    /// [`StrategyError::OutsideGrid`] if its start cell isn't on the grid.
    fn clamp_to(self, grid: Grid) -> Result<Self, StrategyError> {
        if self.start_row >= grid.rows || self.start_col >= grid.cols {
            return Err(StrategyError::OutsideGrid {
                region: self,
                rows: grid.rows,
                cols: grid.cols,
            });
        }
        Ok(Self {
            end_row: self.end_row.min(grid.rows - 1),
            end_col: self.end_col.min(grid.cols - 1),
            ..self
        })
    }

    fn width(self) -> u16 {
        self.end_col - self.start_col + 1
    }

    fn height(self) -> u16 {
        self.end_row - self.start_row + 1
    }
}

impl FromStr for Region {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StrategyError::InvalidRegion(s.to_string());

        let (start, end) = s.trim().split_once(':').ok_or_else(invalid)?;
        let (start_row, start_col) = parse_cell(start).ok_or_else(invalid)?;
        let (end_row, end_col) = parse_cell(end).ok_or_else(invalid)?;
        if start_row > end_row || start_col > end_col {
            return Err(invalid());
        }

        Ok(Self {
            start_row,
            start_col,
            end_row,
            end_col,
        })
    }
}

fn parse_cell(s: &str) -> Option<(u16, u16)> {
    let inner = s.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (row, col) = inner.split_once(',')?;
    Some((row.trim().parse().ok()?, col.trim().parse().ok()?))
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}):({},{})",
            self.start_row, self.start_col, self.end_row, self.end_col
        )
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Where an assembled region is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Center of the board.
    #[default]
    BoardCenter,
    /// Against the board's top-left corner.
    TopLeft,
}

/// What the bot assembles once it has joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The puzzle border, collected into piece 1.
    Edges,
    /// The whole puzzle, ignoring root group checks.
    Complete,
    /// One rectangle, collected into its top-left piece.
    Region {
        region: Region,
        placement: Placement,
        /// Skip the root group existence and lock checks.
        force: bool,
    },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Edges => "edges",
            Self::Complete => "complete",
            Self::Region { .. } => "region",
        }
    }

    /// The combine commands this strategy issues for `room`.
    pub fn plan(&self, room: &Room) -> Result<Vec<CombinePieces>, StrategyError> {
        match *self {
            Self::Edges => edges_plan(room),
            Self::Complete => {
                let grid = Grid::from_room(room)?;
                let Some(region) = grid.full_region() else {
                    return Ok(Vec::new());
                };
                let (x, y) = room.board_center();
                region_plan(room, region, x, y, true)
            }
            Self::Region {
                region,
                placement,
                force,
            } => {
                let grid = Grid::from_room(room)?;
                let clamped = region.clamp_to(grid)?;
                let (x, y) = match placement {
                    Placement::BoardCenter => room.board_center(),
                    Placement::TopLeft => (
                        f32::from(clamped.width()) * room.piece_width()? / 2.0,
                        f32::from(clamped.height()) * room.piece_height()? / 2.0,
                    ),
                };
                region_plan(room, region, x, y, force)
            }
        }
    }
}

/// Combines every border piece into [`ROOT_PIECE`] at the board center.
fn edges_plan(room: &Room) -> Result<Vec<CombinePieces>, StrategyError> {
    let grid = Grid::from_room(room)?;
    if grid.is_empty() {
        return Ok(Vec::new());
    }

    let last_row = grid.rows - 1;
    let last_col = grid.cols - 1;
    let mut ids: Vec<u16> = (0..grid.cols).map(|col| grid.id(0, col)).collect();
    for row in 1..last_row {
        ids.push(grid.id(row, 0));
        if last_col > 0 {
            ids.push(grid.id(row, last_col));
        }
    }
    if last_row > 0 {
        ids.extend((0..grid.cols).map(|col| grid.id(last_row, col)));
    }

    let (x, y) = room.board_center();
    Ok(combine_into(ROOT_PIECE, ids, x, y))
}

/// Combines every piece of `region` into its top-left piece at `(x, y)`.
fn region_plan(
    room: &Room,
    region: Region,
    x: f32,
    y: f32,
    force: bool,
) -> Result<Vec<CombinePieces>, StrategyError> {
    let grid = Grid::from_room(room)?;
    let region = region.clamp_to(grid)?;
    let root = grid.id(region.start_row, region.start_col);

    if !force {
        match room.group_by_id(root) {
            None => return Err(StrategyError::RootNotFound(root)),
            Some(group) if group.locked => return Err(StrategyError::RootLocked(root)),
            Some(_) => {}
        }
    }

    let ids = (region.start_row..=region.end_row).flat_map(|row| {
        (region.start_col..=region.end_col).map(move |col| grid.id(row, col))
    });
    Ok(combine_into(root, ids, x, y))
}

fn combine_into(
    root: u16,
    ids: impl IntoIterator<Item = u16>,
    x: f32,
    y: f32,
) -> Vec<CombinePieces> {
    ids.into_iter()
        .filter(|&id| id != root)
        .map(|second_id| CombinePieces {
            first_id: root,
            second_id,
            x,
            y,
        })
        .collect()
}

/// Issues `plan` through `handle`, waiting `delay` after each command.
///
/// # Errors
/// [`SessionError::Closed`] if the session ends part way through.
pub async fn execute(
    handle: &SessionHandle,
    plan: &[CombinePieces],
    delay: Duration,
) -> Result<(), SessionError> {
    for step in plan {
        handle.combine_pieces(step.first_id, step.second_id, step.x, step.y)?;
        tokio::time::sleep(delay).await;
    }
    Ok(())
}
