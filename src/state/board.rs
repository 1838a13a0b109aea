//! Board model.
//!
//! The dots-and-boxes grid: ownership of horizontal lines, vertical lines,
//! and boxes. Lines and boxes are claimed at most once and never change
//! owner afterward; all mutation goes through the claim primitive so those
//! invariants hold everywhere a `Board` is visible.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A player identifier. Exactly two players per match.
///
/// On the wire a player is the integer `0` or `1`, matching the replay
/// encoding and the sync protocol payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Player {
    Zero,
    One,
}

impl Player {
    /// The opposing player.
    pub fn other(&self) -> Player {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }

    /// Index into per-player arrays (scores).
    pub fn index(&self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = InvalidPlayer;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            other => Err(InvalidPlayer(other)),
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> u8 {
        player.index() as u8
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Error for a player id that is not 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPlayer(pub u8);

impl fmt::Display for InvalidPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid player id {} (expected 0 or 1)", self.0)
    }
}

impl std::error::Error for InvalidPlayer {}

/// Orientation of a line on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "h")]
    Horizontal,
    #[serde(rename = "v")]
    Vertical,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "h",
            Self::Vertical => "v",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// One or both dimensions are zero.
    ZeroSize { size_x: usize, size_y: usize },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize { size_x, size_y } => {
                write!(f, "Board dimensions must be positive, got {}x{}", size_x, size_y)
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// The dots-and-boxes grid.
///
/// For a board of `size_x` by `size_y` boxes:
///
/// - `horizontal[y][x]` with `y in [0, size_y]`, `x in [0, size_x)`
/// - `vertical[x][y]` with `x in [0, size_x]`, `y in [0, size_y)`
/// - `boxes[y][x]` with `y in [0, size_y)`, `x in [0, size_x)`
///
/// Every cell holds the claiming player, or `None` while unclaimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size_x: usize,
    size_y: usize,
    horizontal: Vec<Vec<Option<Player>>>,
    vertical: Vec<Vec<Option<Player>>>,
    boxes: Vec<Vec<Option<Player>>>,
}

impl Board {
    /// Create an empty board. Fails if either dimension is zero.
    pub fn new(size_x: usize, size_y: usize) -> Result<Self, BoardError> {
        if size_x == 0 || size_y == 0 {
            return Err(BoardError::ZeroSize { size_x, size_y });
        }

        Ok(Self {
            size_x,
            size_y,
            horizontal: vec![vec![None; size_x]; size_y + 1],
            vertical: vec![vec![None; size_y]; size_x + 1],
            boxes: vec![vec![None; size_x]; size_y],
        })
    }

    /// Width in boxes.
    pub fn size_x(&self) -> usize {
        self.size_x
    }

    /// Height in boxes.
    pub fn size_y(&self) -> usize {
        self.size_y
    }

    /// Check whether signed coordinates name a valid line for `dir`.
    ///
    /// This is the bounds predicate callers must use before touching a
    /// line; the index-based accessors below treat out-of-range access as
    /// a programming error.
    pub fn line_in_bounds(&self, dir: Direction, x: i64, y: i64) -> bool {
        let (sx, sy) = (self.size_x as i64, self.size_y as i64);
        match dir {
            Direction::Horizontal => x >= 0 && x < sx && y >= 0 && y <= sy,
            Direction::Vertical => x >= 0 && x <= sx && y >= 0 && y < sy,
        }
    }

    /// Owner of a line. Panics if `(x, y)` is out of range for `dir`.
    pub fn line(&self, dir: Direction, x: usize, y: usize) -> Option<Player> {
        match dir {
            Direction::Horizontal => self.horizontal[y][x],
            Direction::Vertical => self.vertical[x][y],
        }
    }

    /// Whether a line is claimed. Panics if out of range for `dir`.
    pub fn is_line_claimed(&self, dir: Direction, x: usize, y: usize) -> bool {
        self.line(dir, x, y).is_some()
    }

    /// Owner of a box, or `None` while incomplete.
    pub fn box_owner(&self, x: usize, y: usize) -> Option<Player> {
        self.boxes[y][x]
    }

    /// Horizontal line grid, indexed `[y][x]`. Read-only render surface.
    pub fn horizontal_lines(&self) -> &[Vec<Option<Player>>] {
        &self.horizontal
    }

    /// Vertical line grid, indexed `[x][y]`. Read-only render surface.
    pub fn vertical_lines(&self) -> &[Vec<Option<Player>>] {
        &self.vertical
    }

    /// Box ownership grid, indexed `[y][x]`. Read-only render surface.
    pub fn boxes(&self) -> &[Vec<Option<Player>>] {
        &self.boxes
    }

    /// Whether every line on the board is claimed.
    pub fn all_lines_claimed(&self) -> bool {
        self.horizontal.iter().all(|row| row.iter().all(Option::is_some))
            && self.vertical.iter().all(|col| col.iter().all(Option::is_some))
    }

    /// Count boxes owned by a player.
    pub fn count_boxes(&self, player: Player) -> u32 {
        self.boxes
            .iter()
            .flatten()
            .filter(|owner| **owner == Some(player))
            .count() as u32
    }

    /// Count boxes with any owner.
    pub fn claimed_box_count(&self) -> u32 {
        self.boxes.iter().flatten().filter(|owner| owner.is_some()).count() as u32
    }

    /// Whether all four sides of box `(x, y)` are claimed.
    fn box_complete(&self, x: usize, y: usize) -> bool {
        self.horizontal[y][x].is_some()
            && self.horizontal[y + 1][x].is_some()
            && self.vertical[x][y].is_some()
            && self.vertical[x + 1][y].is_some()
    }

    /// Claim a line for `player` and complete any adjacent boxes.
    ///
    /// Returns the coordinates of boxes newly completed by this claim
    /// (zero, one, or two of them; two only for an interior line whose
    /// both neighbors had three sides already). The line must be in range
    /// and unclaimed; the engine checks both before calling.
    pub(crate) fn claim_line(
        &mut self,
        dir: Direction,
        x: usize,
        y: usize,
        player: Player,
    ) -> Vec<(usize, usize)> {
        match dir {
            Direction::Horizontal => self.horizontal[y][x] = Some(player),
            Direction::Vertical => self.vertical[x][y] = Some(player),
        }

        let mut completed = Vec::new();
        for (bx, by) in self.adjacent_boxes(dir, x, y) {
            if self.boxes[by][bx].is_none() && self.box_complete(bx, by) {
                self.boxes[by][bx] = Some(player);
                completed.push((bx, by));
            }
        }
        completed
    }

    /// The one or two boxes bounded by a line.
    fn adjacent_boxes(&self, dir: Direction, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(2);
        match dir {
            Direction::Horizontal => {
                if y > 0 {
                    out.push((x, y - 1));
                }
                if y < self.size_y {
                    out.push((x, y));
                }
            }
            Direction::Vertical => {
                if x > 0 {
                    out.push((x - 1, y));
                }
                if x < self.size_x {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// Whether the grids have the shapes the dimensions declare.
    ///
    /// Used when vetting a deserialized remote snapshot.
    pub(crate) fn shape_ok(&self) -> bool {
        self.size_x > 0
            && self.size_y > 0
            && self.horizontal.len() == self.size_y + 1
            && self.horizontal.iter().all(|row| row.len() == self.size_x)
            && self.vertical.len() == self.size_x + 1
            && self.vertical.iter().all(|col| col.len() == self.size_y)
            && self.boxes.len() == self.size_y
            && self.boxes.iter().all(|row| row.len() == self.size_x)
    }

    /// Whether box ownership agrees with line ownership: a box is owned
    /// exactly when all four of its sides are claimed.
    pub(crate) fn boxes_consistent(&self) -> bool {
        for y in 0..self.size_y {
            for x in 0..self.size_x {
                if self.boxes[y][x].is_some() != self.box_complete(x, y) {
                    return false;
                }
            }
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn truncate_last_horizontal_row(&mut self) {
        if let Some(row) = self.horizontal.last_mut() {
            row.pop();
        }
    }
}
