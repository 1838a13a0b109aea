//! Game state and the move engine.
//!
//! `GameState` wraps a [`Board`] with turn, score, and termination
//! bookkeeping. The engine is a pure transition: applying a move never
//! mutates its input and either yields a new state or a typed rejection,
//! so the same code drives local play, replay validation, and the
//! host-authoritative sync protocol.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{Board, BoardError, Direction, Player};

/// A single attempted line claim.
///
/// Coordinates are signed so out-of-range proposals (including negative
/// ones arriving off the wire) stay representable and are rejected as
/// rule violations rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub player: Player,
    pub x: i64,
    pub y: i64,
    pub dir: Direction,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {} {}({}, {})", self.player, self.dir, self.x, self.y)
    }
}

/// Why a move (or replay entry) was rejected.
///
/// The first four come from the rules themselves; the rest are sync
/// protocol adjudications (`invalid-move` is the host's wire-level
/// rejection, `local-invalid` a pre-send short circuit, `no-connection`
/// a channel-down rejection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationReason {
    InvalidDirection,
    OutOfBounds,
    Occupied,
    NotYourTurn,
    InvalidMove,
    LocalInvalid,
    NoConnection,
}

impl ViolationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDirection => "invalid-direction",
            Self::OutOfBounds => "out-of-bounds",
            Self::Occupied => "occupied",
            Self::NotYourTurn => "not-your-turn",
            Self::InvalidMove => "invalid-move",
            Self::LocalInvalid => "local-invalid",
            Self::NoConnection => "no-connection",
        }
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ViolationReason {}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Winner {
    Player(Player),
    Draw,
}

/// Full game state: board plus turn, scores, and termination.
///
/// Mutated only through [`GameState::apply`]; once `is_finished` no
/// transition can produce a successor (every line is claimed, so any
/// further move is rejected).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    current_player: Player,
    scores: [u32; 2],
    is_finished: bool,
    winner: Option<Winner>,
}

impl GameState {
    /// Fresh game on an empty board, player 0 to move.
    pub fn new(size_x: usize, size_y: usize) -> Result<Self, BoardError> {
        Ok(Self {
            board: Board::new(size_x, size_y)?,
            current_player: Player::Zero,
            scores: [0, 0],
            is_finished: false,
            winner: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Per-player box counts, indexed by [`Player::index`].
    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// Defined only once the game is finished.
    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// Validate a move's target against this state without applying it:
    /// bounds for its direction, then occupancy.
    pub fn check_move(&self, mv: &Move) -> Result<(), ViolationReason> {
        if !self.board.line_in_bounds(mv.dir, mv.x, mv.y) {
            return Err(ViolationReason::OutOfBounds);
        }
        if self.board.is_line_claimed(mv.dir, mv.x as usize, mv.y as usize) {
            return Err(ViolationReason::Occupied);
        }
        Ok(())
    }

    /// Apply a move, producing the successor state.
    ///
    /// Re-checks bounds and occupancy regardless of what the caller
    /// already verified; never partially applies. On success the line and
    /// any boxes it completed belong to `mv.player`, who keeps the turn
    /// iff at least one box was completed.
    ///
    /// The wrong-turn rule is deliberately not checked here: replay logs
    /// name their mover explicitly, and turn authority lives with the
    /// session host (or [`GameState::play`] for local games).
    pub fn apply(&self, mv: &Move) -> Result<GameState, ViolationReason> {
        self.check_move(mv)?;

        let mut next = self.clone();
        let completed = next
            .board
            .claim_line(mv.dir, mv.x as usize, mv.y as usize, mv.player);

        next.scores[mv.player.index()] += completed.len() as u32;
        next.current_player = if completed.is_empty() {
            mv.player.other()
        } else {
            mv.player
        };

        if next.board.all_lines_claimed() {
            next.is_finished = true;
            next.winner = Some(match next.scores[0].cmp(&next.scores[1]) {
                Ordering::Greater => Winner::Player(Player::Zero),
                Ordering::Less => Winner::Player(Player::One),
                Ordering::Equal => Winner::Draw,
            });
        }

        Ok(next)
    }

    /// Local-play convenience: apply a line claim for whoever's turn it is.
    pub fn play(&self, dir: Direction, x: i64, y: i64) -> Result<GameState, ViolationReason> {
        self.apply(&Move {
            player: self.current_player,
            x,
            y,
            dir,
        })
    }

    /// Vet an untrusted snapshot (one received off the wire) before
    /// adopting it: grid shapes must match the declared dimensions, box
    /// ownership must agree with line ownership, cached scores must match
    /// counted boxes, and the termination fields must be coherent.
    pub fn check_snapshot(&self) -> Result<(), SnapshotError> {
        if !self.board.shape_ok() {
            return Err(SnapshotError::MalformedGrid);
        }
        if !self.board.boxes_consistent() {
            return Err(SnapshotError::InconsistentBoxes);
        }
        for player in [Player::Zero, Player::One] {
            let counted = self.board.count_boxes(player);
            let cached = self.scores[player.index()];
            if counted != cached {
                return Err(SnapshotError::ScoreMismatch {
                    player,
                    cached,
                    counted,
                });
            }
        }
        if self.is_finished != self.board.all_lines_claimed() {
            return Err(SnapshotError::BadTermination);
        }
        let expected_winner = if self.is_finished {
            Some(match self.scores[0].cmp(&self.scores[1]) {
                Ordering::Greater => Winner::Player(Player::Zero),
                Ordering::Less => Winner::Player(Player::One),
                Ordering::Equal => Winner::Draw,
            })
        } else {
            None
        };
        if self.winner != expected_winner {
            return Err(SnapshotError::BadTermination);
        }
        Ok(())
    }
}

/// Why a remote snapshot was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    /// Grid shapes do not match the declared dimensions.
    MalformedGrid,
    /// A box's ownership disagrees with its sides.
    InconsistentBoxes,
    /// Cached score differs from counted boxes.
    ScoreMismatch {
        player: Player,
        cached: u32,
        counted: u32,
    },
    /// Finished flag or winner inconsistent with the board.
    BadTermination,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedGrid => write!(f, "Snapshot grids do not match declared dimensions"),
            Self::InconsistentBoxes => {
                write!(f, "Snapshot box ownership disagrees with line ownership")
            }
            Self::ScoreMismatch {
                player,
                cached,
                counted,
            } => write!(
                f,
                "Snapshot score for player {} is {} but the board shows {} boxes",
                player, cached, counted
            ),
            Self::BadTermination => {
                write!(f, "Snapshot finished flag or winner inconsistent with the board")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}
