//! Replay log parsing and validation.
//!
//! A match log is a flat comma-separated integer encoding:
//!
//! ```text
//! size_x,size_y,player_0,x_0,y_0,dir_0,player_1,x_1,y_1,dir_1,...
//! ```
//!
//! Parsing re-derives the whole game from an empty board, move by move,
//! through the engine. The first rule violation halts the replay and
//! adjudicates a forfeit: the offending player loses. Malformed encodings
//! (wrong arity, bad numbers, bad dimensions) are format errors and yield
//! no partial result.

use std::fmt;

use super::board::{Board, Direction, Player};
use super::game::{GameState, Move, ViolationReason, Winner};

/// A decoded log entry. The direction is kept as its raw token because a
/// bad direction is a per-move rule violation, not a parse failure, and
/// the offending token must survive into the violation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMove {
    pub player: Player,
    pub x: i64,
    pub y: i64,
    pub dir: String,
}

impl ReplayMove {
    /// Normalize the direction token: `0`/`h`/`H` horizontal, `1`/`v`/`V`
    /// vertical, anything else unknown.
    pub fn direction(&self) -> Option<Direction> {
        match self.dir.as_str() {
            "0" | "h" | "H" => Some(Direction::Horizontal),
            "1" | "v" | "V" => Some(Direction::Vertical),
            _ => None,
        }
    }

    /// The engine-level move, if the direction token is valid.
    pub fn to_move(&self) -> Option<Move> {
        self.direction().map(|dir| Move {
            player: self.player,
            x: self.x,
            y: self.y,
            dir,
        })
    }
}

impl fmt::Display for ReplayMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {} {}({}, {})", self.player, self.dir, self.x, self.y)
    }
}

/// Malformed replay encoding. Fatal to parsing; no partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No tokens at all.
    Empty,
    /// Fewer than the two leading dimension values.
    MissingDimensions,
    /// A token that must be numeric is not. `index` is the token position.
    BadNumber { index: usize, token: String },
    /// A dimension is not positive.
    BadDimensions { size_x: i64, size_y: i64 },
    /// Move values left over after chunking into groups of four.
    TruncatedMoves { leftover: usize },
    /// A player value other than 0 or 1. `index` is the move position.
    BadPlayer { index: usize, value: i64 },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Replay data is empty"),
            Self::MissingDimensions => write!(f, "Replay is missing board dimensions"),
            Self::BadNumber { index, token } => {
                write!(f, "Token {} ({:?}) is not a number", index, token)
            }
            Self::BadDimensions { size_x, size_y } => {
                write!(f, "Board dimensions must be positive, got {}x{}", size_x, size_y)
            }
            Self::TruncatedMoves { leftover } => {
                write!(f, "Move data length is not a multiple of 4 ({} values left over)", leftover)
            }
            Self::BadPlayer { index, value } => {
                write!(f, "Move {} names player {} (expected 0 or 1)", index, value)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// The first rule violation in a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayViolation {
    /// Index of the offending move in the log.
    pub index: usize,
    /// The offending move as encoded.
    pub mv: ReplayMove,
    pub reason: ViolationReason,
    /// Board state immediately before the offending move.
    pub board_before: Board,
    /// The player who did not offend; an illegal move is a forfeit.
    pub winner: Player,
}

/// Result of replaying a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub size_x: usize,
    pub size_y: usize,
    /// Every decoded move, including any past the violation point.
    pub moves: Vec<ReplayMove>,
    /// Board snapshots: the empty board, then one per applied move.
    /// Appending stops at the first violation.
    pub frames: Vec<Board>,
    /// Scores after the last applied move.
    pub scores: [u32; 2],
    /// Adjudicated winner: the forfeit beneficiary on a violation, the
    /// game outcome if the log played to a finished board, `None` for a
    /// clean but unfinished log.
    pub winner: Option<Winner>,
    pub violation: Option<ReplayViolation>,
}

impl Replay {
    /// Number of moves actually applied.
    pub fn applied_moves(&self) -> usize {
        self.frames.len() - 1
    }
}

/// Parse and validate an encoded match log.
pub fn parse_replay(encoded: &str) -> Result<Replay, FormatError> {
    let tokens: Vec<&str> = encoded
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(FormatError::Empty);
    }
    if tokens.len() < 2 {
        return Err(FormatError::MissingDimensions);
    }

    let size_x = parse_number(&tokens, 0)?;
    let size_y = parse_number(&tokens, 1)?;
    if size_x <= 0 || size_y <= 0 {
        return Err(FormatError::BadDimensions { size_x, size_y });
    }

    let rest = &tokens[2..];
    if rest.len() % 4 != 0 {
        return Err(FormatError::TruncatedMoves {
            leftover: rest.len() % 4,
        });
    }

    let mut moves = Vec::with_capacity(rest.len() / 4);
    for (i, chunk) in rest.chunks_exact(4).enumerate() {
        let base = 2 + i * 4;
        let player_value = parse_number(&tokens, base)?;
        let player = Player::try_from(u8::try_from(player_value).unwrap_or(u8::MAX))
            .map_err(|_| FormatError::BadPlayer {
                index: i,
                value: player_value,
            })?;
        let x = parse_number(&tokens, base + 1)?;
        let y = parse_number(&tokens, base + 2)?;
        moves.push(ReplayMove {
            player,
            x,
            y,
            dir: chunk[3].to_string(),
        });
    }

    let size_x = size_x as usize;
    let size_y = size_y as usize;
    let mut state = GameState::new(size_x, size_y).map_err(|_| FormatError::BadDimensions {
        size_x: size_x as i64,
        size_y: size_y as i64,
    })?;

    let mut frames = vec![state.board().clone()];
    let mut violation = None;

    for (index, rmv) in moves.iter().enumerate() {
        let result = match rmv.to_move() {
            None => Err(ViolationReason::InvalidDirection),
            Some(mv) => state.apply(&mv),
        };
        match result {
            Ok(next) => {
                state = next;
                frames.push(state.board().clone());
            }
            Err(reason) => {
                violation = Some(ReplayViolation {
                    index,
                    mv: rmv.clone(),
                    reason,
                    board_before: state.board().clone(),
                    winner: rmv.player.other(),
                });
                break;
            }
        }
    }

    let winner = match &violation {
        Some(v) => Some(Winner::Player(v.winner)),
        None => state.winner(),
    };

    Ok(Replay {
        size_x,
        size_y,
        moves,
        frames,
        scores: state.scores(),
        winner,
        violation,
    })
}

/// Encode moves into the canonical numeric log form (directions as 0/1).
///
/// Round-trip guarantee: parsing the encoding of a legal move sequence
/// reproduces the snapshots the engine yields by applying those moves
/// one at a time from an empty board.
pub fn encode_replay(size_x: usize, size_y: usize, moves: &[Move]) -> String {
    let mut parts = vec![size_x.to_string(), size_y.to_string()];
    for mv in moves {
        parts.push(mv.player.index().to_string());
        parts.push(mv.x.to_string());
        parts.push(mv.y.to_string());
        parts.push(match mv.dir {
            Direction::Horizontal => "0".to_string(),
            Direction::Vertical => "1".to_string(),
        });
    }
    parts.join(",")
}

fn parse_number(tokens: &[&str], index: usize) -> Result<i64, FormatError> {
    tokens[index].parse().map_err(|_| FormatError::BadNumber {
        index,
        token: tokens[index].to_string(),
    })
}
