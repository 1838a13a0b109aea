//! State management module for DotBox.
//!
//! This module provides the core state types:
//!
//! - `board` - The line/box ownership grid and its claim primitives
//! - `game` - `GameState` and the pure move engine
//! - `replay` - Encoded match log parsing and validation
//! - `session` - Host-authoritative network session state machine
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                                                                  │
//! │   local UI ──▶ GameState::play ─┐                                │
//! │                                 │                                │
//! │   replay log ─▶ parse_replay ───┼──▶ GameState::apply ──▶ Board  │
//! │                                 │    (pure transition)           │
//! │   channel ───▶ Session ─────────┘                                │
//! │                  │                                               │
//! │                  └──▶ outbound Message batch ──▶ channel         │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mode funnels through the same engine transition, so local play,
//! replay validation, and network play cannot disagree about the rules.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dotbox_state::state::{parse_replay, Direction, GameState, Session};
//!
//! // Local game
//! let state = GameState::new(5, 5)?;
//! let state = state.play(Direction::Horizontal, 0, 0)?;
//!
//! // Replay validation
//! let replay = parse_replay("5,5,0,0,0,0,1,0,0,1")?;
//!
//! // Network host
//! let mut host = Session::host(5, 5)?;
//! let outbound = host.channel_open();
//! ```

pub mod board;
pub mod game;
pub mod replay;
pub mod session;

// Re-export commonly used types
pub use board::{Board, BoardError, Direction, InvalidPlayer, Player};
pub use game::{GameState, Move, SnapshotError, ViolationReason, Winner};
pub use replay::{
    encode_replay, parse_replay, FormatError, Replay, ReplayMove, ReplayViolation,
};
pub use session::{
    LogEntry, Message, ProposeError, Role, Session, SessionStatus, ViolationNotice, LOG_CAPACITY,
};
