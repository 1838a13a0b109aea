//! DotBox State Library
//!
//! This crate provides state management for DotBox (dots-and-boxes) game
//! logic.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Board Model** - The grid of claimable lines and boxes with
//!   once-only ownership invariants.
//!
//! - **Move Engine** - A pure `GameState -> GameState` transition that
//!   validates, applies, scores, advances turns, and terminates games.
//!
//! - **Replay Validation** - Parses encoded match logs, re-derives the
//!   whole game frame by frame, and adjudicates the first rule violation
//!   as a forfeit.
//!
//! - **Sync Sessions** - A host-authoritative two-player state machine
//!   over an abstract message channel; the host owns canonical state,
//!   clients propose moves and adopt broadcast snapshots.
//!
//! # Design Principles
//!
//! 1. **One transition function** - Local play, replay, and network play
//!    all route through the same engine; the rules cannot drift apart.
//!
//! 2. **Typed rejections, not failures** - Every foreseeable illegal
//!    input (bad move, bad log, stale request) is a structured result;
//!    nothing rule-related panics or raises past a module boundary.
//!
//! 3. **No networking** - This crate is pure state. The embedding
//!    application owns the channel and shuttles `Message` values.
//!
//! 4. **Serialization-ready** - Wire types derive serde and match the
//!    protocol's kebab-case tags and integer player ids.
//!
//! # Example
//!
//! ```rust
//! use dotbox_state::state::{Direction, Message, Session};
//!
//! // Host side of a network match: 5x5 board, local player 0.
//! let mut host = Session::host(5, 5).unwrap();
//! let outbound = host.channel_open();
//! assert_eq!(outbound[0].kind(), "init");
//!
//! // The host's own moves run the same validation as remote requests.
//! let broadcast = host.propose_move(Direction::Horizontal, 0, 0).unwrap();
//! assert_eq!(broadcast[0].kind(), "move-apply");
//!
//! // Messages serialize to the opaque records the channel carries.
//! let wire = broadcast[0].to_json().unwrap();
//! let echoed = Message::from_json(wire).unwrap();
//! assert_eq!(echoed.kind(), "move-apply");
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
