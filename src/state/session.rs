//! Sync protocol session state machine.
//!
//! Host-authoritative synchronization of one two-player match over an
//! abstract message channel. The crate owns no sockets: the embedding
//! application establishes an ordered, reliable, bidirectional channel
//! (WebRTC data channel, WebSocket, in-process queue, anything) and
//! shuttles [`Message`] values between it and a [`Session`].
//!
//! # Protocol
//!
//! ```text
//!   client                                host (authoritative)
//!     │ ──────────── hello ────────────────▶ │  record identity
//!     │ ◀──────────── init ───────────────── │  full snapshot, host=player 0
//!     │ ───────── request-move ────────────▶ │  validate turn + target
//!     │ ◀── move-apply (move + snapshot) ─── │  applied: both adopt snapshot
//!     │ ◀── violation (reason + winner) ──── │  rejected: forfeit adjudicated
//!     │ ◀──────────── reset ───────────────▶ │  either side, fresh game
//! ```
//!
//! The host (player 0) owns the canonical [`GameState`]. A client never
//! applies its own move ahead of confirmation: it marks itself pending
//! after `request-move` and accepts only the host's `move-apply` or
//! `violation` as ground truth. The host always ships the full resulting
//! snapshot, so both sides converge without re-deriving history.
//!
//! All transitions happen inside `propose_move`/`handle_message` calls:
//! one serialized mutation path per endpoint, no locks needed.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{BoardError, Direction, Player};
use super::game::{GameState, Move, ViolationReason};

/// Bound on the session event log (oldest entries are dropped).
pub const LOG_CAPACITY: usize = 500;

/// The sync protocol message vocabulary.
///
/// Wire form is a tagged JSON object (`{"type": "request-move", ...}`);
/// exhaustive matching replaces string dispatch on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Message {
    /// Client -> host on channel open: proposed identity.
    Hello {
        from: String,
        requested_player: Player,
    },
    /// Host -> client on channel open: full authoritative snapshot.
    Init {
        state: GameState,
        host_player: Player,
    },
    /// Client -> host: a proposed move.
    RequestMove {
        #[serde(rename = "move")]
        mv: Move,
    },
    /// Host -> client: move accepted; receiver adopts the snapshot
    /// wholesale, never re-deriving locally.
    MoveApply {
        #[serde(rename = "move")]
        mv: Move,
        state: GameState,
    },
    /// Host -> client: move rejected; the offender forfeits.
    Violation {
        #[serde(rename = "move")]
        mv: Move,
        reason: ViolationReason,
        winner: Player,
    },
    /// Either side: reinitialize to a fresh game of the agreed size.
    Reset,
}

impl Message {
    /// The wire tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "hello",
            Self::Init { .. } => "init",
            Self::RequestMove { .. } => "request-move",
            Self::MoveApply { .. } => "move-apply",
            Self::Violation { .. } => "violation",
            Self::Reset => "reset",
        }
    }

    /// Serialize to the opaque structured record the channel carries.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Decode a record delivered by the channel.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Which end of the match this session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Owns the canonical state; assigned player 0.
    Host,
    /// Proposes moves; assigned player 1.
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Client => "client",
        }
    }
}

/// Connection lifecycle of the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    /// Host waiting for an incoming channel.
    Waiting,
    /// Client dialing out.
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// A recorded rule violation, local or adjudicated by the host.
///
/// `winner` is present only for adjudicated forfeits; a local pre-check
/// rejection carries no winner because nothing was forfeited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationNotice {
    pub mv: Move,
    pub reason: ViolationReason,
    pub winner: Option<Player>,
}

/// A timestamped session log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: chrono::DateTime<chrono::Utc>,
    pub text: String,
}

/// Why a local move proposal was refused before reaching the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposeError {
    /// Channel is not open.
    NoConnection,
    /// An earlier request-move is still unanswered.
    RequestPending,
    /// Game finished or forfeited.
    GameOver,
    /// Not the local player's turn.
    NotYourTurn,
    /// Target line fails the local bounds/occupancy pre-check.
    Invalid(ViolationReason),
}

impl fmt::Display for ProposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConnection => write!(f, "No open channel"),
            Self::RequestPending => write!(f, "A move request is already pending"),
            Self::GameOver => write!(f, "Game is over"),
            Self::NotYourTurn => write!(f, "Not your turn"),
            Self::Invalid(reason) => write!(f, "Invalid move: {}", reason),
        }
    }
}

impl std::error::Error for ProposeError {}

/// One endpoint of a synchronized match.
///
/// Pure state: methods consume channel lifecycle events, local move
/// attempts, and inbound messages, and return the outbound messages the
/// caller must put on the channel.
#[derive(Debug, Clone)]
pub struct Session {
    role: Role,
    local_player: Player,
    local_identity: Option<String>,
    status: SessionStatus,
    state: GameState,
    size_x: usize,
    size_y: usize,
    pending: bool,
    remote_identity: Option<String>,
    violation: Option<ViolationNotice>,
    connected_at: Option<chrono::DateTime<chrono::Utc>>,
    log: Vec<LogEntry>,
}

impl Session {
    /// Create the hosting endpoint (player 0). Status starts at
    /// `Waiting`: the host holds until an incoming channel opens.
    pub fn host(size_x: usize, size_y: usize) -> Result<Self, BoardError> {
        Ok(Self {
            role: Role::Host,
            local_player: Player::Zero,
            local_identity: None,
            status: SessionStatus::Waiting,
            state: GameState::new(size_x, size_y)?,
            size_x,
            size_y,
            pending: false,
            remote_identity: None,
            violation: None,
            connected_at: None,
            log: Vec::new(),
        })
    }

    /// Create the joining endpoint (player 1). `identity` is sent in the
    /// `hello` once the channel opens.
    pub fn client(
        size_x: usize,
        size_y: usize,
        identity: impl Into<String>,
    ) -> Result<Self, BoardError> {
        Ok(Self {
            role: Role::Client,
            local_player: Player::One,
            local_identity: Some(identity.into()),
            status: SessionStatus::Connecting,
            state: GameState::new(size_x, size_y)?,
            size_x,
            size_y,
            pending: false,
            remote_identity: None,
            violation: None,
            connected_at: None,
            log: Vec::new(),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn local_player(&self) -> Player {
        self.local_player
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The local copy of the game (authoritative when hosting).
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Whether a request-move is awaiting the host's answer.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn violation(&self) -> Option<&ViolationNotice> {
        self.violation.as_ref()
    }

    /// Whether the match ended in an adjudicated forfeit.
    pub fn is_forfeited(&self) -> bool {
        self.violation.as_ref().is_some_and(|v| v.winner.is_some())
    }

    pub fn remote_identity(&self) -> Option<&str> {
        self.remote_identity.as_deref()
    }

    pub fn connected_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.connected_at
    }

    /// The bounded session event log, oldest first.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Whether a local move attempt would currently be forwarded.
    pub fn can_play(&self) -> bool {
        self.status.is_connected()
            && !self.pending
            && !self.state.is_finished()
            && !self.is_forfeited()
            && self.state.current_player() == self.local_player
    }

    /// The channel reported open. Host sends its authoritative snapshot;
    /// client introduces itself.
    pub fn channel_open(&mut self) -> Vec<Message> {
        self.status = SessionStatus::Connected;
        self.connected_at = Some(chrono::Utc::now());
        self.record(format!("[{}] channel open", self.role.as_str()));

        match self.role {
            Role::Host => self.send(Message::Init {
                state: self.state.clone(),
                host_player: Player::Zero,
            }),
            Role::Client => {
                let from = self.local_identity.clone().unwrap_or_default();
                self.send(Message::Hello {
                    from,
                    requested_player: Player::One,
                })
            }
        }
    }

    /// The channel closed. Local game state is untouched; further
    /// proposals are refused with `NoConnection`.
    pub fn channel_closed(&mut self) {
        self.status = SessionStatus::Disconnected;
        self.record(format!("[{}] channel closed", self.role.as_str()));
    }

    /// The channel reported a fault. Never panics; status only.
    pub fn channel_error(&mut self) {
        self.status = SessionStatus::Error;
        self.record(format!("[{}] channel error", self.role.as_str()));
    }

    /// Attempt a move by the local player.
    ///
    /// The host validates against its own authoritative state, applies,
    /// and broadcasts `move-apply`, with the same turn and occupancy
    /// checks a remote proposal gets. A client pre-checks
    /// locally (short-circuiting obviously bad requests), then marks
    /// itself pending and emits `request-move`.
    pub fn propose_move(
        &mut self,
        dir: Direction,
        x: i64,
        y: i64,
    ) -> Result<Vec<Message>, ProposeError> {
        if !self.status.is_connected() {
            self.record(format!("move ignored: {}", self.status.as_str()));
            return Err(ProposeError::NoConnection);
        }
        if self.pending {
            self.record("move ignored: request pending");
            return Err(ProposeError::RequestPending);
        }
        if self.state.is_finished() || self.is_forfeited() {
            self.record("move ignored: game over");
            return Err(ProposeError::GameOver);
        }
        if self.state.current_player() != self.local_player {
            self.record("move ignored: not local turn");
            return Err(ProposeError::NotYourTurn);
        }

        let mv = Move {
            player: self.local_player,
            x,
            y,
            dir,
        };

        match self.role {
            Role::Host => match self.state.apply(&mv) {
                Ok(next) => {
                    self.state = next;
                    self.record(format!("applied local {}", mv));
                    Ok(self.send(Message::MoveApply {
                        mv,
                        state: self.state.clone(),
                    }))
                }
                Err(reason) => {
                    self.violation = Some(ViolationNotice {
                        mv,
                        reason: ViolationReason::LocalInvalid,
                        winner: None,
                    });
                    self.record(format!("local {} rejected: {}", mv, reason));
                    Err(ProposeError::Invalid(reason))
                }
            },
            Role::Client => {
                if let Err(reason) = self.state.check_move(&mv) {
                    self.violation = Some(ViolationNotice {
                        mv,
                        reason: ViolationReason::LocalInvalid,
                        winner: None,
                    });
                    self.record(format!("local {} rejected: {}", mv, reason));
                    return Err(ProposeError::Invalid(reason));
                }
                self.pending = true;
                Ok(self.send(Message::RequestMove { mv }))
            }
        }
    }

    /// Process one inbound message and return any replies.
    ///
    /// Read-decide-write happens entirely within this call; interleave it
    /// with `propose_move` on one thread of control and no lost-update
    /// race is possible.
    pub fn handle_message(&mut self, msg: Message) -> Vec<Message> {
        self.record(format!("IN {}", msg.kind()));
        match msg {
            Message::Hello { from, .. } => {
                if self.role == Role::Host {
                    self.record(format!("peer identified as {}", from));
                    self.remote_identity = Some(from);
                } else {
                    self.record("ignored hello: not hosting");
                }
                Vec::new()
            }

            Message::Init { state, .. } => {
                if self.role == Role::Host {
                    self.record("ignored init: hosting");
                    return Vec::new();
                }
                if self.adopt_snapshot(state) {
                    // A reconnect invalidates any request that was in
                    // flight when the channel dropped.
                    self.pending = false;
                }
                Vec::new()
            }

            Message::RequestMove { mv } => {
                if self.role != Role::Host {
                    self.record("ignored request-move: not hosting");
                    return Vec::new();
                }
                self.host_adjudicate(mv)
            }

            Message::MoveApply { mv, state } => {
                if self.role == Role::Host {
                    self.record("ignored move-apply: hosting");
                    return Vec::new();
                }
                self.record(format!("peer applied {}", mv));
                if self.adopt_snapshot(state) {
                    self.pending = false;
                }
                Vec::new()
            }

            Message::Violation { mv, reason, winner } => {
                if self.role == Role::Host {
                    self.record("ignored violation: hosting");
                    return Vec::new();
                }
                self.record(format!("violation on {}: {} (winner {})", mv, reason, winner));
                self.violation = Some(ViolationNotice {
                    mv,
                    reason,
                    winner: Some(winner),
                });
                self.pending = false;
                Vec::new()
            }

            Message::Reset => {
                self.reset_local();
                self.record("reset by peer");
                Vec::new()
            }
        }
    }

    /// Start a fresh game locally and tell the peer to do the same.
    pub fn reset(&mut self) -> Vec<Message> {
        self.reset_local();
        self.record("reset requested locally");
        self.send(Message::Reset)
    }

    /// Host-side adjudication of a remote proposal: turn first, then the
    /// target, then apply-and-broadcast. A stale request (line claimed
    /// since the client looked) is a violation, never a fault.
    fn host_adjudicate(&mut self, mv: Move) -> Vec<Message> {
        if mv.player != self.state.current_player() {
            let winner = mv.player.other();
            self.record(format!("rejected {}: not-your-turn", mv));
            self.violation = Some(ViolationNotice {
                mv,
                reason: ViolationReason::NotYourTurn,
                winner: Some(winner),
            });
            return self.send(Message::Violation {
                mv,
                reason: ViolationReason::NotYourTurn,
                winner,
            });
        }

        match self.state.apply(&mv) {
            Ok(next) => {
                self.state = next;
                self.record(format!("applied remote {}", mv));
                self.send(Message::MoveApply {
                    mv,
                    state: self.state.clone(),
                })
            }
            Err(reason) => {
                let winner = mv.player.other();
                self.record(format!("rejected {}: {}", mv, reason));
                self.violation = Some(ViolationNotice {
                    mv,
                    reason: ViolationReason::InvalidMove,
                    winner: Some(winner),
                });
                self.send(Message::Violation {
                    mv,
                    reason: ViolationReason::InvalidMove,
                    winner,
                })
            }
        }
    }

    /// Replace local state with a peer snapshot, after vetting its shape.
    /// A malformed snapshot is refused (local state and renderer stay
    /// intact) and downgrades the session to `Error`. Returns whether the
    /// snapshot was adopted.
    fn adopt_snapshot(&mut self, state: GameState) -> bool {
        match state.check_snapshot() {
            Ok(()) => {
                self.size_x = state.board().size_x();
                self.size_y = state.board().size_y();
                self.state = state;
                self.record("adopted peer snapshot");
                true
            }
            Err(err) => {
                self.record(format!("refused peer snapshot: {}", err));
                self.status = SessionStatus::Error;
                false
            }
        }
    }

    fn reset_local(&mut self) {
        if let Ok(fresh) = GameState::new(self.size_x, self.size_y) {
            self.state = fresh;
        }
        self.violation = None;
        self.pending = false;
    }

    /// Log an outbound message and hand it to the caller for the channel.
    fn send(&mut self, msg: Message) -> Vec<Message> {
        self.record(format!("OUT {}", msg.kind()));
        vec![msg]
    }

    fn record(&mut self, text: impl Into<String>) {
        if self.log.len() >= LOG_CAPACITY {
            self.log.remove(0);
        }
        self.log.push(LogEntry {
            at: chrono::Utc::now(),
            text: text.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A connected host/client pair with the init snapshot delivered.
    fn connected_pair() -> (Session, Session) {
        let mut host = Session::host(2, 2).unwrap();
        let mut client = Session::client(2, 2, "haic-000001").unwrap();

        let hello = client.channel_open();
        let init = host.channel_open();

        for msg in hello {
            assert!(host.handle_message(msg).is_empty());
        }
        for msg in init {
            assert!(client.handle_message(msg).is_empty());
        }

        (host, client)
    }

    /// Pump a message batch from one endpoint into the other, returning
    /// the replies.
    fn deliver(to: &mut Session, batch: Vec<Message>) -> Vec<Message> {
        let mut replies = Vec::new();
        for msg in batch {
            replies.extend(to.handle_message(msg));
        }
        replies
    }

    #[test]
    fn test_handshake() {
        let (host, client) = connected_pair();

        assert!(host.status().is_connected());
        assert!(client.status().is_connected());
        assert_eq!(host.local_player(), Player::Zero);
        assert_eq!(client.local_player(), Player::One);
        assert_eq!(host.remote_identity(), Some("haic-000001"));
        assert_eq!(client.state(), host.state());
        assert!(host.connected_at().is_some());
    }

    #[test]
    fn test_host_move_broadcasts_snapshot() {
        let (mut host, mut client) = connected_pair();
        assert!(host.can_play());
        assert!(!client.can_play()); // player 0 to move

        let out = host.propose_move(Direction::Horizontal, 0, 0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind(), "move-apply");

        deliver(&mut client, out);
        assert_eq!(client.state(), host.state());
        assert_eq!(client.state().current_player(), Player::One);
        assert!(client.can_play());
    }

    #[test]
    fn test_client_round_trip() {
        let (mut host, mut client) = connected_pair();
        let out = host.propose_move(Direction::Horizontal, 0, 0).unwrap();
        deliver(&mut client, out);

        // Client's turn: request goes up, apply comes back.
        let request = client.propose_move(Direction::Vertical, 0, 0).unwrap();
        assert_eq!(request[0].kind(), "request-move");
        assert!(client.is_pending());
        assert!(!client.can_play());
        // The proposal is not applied locally ahead of confirmation.
        assert!(!client.state().board().is_line_claimed(Direction::Vertical, 0, 0));

        let replies = deliver(&mut host, request);
        assert_eq!(replies[0].kind(), "move-apply");
        deliver(&mut client, replies);

        assert!(!client.is_pending());
        assert_eq!(client.state(), host.state());
        assert!(client.state().board().is_line_claimed(Direction::Vertical, 0, 0));
    }

    #[test]
    fn test_pending_blocks_second_request() {
        let (mut host, mut client) = connected_pair();
        deliver(&mut client, host.propose_move(Direction::Horizontal, 0, 0).unwrap());

        client.propose_move(Direction::Vertical, 0, 0).unwrap();
        assert_eq!(
            client.propose_move(Direction::Vertical, 1, 0),
            Err(ProposeError::RequestPending)
        );
    }

    #[test]
    fn test_wrong_turn_request_adjudicated() {
        let (mut host, mut client) = connected_pair();

        // Forge an out-of-turn request (a well-behaved client would have
        // gated it locally).
        let mv = Move {
            player: Player::One,
            x: 0,
            y: 0,
            dir: Direction::Horizontal,
        };
        let replies = host.handle_message(Message::RequestMove { mv });
        assert_eq!(
            replies,
            vec![Message::Violation {
                mv,
                reason: ViolationReason::NotYourTurn,
                winner: Player::Zero,
            }]
        );
        assert!(host.is_forfeited());

        client.pending = true;
        deliver(&mut client, replies);
        assert!(!client.is_pending());
        assert!(client.is_forfeited());
        let notice = client.violation().unwrap();
        assert_eq!(notice.reason, ViolationReason::NotYourTurn);
        assert_eq!(notice.winner, Some(Player::Zero));
    }

    #[test]
    fn test_raced_request_on_claimed_line() {
        let (mut host, mut client) = connected_pair();

        // Host claims h(0,0); the client requests the same line before
        // seeing the move-apply.
        let apply = host.propose_move(Direction::Horizontal, 0, 0).unwrap();
        let stale = Move {
            player: Player::One,
            x: 0,
            y: 0,
            dir: Direction::Horizontal,
        };
        client.pending = true;
        let replies = host.handle_message(Message::RequestMove { mv: stale });
        assert_eq!(replies[0].kind(), "violation");
        match &replies[0] {
            Message::Violation { reason, winner, .. } => {
                assert_eq!(*reason, ViolationReason::InvalidMove);
                assert_eq!(*winner, Player::Zero);
            }
            other => panic!("unexpected reply {:?}", other),
        }

        deliver(&mut client, apply);
        deliver(&mut client, replies);
        assert!(!client.is_pending());
        assert!(client.is_forfeited());
    }

    #[test]
    fn test_no_connection_gating() {
        let mut client = Session::client(2, 2, "haic-000002").unwrap();
        assert_eq!(
            client.propose_move(Direction::Horizontal, 0, 0),
            Err(ProposeError::NoConnection)
        );

        client.channel_open();
        client.channel_closed();
        assert_eq!(client.status(), SessionStatus::Disconnected);
        assert_eq!(
            client.propose_move(Direction::Horizontal, 0, 0),
            Err(ProposeError::NoConnection)
        );
    }

    #[test]
    fn test_client_precheck_short_circuits() {
        let (mut host, mut client) = connected_pair();
        // Give the client the turn by adopting a host move first.
        deliver(&mut client, host.propose_move(Direction::Horizontal, 0, 0).unwrap());

        // Out of bounds: rejected locally, nothing sent, not pending.
        let result = client.propose_move(Direction::Horizontal, 9, 0);
        assert_eq!(result, Err(ProposeError::Invalid(ViolationReason::OutOfBounds)));
        assert!(!client.is_pending());
        let notice = client.violation().unwrap();
        assert_eq!(notice.reason, ViolationReason::LocalInvalid);
        assert_eq!(notice.winner, None);
        assert!(!client.is_forfeited());
    }

    #[test]
    fn test_host_validates_its_own_moves() {
        let (mut host, _client) = connected_pair();

        // Host moves once, turn passes to the client; a second local
        // attempt must fail the same turn check a remote request gets.
        host.propose_move(Direction::Horizontal, 0, 0).unwrap();
        assert_eq!(
            host.propose_move(Direction::Horizontal, 1, 0),
            Err(ProposeError::NotYourTurn)
        );
    }

    #[test]
    fn test_reset_round_trip() {
        let (mut host, mut client) = connected_pair();
        deliver(&mut client, host.propose_move(Direction::Horizontal, 0, 0).unwrap());

        let out = client.reset();
        assert_eq!(out, vec![Message::Reset]);
        assert_eq!(client.state().scores(), [0, 0]);
        assert!(!client.state().board().is_line_claimed(Direction::Horizontal, 0, 0));

        deliver(&mut host, out);
        assert_eq!(host.state(), client.state());
        assert!(host.violation().is_none());
    }

    #[test]
    fn test_malformed_snapshot_refused() {
        let (mut host, mut client) = connected_pair();
        let out = host.propose_move(Direction::Horizontal, 0, 0).unwrap();

        // Corrupt the snapshot in flight.
        let tampered = match out.into_iter().next().unwrap() {
            Message::MoveApply { mv, state } => {
                let mut json = serde_json::to_value(&state).unwrap();
                json["scores"] = serde_json::json!([9, 9]);
                Message::MoveApply {
                    mv,
                    state: serde_json::from_value(json).unwrap(),
                }
            }
            other => panic!("unexpected message {:?}", other),
        };

        let before = client.state().clone();
        client.handle_message(tampered);
        assert_eq!(client.state(), &before);
        assert_eq!(client.status(), SessionStatus::Error);
    }

    #[test]
    fn test_client_ignores_request_move() {
        let (_, mut client) = connected_pair();
        let mv = Move {
            player: Player::Zero,
            x: 0,
            y: 0,
            dir: Direction::Horizontal,
        };
        assert!(client.handle_message(Message::RequestMove { mv }).is_empty());
        assert!(!client.state().board().is_line_claimed(Direction::Horizontal, 0, 0));
    }

    #[test]
    fn test_host_ignores_move_apply() {
        let (mut host, _) = connected_pair();

        // A well-formed snapshot that diverges from the host's state.
        let forged = host.state().play(Direction::Horizontal, 0, 0).unwrap();
        let mv = Move {
            player: Player::Zero,
            x: 0,
            y: 0,
            dir: Direction::Horizontal,
        };

        let before = host.state().clone();
        assert!(host
            .handle_message(Message::MoveApply { mv, state: forged })
            .is_empty());
        assert_eq!(host.state(), &before);
    }

    #[test]
    fn test_host_ignores_violation() {
        let (mut host, _) = connected_pair();
        let mv = Move {
            player: Player::Zero,
            x: 0,
            y: 0,
            dir: Direction::Horizontal,
        };

        assert!(host
            .handle_message(Message::Violation {
                mv,
                reason: ViolationReason::NotYourTurn,
                winner: Player::One,
            })
            .is_empty());
        assert!(host.violation().is_none());
        assert!(!host.is_forfeited());
    }

    #[test]
    fn test_reconnect_clears_stale_pending() {
        let (mut host, mut client) = connected_pair();

        // The request is lost in flight; the channel then drops.
        let _lost = client.propose_move(Direction::Vertical, 0, 0).unwrap();
        assert!(client.is_pending());
        host.channel_closed();
        client.channel_closed();

        let init = host.channel_open();
        client.channel_open();
        deliver(&mut client, init);

        assert!(!client.is_pending());
        let out = client.propose_move(Direction::Vertical, 0, 0);
        assert!(matches!(out, Err(ProposeError::NotYourTurn)));
    }

    #[test]
    fn test_log_is_bounded() {
        let mut host = Session::host(1, 1).unwrap();
        for _ in 0..(LOG_CAPACITY + 50) {
            host.channel_error();
        }
        assert_eq!(host.log().len(), LOG_CAPACITY);
    }

    #[test]
    fn test_message_wire_format() {
        let mv = Move {
            player: Player::One,
            x: 2,
            y: 0,
            dir: Direction::Vertical,
        };
        let json = Message::RequestMove { mv }.to_json().unwrap();
        assert_eq!(json["type"], "request-move");
        assert_eq!(json["move"]["player"], 1);
        assert_eq!(json["move"]["dir"], "v");

        let decoded = Message::from_json(json).unwrap();
        assert_eq!(decoded, Message::RequestMove { mv });

        let reset = Message::Reset.to_json().unwrap();
        assert_eq!(reset["type"], "reset");
    }

    #[test]
    fn test_violation_wire_reason_tags() {
        let mv = Move {
            player: Player::One,
            x: 0,
            y: 0,
            dir: Direction::Horizontal,
        };
        let json = Message::Violation {
            mv,
            reason: ViolationReason::NotYourTurn,
            winner: Player::Zero,
        }
        .to_json()
        .unwrap();
        assert_eq!(json["reason"], "not-your-turn");
        assert_eq!(json["winner"], 0);
    }
}
