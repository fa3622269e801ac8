//! Per-peer endpoint protocol for a rollback-networking game session: the state machine,
//! timers, delta-compressed input codec, and quality/timing feedback loop that keep two peers
//! synchronized across a best-effort, reliable-ordered transport.
//!
//! One [`Endpoint`](network::endpoint::Endpoint) per remote peer. Multiplexing many endpoints
//! into a single game session, resimulating on late input, and the outer poll loop are all a
//! host concern - this crate owns the wire protocol between exactly two peers.

#![forbid(unsafe_code)]

pub use clock::Clock;
pub use error::EndpointError;
pub use event::Event;
pub use frame_info::{GameInput, InputBuffer};
pub use network::endpoint::Endpoint;
pub use network::message::{ConnectionStatus, Message, MessageHeader};
pub use network::network_stats::NetworkStats;
pub use network::pipeline::{ShakeoutConfig, Transport};
pub use rng::Rng;
pub use time_sync::{TimeSync, TimeSyncAdvisor};

pub(crate) mod clock;
pub(crate) mod error;
pub(crate) mod event;
pub(crate) mod frame_info;
pub(crate) mod network;
pub(crate) mod rng;
pub(crate) mod time_sync;

// #############
// # CONSTANTS #
// #############

/// Internally, -1 represents no frame / invalid frame.
pub const NULL_FRAME: Frame = -1;

/// The maximum number of player slots gossiped in `peer_connect_status`.
pub const MAX_PLAYERS: usize = 4;

/// The maximum number of bytes a single player's input can consist of.
pub const MAX_INPUT_BYTES: usize = 8;

pub type Frame = i32;
