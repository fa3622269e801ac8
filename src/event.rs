use std::collections::VecDeque;

use crate::frame_info::GameInput;

/// Notifications produced by an [`Endpoint`](crate::network::endpoint::Endpoint) for the session
/// layer to consume. Delivered in emission order with no coalescing or deduplication - producers
/// are responsible for not emitting the same notification twice (see the `connected`,
/// `disconnect_notify_sent` and `disconnect_event_sent` flags on `Endpoint`).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The first `SyncReply` of the handshake arrived. Emitted exactly once.
    Connected,
    /// Handshake progress: `count` of `total` roundtrips completed.
    Synchronizing { total: u32, count: u32 },
    /// The handshake completed and the endpoint transitioned to `Running`. Emitted exactly once.
    Synchronized,
    /// A frame of remote input, decoded and ready for the rollback engine.
    Input(GameInput),
    /// No packet has been received for `disconnect_notify_start` ms. `disconnect_timeout` is the
    /// number of milliseconds remaining before a hard [`Event::Disconnected`] would fire.
    NetworkInterrupted { disconnect_timeout: u32 },
    /// A packet arrived after a previous `NetworkInterrupted`, clearing the warning.
    NetworkResumed,
    /// The peer is considered gone, either by timeout or by its own disconnect request.
    Disconnected,
}

/// Single-consumer FIFO of [`Event`] values.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Pulls the oldest pending event, if any. Mirrors the `poll_event(&out) -> bool` contract.
    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }
}
