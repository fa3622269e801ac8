use std::collections::VecDeque;

use crate::network::message::Message;
use crate::rng::Rng;

/// Consumes framed [`Message`] values addressed to a single peer. Implementations typically wrap
/// a socket or an overlay transport handle; `send_to` is best-effort, matching the "reliable
/// enough, but don't block the endpoint on it" contract the send pipeline assumes.
pub trait Transport<P> {
    fn send_to(&mut self, msg: &Message, peer: &P);
}

/// Shakeout-testing knobs, loaded once at construction (spec calls these `network.delay` and
/// `oop.percent`). Left at their defaults, the pipeline behaves like a plain FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShakeoutConfig {
    /// Average artificial one-way latency, in milliseconds. `0` disables jitter entirely.
    pub send_latency_ms: u32,
    /// Chance, in percent, that a ready-to-send message is diverted into the single-slot
    /// out-of-order buffer instead of being handed to the transport immediately.
    pub oop_percent: u8,
}

impl Default for ShakeoutConfig {
    fn default() -> Self {
        Self {
            send_latency_ms: 0,
            oop_percent: 0,
        }
    }
}

struct QueueEntry {
    msg: Message,
    release_at: u32,
}

/// Outbound message queue for one peer, with optional artificial latency and out-of-order
/// injection ahead of the transport. Messages are released in enqueue order except for at most
/// one message diverted into `oo_slot`, which can be released out of turn.
pub(crate) struct SendPipeline {
    config: ShakeoutConfig,
    queue: VecDeque<QueueEntry>,
    oo_slot: Option<QueueEntry>,
}

impl SendPipeline {
    pub(crate) fn new(config: ShakeoutConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            oo_slot: None,
        }
    }

    /// Stamps the enqueue time and, if `send_latency_ms > 0`, precomputes the jitter this
    /// message will wait out before it becomes eligible for release. The jitter is rolled once,
    /// at enqueue time, so the head of the queue has a stable release time to block on.
    pub(crate) fn enqueue(&mut self, msg: Message, now: u32, rng: &mut impl Rng) {
        let release_at = now + self.jitter(rng);
        self.queue.push_back(QueueEntry { msg, release_at });
    }

    fn jitter(&self, rng: &mut impl Rng) -> u32 {
        if self.config.send_latency_ms == 0 {
            return 0;
        }
        let base = (2 * self.config.send_latency_ms) / 3;
        let span = self.config.send_latency_ms / 3;
        base + rng.gen_range_u32(0, span.max(1))
    }

    /// Releases every message whose jitter has elapsed to `transport`, diverting at most one of
    /// them into the out-of-order slot along the way, then flushes the slot if its own release
    /// time has come. The queue's FIFO order blocks on the head: a still-held head message
    /// delays everything behind it, matching a single reliable-ordered connection.
    pub(crate) fn drain<P>(
        &mut self,
        now: u32,
        peer: &P,
        rng: &mut impl Rng,
        transport: &mut impl Transport<P>,
    ) {
        while let Some(entry) = self.queue.front() {
            if now < entry.release_at {
                break;
            }
            let entry = self.queue.pop_front().expect("front() just returned Some");
            let divert = self.oo_slot.is_none()
                && self.config.oop_percent > 0
                && rng.gen_range_u32(0, 100) < self.config.oop_percent as u32;
            if divert {
                let hold_span = 10 * self.config.send_latency_ms + 1000;
                let release_at = now + rng.gen_range_u32(0, hold_span + 1);
                self.oo_slot = Some(QueueEntry {
                    msg: entry.msg,
                    release_at,
                });
            } else {
                transport.send_to(&entry.msg, peer);
            }
        }

        if let Some(entry) = &self.oo_slot {
            if now >= entry.release_at {
                let entry = self.oo_slot.take().expect("checked Some above");
                transport.send_to(&entry.msg, peer);
            }
        }
    }

    /// Drops every queued and held message without sending. Called once the endpoint becomes
    /// inert after its shutdown timer elapses.
    pub(crate) fn shutdown(&mut self) {
        self.queue.clear();
        self.oo_slot = None;
    }
}
