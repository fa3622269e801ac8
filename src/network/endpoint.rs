use std::collections::VecDeque;

use crate::clock::Clock;
use crate::error::EndpointError;
use crate::event::{Event, EventQueue};
use crate::frame_info::GameInput;
use crate::network::codec;
use crate::network::message::{
    ConnectionStatus, Input, InputAck, Message, MessageBody, MessageHeader, QualityReply,
    QualityReport, SyncReply, SyncRequest,
};
use crate::network::pipeline::{SendPipeline, ShakeoutConfig, Transport};
use crate::rng::{self, Rng};
use crate::time_sync::{TimeSync, TimeSyncAdvisor};
use crate::{Frame, MAX_PLAYERS, NULL_FRAME};

const NUM_SYNC_PACKETS: u32 = 5;
const SYNC_FIRST_RETRY_INTERVAL: u32 = 500;
const SYNC_RETRY_INTERVAL: u32 = 2000;
const RUNNING_RETRY_INTERVAL: u32 = 200;
const KEEP_ALIVE_INTERVAL: u32 = 200;
const QUALITY_REPORT_INTERVAL: u32 = 1000;
const NETWORK_STATS_INTERVAL: u32 = 1000;
const STEAM_SHUTDOWN_TIMER: u32 = 5000;
const MAX_SEQ_DISTANCE: u32 = 1 << 15;
const STEAM_HEADER_SIZE: usize = 28;
const ASSUMED_FPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Constructed, possibly `Init`'d, but `Synchronize` has not been called yet.
    PreInit,
    Syncing,
    Running,
    Disconnected,
}

/// Per-peer endpoint protocol: handshake, sequence filtering, delta-compressed input streaming,
/// keep-alives, RTT/frame-advantage measurement and disconnect detection for exactly one remote
/// peer. `P` is the transport's notion of peer identity (e.g. a friend ID or socket address),
/// `C` the injected millisecond clock and `R` the injected RNG.
pub struct Endpoint<P, C: Clock, R: Rng> {
    clock: C,
    rng: R,
    time_sync: Box<dyn TimeSyncAdvisor + Send>,

    peer_identity: Option<P>,
    queue_id: usize,

    phase: Phase,
    magic_number: u16,
    remote_magic_number: u16,
    next_send_seq: u16,
    next_recv_seq: u16,

    last_send_time: u32,
    last_recv_time: u32,
    stats_start_time: u32,
    last_input_packet_recv_time: u32,
    last_quality_report_time: u32,
    last_network_stats_interval: u32,
    shutdown_timeout: u32,

    roundtrips_remaining: u32,
    random: u32,

    packets_sent: usize,
    bytes_sent: usize,
    kbps_sent: usize,
    round_trip_time: u32,
    local_frame_advantage: i32,
    remote_frame_advantage: i32,

    connected: bool,
    disconnect_notify_sent: bool,
    disconnect_event_sent: bool,

    disconnect_timeout: u32,
    disconnect_notify_start: u32,

    input_size: usize,
    pending_output: VecDeque<GameInput>,
    last_received_input: GameInput,
    last_acked_input: GameInput,

    /// What this endpoint currently believes about every player slot, merged in from the
    /// remote's gossip on every `Input` message. Distinct from the host-owned
    /// `local_connect_status` array passed transiently into `queue_input`/`on_poll` to be
    /// gossiped *outward* - the two are never the same array.
    peer_connect_status: [ConnectionStatus; MAX_PLAYERS],

    events: EventQueue,
    pipeline: SendPipeline,
}

impl<P, C, R> Endpoint<P, C, R>
where
    P: Clone + PartialEq,
    C: Clock,
    R: Rng,
{
    /// Constructs an unbound, un-synchronized endpoint. Call [`Endpoint::init`] to bind it to a
    /// peer identity, then [`Endpoint::synchronize`] to start the handshake.
    pub fn new(mut clock: C, mut rng: R, input_size: usize, shakeout: ShakeoutConfig) -> Self {
        assert!(input_size > 0 && input_size <= crate::MAX_INPUT_BYTES);
        let magic_number = rng::fresh_magic(&mut rng);
        let now = clock.now_ms();
        Self {
            clock,
            rng,
            time_sync: Box::new(TimeSync::new()),

            peer_identity: None,
            queue_id: 0,

            phase: Phase::PreInit,
            magic_number,
            remote_magic_number: 0,
            next_send_seq: 0,
            next_recv_seq: 0,

            last_send_time: 0,
            last_recv_time: now,
            stats_start_time: 0,
            last_input_packet_recv_time: 0,
            last_quality_report_time: 0,
            last_network_stats_interval: 0,
            shutdown_timeout: 0,

            roundtrips_remaining: NUM_SYNC_PACKETS,
            random: 0,

            packets_sent: 0,
            bytes_sent: 0,
            kbps_sent: 0,
            round_trip_time: 0,
            local_frame_advantage: 0,
            remote_frame_advantage: 0,

            connected: false,
            disconnect_notify_sent: false,
            disconnect_event_sent: false,

            disconnect_timeout: 0,
            disconnect_notify_start: 0,

            input_size,
            pending_output: VecDeque::new(),
            last_received_input: GameInput::blank(input_size),
            last_acked_input: GameInput::blank(input_size),

            peer_connect_status: [ConnectionStatus::default(); MAX_PLAYERS],

            events: EventQueue::new(),
            pipeline: SendPipeline::new(shakeout),
        }
    }

    /// Swaps in a custom time-sync heuristic in place of the bundled [`TimeSync`] reference
    /// implementation.
    pub fn with_time_sync_advisor(mut self, advisor: Box<dyn TimeSyncAdvisor + Send>) -> Self {
        self.time_sync = advisor;
        self
    }

    pub fn set_disconnect_timeout(&mut self, timeout_ms: u32) {
        self.disconnect_timeout = timeout_ms;
    }

    pub fn set_disconnect_notify_start(&mut self, notify_start_ms: u32) {
        self.disconnect_notify_start = notify_start_ms;
    }

    pub const fn queue_id(&self) -> usize {
        self.queue_id
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running)
    }

    pub const fn is_disconnected(&self) -> bool {
        matches!(self.phase, Phase::Disconnected)
    }

    /// Whether this endpoint is still bound to a peer identity. Once a disconnected endpoint's
    /// shutdown timer elapses, it is cleared and the endpoint becomes permanently inert.
    pub const fn is_bound(&self) -> bool {
        self.peer_identity.is_some()
    }

    /// Matches the transport-demux contract: this endpoint handles a datagram iff it is bound to
    /// `sender`, and `sender` is not `local` (a peer never handles its own broadcast).
    pub fn handles_msg(&self, sender: &P, local: &P) -> bool {
        match &self.peer_identity {
            Some(peer) => sender == peer && sender != local,
            None => false,
        }
    }

    /// Binds the endpoint to a peer identity. `queue_id` is an opaque host-assigned id used only
    /// for the host's own bookkeeping (e.g. correlating this endpoint with its tick-driver slot).
    pub fn init(&mut self, peer_identity: P, queue_id: usize) {
        self.peer_identity = Some(peer_identity);
        self.queue_id = queue_id;
    }

    /// Starts the handshake: resets the sync roundtrip counter and sends the first
    /// `SyncRequest`. Requires the endpoint to have been [`Endpoint::init`]'d first.
    pub fn synchronize(&mut self) -> Result<(), EndpointError> {
        let peer = self
            .peer_identity
            .clone()
            .ok_or(EndpointError::NotInitialized)?;
        let now = self.clock.now_ms();
        self.phase = Phase::Syncing;
        self.roundtrips_remaining = NUM_SYNC_PACKETS;
        self.stats_start_time = now;
        self.send_sync_request(now);
        Ok(())
    }

    /// Enters `Disconnected` and arms the shutdown timer. Idempotent - calling this on an
    /// already-disconnected (but not yet shut down) endpoint does nothing.
    pub fn disconnect(&mut self) {
        if self.phase == Phase::Disconnected {
            return;
        }
        let now = self.clock.now_ms();
        self.phase = Phase::Disconnected;
        self.shutdown_timeout = now + STEAM_SHUTDOWN_TIMER;
        tracing::debug!(queue_id = self.queue_id, "endpoint disconnecting");
    }

    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.poll_event()
    }

    /// Queues a local input frame for transmission and immediately (re)sends the whole pending
    /// tail. A no-op while not `Running`.
    pub fn queue_input(&mut self, input: GameInput, local_connect_status: &[ConnectionStatus; MAX_PLAYERS]) {
        if self.phase != Phase::Running {
            return;
        }
        if self.peer_identity.is_none() {
            return;
        }
        self.time_sync
            .advance_frame(input.frame, self.local_frame_advantage, self.remote_frame_advantage);
        self.pending_output.push_back(input);
        let now = self.clock.now_ms();
        self.send_pending_output(now, local_connect_status);
    }

    /// Records one local-frame sample and updates `local_frame_advantage` (positive: we believe
    /// we are ahead of the remote).
    pub fn set_local_frame_number(&mut self, local_frame: Frame) {
        if local_frame == NULL_FRAME || self.last_received_input.frame == NULL_FRAME {
            return;
        }
        let remote_frame = self.last_received_input.frame
            + (self.round_trip_time as i64 * ASSUMED_FPS as i64 / 1000) as i32;
        self.local_frame_advantage = remote_frame - local_frame;
    }

    pub fn recommend_frame_delay(&self) -> i32 {
        self.time_sync.recommend_frame_wait_duration(false)
    }

    pub fn network_stats(&self) -> crate::NetworkStats {
        crate::NetworkStats {
            ping: self.round_trip_time,
            send_queue_len: self.pending_output.len(),
            kbps_sent: self.kbps_sent,
            remote_frames_behind: self.remote_frame_advantage,
            local_frames_behind: self.local_frame_advantage,
        }
    }

    pub fn peer_connect_status(&self) -> &[ConnectionStatus; MAX_PLAYERS] {
        &self.peer_connect_status
    }

    /// Drives the timers: retransmits, keep-alive, quality/stats sampling and disconnect
    /// detection. Intended cadence is every few milliseconds - fine enough to honor
    /// `KEEP_ALIVE_INTERVAL` (200ms) with margin. A no-op once the endpoint is unbound.
    pub fn on_poll(
        &mut self,
        local_connect_status: &[ConnectionStatus; MAX_PLAYERS],
        transport: &mut impl Transport<P>,
    ) {
        let Some(peer) = self.peer_identity.clone() else {
            return;
        };
        let now = self.clock.now_ms();

        match self.phase {
            Phase::PreInit => {}
            Phase::Syncing => {
                let next_interval = if self.roundtrips_remaining == NUM_SYNC_PACKETS {
                    SYNC_FIRST_RETRY_INTERVAL
                } else {
                    SYNC_RETRY_INTERVAL
                };
                if self.last_send_time > 0 && self.last_send_time + next_interval < now {
                    self.send_sync_request(now);
                }
            }
            Phase::Running => {
                if self.last_input_packet_recv_time == 0
                    || self.last_input_packet_recv_time + RUNNING_RETRY_INTERVAL < now
                {
                    self.send_pending_output(now, local_connect_status);
                    self.last_input_packet_recv_time = now;
                }

                if self.last_quality_report_time == 0
                    || self.last_quality_report_time + QUALITY_REPORT_INTERVAL < now
                {
                    self.last_quality_report_time = now;
                    let body = QualityReport {
                        ping_timestamp: now,
                        frame_advantage: self.local_frame_advantage,
                    };
                    self.queue_message(MessageBody::QualityReport(body), now);
                }

                if self.last_network_stats_interval == 0
                    || self.last_network_stats_interval + NETWORK_STATS_INTERVAL < now
                {
                    self.last_network_stats_interval = now;
                    self.recompute_stats(now);
                }

                if self.last_send_time + KEEP_ALIVE_INTERVAL < now {
                    self.queue_message(MessageBody::KeepAlive, now);
                }

                if self.disconnect_timeout > 0
                    && self.disconnect_notify_start > 0
                    && !self.disconnect_notify_sent
                    && self.last_recv_time + self.disconnect_notify_start < now
                {
                    self.disconnect_notify_sent = true;
                    self.events.push(Event::NetworkInterrupted {
                        disconnect_timeout: self.disconnect_timeout - self.disconnect_notify_start,
                    });
                    tracing::warn!(queue_id = self.queue_id, "no packets received, network interrupted");
                }

                if self.disconnect_timeout > 0
                    && self.last_recv_time + self.disconnect_timeout < now
                    && !self.disconnect_event_sent
                {
                    self.disconnect_event_sent = true;
                    self.events.push(Event::Disconnected);
                    tracing::warn!(queue_id = self.queue_id, "peer timed out, disconnecting");
                }
            }
            Phase::Disconnected => {
                if self.last_input_packet_recv_time == 0
                    || self.last_input_packet_recv_time + RUNNING_RETRY_INTERVAL < now
                {
                    self.send_pending_output(now, local_connect_status);
                    self.last_input_packet_recv_time = now;
                }

                if self.shutdown_timeout < now {
                    tracing::debug!(queue_id = self.queue_id, "shutdown timer elapsed, unbinding endpoint");
                    self.pipeline.shutdown();
                    self.peer_identity = None;
                }
            }
        }

        // Drained last so a message queued by this very call (a retransmit, keep-alive, or
        // quality report above) goes out the same tick instead of waiting for the next poll.
        self.pipeline.drain(now, &peer, &mut self.rng, transport);
    }

    /// Entry point for an inbound datagram already matched to this endpoint by the transport
    /// demux (see [`Endpoint::handles_msg`]). A no-op once the endpoint is unbound.
    pub fn on_message(&mut self, msg: Message) {
        if self.peer_identity.is_none() {
            return;
        }
        let now = self.clock.now_ms();

        if !msg.is_sync() && msg.header.magic != self.remote_magic_number {
            tracing::debug!(
                queue_id = self.queue_id,
                got = msg.header.magic,
                want = self.remote_magic_number,
                "dropping message with mismatched magic"
            );
            return;
        }

        if !msg.is_sync() {
            let skipped = msg.header.sequence_number.wrapping_sub(self.next_recv_seq) as u32;
            if skipped > MAX_SEQ_DISTANCE {
                tracing::debug!(
                    queue_id = self.queue_id,
                    seq = msg.header.sequence_number,
                    expected = self.next_recv_seq,
                    "dropping out-of-order message"
                );
                return;
            }
            self.next_recv_seq = msg.header.sequence_number;
        }

        tracing::trace!(queue_id = self.queue_id, kind = msg.type_name(), "dispatching message");
        let header = msg.header;
        let handled = match msg.body {
            MessageBody::SyncRequest(body) => self.on_sync_request(body, header, now),
            MessageBody::SyncReply(body) => self.on_sync_reply(header, body, now),
            MessageBody::Input(body) => self.on_input(body, now),
            MessageBody::InputAck(body) => self.on_input_ack(body),
            MessageBody::QualityReport(body) => self.on_quality_report(body, now),
            MessageBody::QualityReply(body) => self.on_quality_reply(body, now),
            MessageBody::KeepAlive => true,
        };

        if handled {
            self.last_recv_time = now;
            if self.disconnect_notify_sent && self.phase == Phase::Running {
                self.disconnect_notify_sent = false;
                self.events.push(Event::NetworkResumed);
            }
        }
    }

    fn on_sync_request(&mut self, body: SyncRequest, header: MessageHeader, now: u32) -> bool {
        if self.remote_magic_number != 0 && header.magic != self.remote_magic_number {
            return false;
        }
        let reply = SyncReply {
            random_reply: body.random_request,
        };
        self.queue_message(MessageBody::SyncReply(reply), now);
        true
    }

    fn on_sync_reply(&mut self, header: MessageHeader, body: SyncReply, now: u32) -> bool {
        if self.phase != Phase::Syncing {
            return false;
        }
        // A mismatched nonce is not evidence the peer is alive - only a matching nonce
        // counts as liveness progress.
        if self.random != body.random_reply {
            return false;
        }

        if !self.connected {
            self.connected = true;
            self.events.push(Event::Connected);
        }

        self.roundtrips_remaining -= 1;
        if self.roundtrips_remaining == 0 {
            self.remote_magic_number = header.magic;
            self.last_received_input = GameInput::blank(self.input_size);
            self.events.push(Event::Synchronized);
            self.phase = Phase::Running;
            tracing::debug!(queue_id = self.queue_id, "handshake complete, now running");
        } else {
            self.events.push(Event::Synchronizing {
                total: NUM_SYNC_PACKETS,
                count: NUM_SYNC_PACKETS - self.roundtrips_remaining,
            });
            self.send_sync_request(now);
        }
        true
    }

    fn on_input(&mut self, body: Input, now: u32) -> bool {
        if body.disconnect_requested {
            if self.phase != Phase::Disconnected && !self.disconnect_event_sent {
                self.disconnect_event_sent = true;
                self.events.push(Event::Disconnected);
            }
        } else {
            // Merge is monotone: disconnected is sticky, last_frame only rises.
            for i in 0..MAX_PLAYERS {
                self.peer_connect_status[i].disconnected |= body.peer_connect_status[i].disconnected;
                self.peer_connect_status[i].last_frame = self.peer_connect_status[i]
                    .last_frame
                    .max(body.peer_connect_status[i].last_frame);
            }
        }

        let frames = match codec::decode(
            &mut self.last_received_input,
            body.start_frame,
            body.input_size,
            &body.bits,
            body.num_bits,
        ) {
            Ok(frames) => frames,
            Err(err) => {
                tracing::warn!(queue_id = self.queue_id, error = %err, "malformed input stream, dropping");
                return false;
            }
        };

        for frame in frames {
            self.last_input_packet_recv_time = now;
            self.events.push(Event::Input(frame));
        }

        self.queue_message(
            MessageBody::InputAck(InputAck {
                ack_frame: self.last_received_input.frame,
            }),
            now,
        );
        self.pop_pending_output(body.ack_frame);
        true
    }

    fn on_input_ack(&mut self, body: InputAck) -> bool {
        self.pop_pending_output(body.ack_frame);
        true
    }

    fn on_quality_report(&mut self, body: QualityReport, now: u32) -> bool {
        self.remote_frame_advantage = body.frame_advantage;
        let reply = QualityReply {
            pong_timestamp: body.ping_timestamp,
        };
        self.queue_message(MessageBody::QualityReply(reply), now);
        true
    }

    fn on_quality_reply(&mut self, body: QualityReply, now: u32) -> bool {
        self.round_trip_time = now.saturating_sub(body.pong_timestamp);
        true
    }

    fn pop_pending_output(&mut self, ack_frame: Frame) {
        // Deliberately `<=`, not `<`: `ack_frame` names the last frame the peer has actually
        // received, so that frame itself is acked too and must be pruned along with everything
        // before it (otherwise it would sit in the queue forever, since nothing sent afterward
        // ever reports itself as unacked again).
        while let Some(front) = self.pending_output.front() {
            if front.frame <= ack_frame {
                self.last_acked_input = *front;
                self.pending_output.pop_front();
            } else {
                break;
            }
        }
    }

    fn send_sync_request(&mut self, now: u32) {
        self.random = self.rng.next_u32();
        let body = SyncRequest {
            random_request: self.random,
        };
        self.queue_message(MessageBody::SyncRequest(body), now);
    }

    fn send_pending_output(
        &mut self,
        now: u32,
        local_connect_status: &[ConnectionStatus; MAX_PLAYERS],
    ) {
        let (start_frame, input_size) = match self.pending_output.front() {
            Some(input) => {
                assert!(
                    self.last_acked_input.frame == NULL_FRAME
                        || self.last_acked_input.frame + 1 == input.frame
                );
                (input.frame, input.size)
            }
            None => (0, self.input_size),
        };

        let encoded = codec::encode(&self.last_acked_input, self.pending_output.iter());
        let body = Input {
            start_frame,
            input_size,
            ack_frame: self.last_received_input.frame,
            num_bits: encoded.num_bits,
            bits: encoded.bits,
            disconnect_requested: self.phase == Phase::Disconnected,
            peer_connect_status: *local_connect_status,
        };
        self.queue_message(MessageBody::Input(body), now);
    }

    fn queue_message(&mut self, body: MessageBody, now: u32) {
        let header = MessageHeader {
            magic: self.magic_number,
            sequence_number: self.next_send_seq,
        };
        self.next_send_seq = self.next_send_seq.wrapping_add(1);
        let msg = Message { header, body };

        self.packets_sent += 1;
        self.bytes_sent += bincode::serialized_size(&msg).unwrap_or(0) as usize;
        self.last_send_time = now;

        // Peer identity is threaded through drain(), not stored on the queue entry itself -
        // one pipeline instance only ever talks to the one peer this endpoint is bound to.
        self.pipeline.enqueue(msg, now, &mut self.rng);
    }

    fn recompute_stats(&mut self, now: u32) {
        if self.stats_start_time == 0 {
            self.stats_start_time = now;
            return;
        }
        let elapsed_secs = now.saturating_sub(self.stats_start_time) / 1000;
        if elapsed_secs == 0 {
            return;
        }
        let total_bytes = self.bytes_sent + STEAM_HEADER_SIZE * self.packets_sent;
        self.kbps_sent = (total_bytes / elapsed_secs as usize) / 1024;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::message::ConnectionStatus;
    use rand::rngs::mock::StepRng;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<u32>>);
    impl ManualClock {
        fn new() -> Self {
            Self(Rc::new(Cell::new(0)))
        }
        fn advance(&self, by: u32) {
            self.0.set(self.0.get() + by);
        }
    }
    impl Clock for ManualClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    struct ChannelTransport {
        inbox: Rc<std::cell::RefCell<VecDeque<Message>>>,
    }
    impl Transport<&'static str> for ChannelTransport {
        fn send_to(&mut self, msg: &Message, _peer: &&'static str) {
            self.inbox.borrow_mut().push_back(msg.clone());
        }
    }

    fn connect_status() -> [ConnectionStatus; MAX_PLAYERS] {
        [ConnectionStatus::default(); MAX_PLAYERS]
    }

    fn new_endpoint(clock: ManualClock) -> Endpoint<&'static str, ManualClock, StepRng> {
        Endpoint::new(clock, StepRng::new(1, 1), 2, ShakeoutConfig::default())
    }

    #[test]
    fn sequence_filter_drops_stale_and_accepts_advancing() {
        let clock = ManualClock::new();
        let mut ep = new_endpoint(clock.clone());
        ep.init("peer", 0);
        ep.next_recv_seq = 10;
        ep.remote_magic_number = 42;

        let keepalive = |seq: u16| Message {
            header: MessageHeader {
                magic: 42,
                sequence_number: seq,
            },
            body: MessageBody::KeepAlive,
        };

        ep.on_message(keepalive(9));
        assert_eq!(ep.next_recv_seq, 10, "seq 9 is behind 10 and must be dropped");

        ep.on_message(keepalive(11));
        assert_eq!(ep.next_recv_seq, 11);

        ep.on_message(keepalive(10));
        assert_eq!(ep.next_recv_seq, 11, "seq 10 arriving after 11 must be dropped");
    }

    #[test]
    fn handshake_reaches_running_after_five_roundtrips() {
        let clock_a = ManualClock::new();
        let clock_b = ManualClock::new();
        let mut a = new_endpoint(clock_a.clone());
        let mut b = new_endpoint(clock_b.clone());
        a.init("b", 0);
        b.init("a", 0);

        let a_to_b: Rc<std::cell::RefCell<VecDeque<Message>>> = Rc::default();
        let b_to_a: Rc<std::cell::RefCell<VecDeque<Message>>> = Rc::default();
        let mut a_transport = ChannelTransport {
            inbox: a_to_b.clone(),
        };
        let mut b_transport = ChannelTransport {
            inbox: b_to_a.clone(),
        };

        a.synchronize().unwrap();
        let status = connect_status();

        for _ in 0..5 {
            a.on_poll(&status, &mut a_transport);
            while let Some(msg) = a_to_b.borrow_mut().pop_front() {
                b.on_message(msg);
            }
            b.on_poll(&status, &mut b_transport);
            while let Some(msg) = b_to_a.borrow_mut().pop_front() {
                a.on_message(msg);
            }
        }

        assert!(a.is_running());
        let mut saw_connected = false;
        let mut saw_synchronized = false;
        while let Some(evt) = a.poll_event() {
            match evt {
                Event::Connected => saw_connected = true,
                Event::Synchronized => saw_synchronized = true,
                _ => {}
            }
        }
        assert!(saw_connected);
        assert!(saw_synchronized);
    }

    #[test]
    fn disconnect_then_shutdown_unbinds_endpoint() {
        let clock = ManualClock::new();
        let mut ep = new_endpoint(clock.clone());
        ep.init("peer", 0);
        ep.disconnect();
        assert!(ep.is_bound());

        let status = connect_status();
        let mut transport = ChannelTransport {
            inbox: Rc::default(),
        };
        clock.advance(4999);
        ep.on_poll(&status, &mut transport);
        assert!(ep.is_bound(), "shutdown timer has not elapsed yet");

        clock.advance(2);
        ep.on_poll(&status, &mut transport);
        assert!(!ep.is_bound(), "shutdown timer elapsed, endpoint must unbind");
    }
}
