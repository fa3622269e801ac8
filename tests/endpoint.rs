//! End-to-end exercises driving a pair of `Endpoint`s against each other through in-memory
//! channels instead of real sockets.

use rand::rngs::mock::StepRng;
use rollback_endpoint::{
    Clock, ConnectionStatus, Endpoint, Event, GameInput, Message, ShakeoutConfig, Transport,
    MAX_PLAYERS,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
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
    inbox: Rc<RefCell<VecDeque<Message>>>,
}

impl Transport<&'static str> for ChannelTransport {
    fn send_to(&mut self, msg: &Message, _peer: &&'static str) {
        self.inbox.borrow_mut().push_back(msg.clone());
    }
}

fn connect_status() -> [ConnectionStatus; MAX_PLAYERS] {
    [ConnectionStatus::default(); MAX_PLAYERS]
}

type TestEndpoint = Endpoint<&'static str, ManualClock, StepRng>;

fn new_endpoint(clock: ManualClock) -> TestEndpoint {
    Endpoint::new(clock, StepRng::new(1, 1), 1, ShakeoutConfig::default())
}

struct Link {
    a_to_b: Rc<RefCell<VecDeque<Message>>>,
    b_to_a: Rc<RefCell<VecDeque<Message>>>,
}

struct Harness {
    a: TestEndpoint,
    b: TestEndpoint,
    clock_a: ManualClock,
    clock_b: ManualClock,
    a_transport: ChannelTransport,
    b_transport: ChannelTransport,
    link: Link,
}

fn wire_up() -> Harness {
    let clock_a = ManualClock::new();
    let clock_b = ManualClock::new();
    let mut a = new_endpoint(clock_a.clone());
    let mut b = new_endpoint(clock_b.clone());
    a.init("b", 0);
    b.init("a", 1);

    let link = Link {
        a_to_b: Rc::default(),
        b_to_a: Rc::default(),
    };
    let a_transport = ChannelTransport {
        inbox: link.a_to_b.clone(),
    };
    let b_transport = ChannelTransport {
        inbox: link.b_to_a.clone(),
    };
    Harness {
        a,
        b,
        clock_a,
        clock_b,
        a_transport,
        b_transport,
        link,
    }
}

impl Harness {
    fn pump(&mut self, status: &[ConnectionStatus; MAX_PLAYERS]) {
        self.a.on_poll(status, &mut self.a_transport);
        while let Some(msg) = self.link.a_to_b.borrow_mut().pop_front() {
            self.b.on_message(msg);
        }
        self.b.on_poll(status, &mut self.b_transport);
        while let Some(msg) = self.link.b_to_a.borrow_mut().pop_front() {
            self.a.on_message(msg);
        }
    }

    fn run_handshake(&mut self, status: &[ConnectionStatus; MAX_PLAYERS]) {
        self.a.synchronize().unwrap();
        self.b.synchronize().unwrap();
        for _ in 0..10 {
            self.pump(status);
            if self.a.is_running() && self.b.is_running() {
                break;
            }
        }
        assert!(
            self.a.is_running() && self.b.is_running(),
            "handshake did not converge"
        );
        drain_events(&mut self.a);
        drain_events(&mut self.b);
    }
}

fn drain_events(ep: &mut TestEndpoint) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(evt) = ep.poll_event() {
        events.push(evt);
    }
    events
}

fn input_of(frame: i32, byte: u8) -> GameInput {
    let mut buffer = [0u8; rollback_endpoint::MAX_INPUT_BYTES];
    buffer[0] = byte;
    GameInput {
        frame,
        size: 1,
        buffer,
    }
}

#[test]
fn input_exchange_delivers_frames_in_order_and_acks() {
    let mut h = wire_up();
    let status = connect_status();
    h.run_handshake(&status);

    h.a.queue_input(input_of(0, 0x01), &status);
    h.a.queue_input(input_of(1, 0x03), &status);
    h.a.queue_input(input_of(2, 0x03), &status);

    h.pump(&status);

    let received: Vec<GameInput> = drain_events(&mut h.b)
        .into_iter()
        .filter_map(|e| match e {
            Event::Input(input) => Some(input),
            _ => None,
        })
        .collect();
    assert_eq!(received.len(), 3);
    assert_eq!(received[0].frame, 0);
    assert_eq!(received[0].input(), &[0x01]);
    assert_eq!(received[1].frame, 1);
    assert_eq!(received[1].input(), &[0x03]);
    assert_eq!(received[2].frame, 2);
    assert_eq!(received[2].input(), &[0x03]);

    // B's InputAck(2) already made its way back to A as part of the pump() above.
    assert_eq!(h.a.network_stats().send_queue_len, 0);
}

#[test]
fn network_interrupted_then_disconnected_after_timeout() {
    let mut h = wire_up();
    let status = connect_status();
    h.a.set_disconnect_notify_start(1000);
    h.a.set_disconnect_timeout(5000);
    h.b.set_disconnect_notify_start(1000);
    h.b.set_disconnect_timeout(5000);
    h.run_handshake(&status);

    // B goes silent from here on; only A keeps polling.
    h.clock_a.advance(1001);
    h.a.on_poll(&status, &mut h.a_transport);
    let events = drain_events(&mut h.a);
    let interrupted = events.iter().find_map(|e| match e {
        Event::NetworkInterrupted { disconnect_timeout } => Some(*disconnect_timeout),
        _ => None,
    });
    assert_eq!(
        interrupted,
        Some(4000),
        "expected NetworkInterrupted once notify_start elapsed, with the remaining budget"
    );

    h.clock_a.advance(4000);
    h.a.on_poll(&status, &mut h.a_transport);
    let events = drain_events(&mut h.a);
    assert!(
        events.iter().any(|e| matches!(e, Event::Disconnected)),
        "expected Disconnected once disconnect_timeout elapsed"
    );
}

#[test]
fn resume_before_hard_timeout_cancels_disconnect() {
    let mut h = wire_up();
    let status = connect_status();
    h.a.set_disconnect_notify_start(1000);
    h.a.set_disconnect_timeout(5000);
    h.run_handshake(&status);

    h.clock_a.advance(1001);
    h.a.on_poll(&status, &mut h.a_transport);
    let events = drain_events(&mut h.a);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::NetworkInterrupted { .. })));

    // B's next keep-alive arrives well before the 5000ms hard timeout and must resume A.
    h.clock_b.advance(1500);
    h.b.on_poll(&status, &mut h.b_transport);
    while let Some(msg) = h.link.b_to_a.borrow_mut().pop_front() {
        h.a.on_message(msg);
    }
    h.clock_a.advance(500);
    h.a.on_poll(&status, &mut h.a_transport);

    let events = drain_events(&mut h.a);
    assert!(
        events.iter().any(|e| matches!(e, Event::NetworkResumed)),
        "expected NetworkResumed once a live message arrived"
    );
    assert!(
        !events.iter().any(|e| matches!(e, Event::Disconnected)),
        "must not disconnect once resumed"
    );
}

#[test]
fn disconnect_keeps_sending_with_flag_until_shutdown_then_unbinds() {
    let mut h = wire_up();
    let status = connect_status();
    h.run_handshake(&status);

    h.a.disconnect();
    assert!(h.a.is_disconnected());
    assert!(h.a.is_bound());

    h.a.on_poll(&status, &mut h.a_transport);
    assert!(
        h.link.a_to_b.borrow_mut().pop_front().is_some(),
        "a disconnected endpoint must keep sending its pending state"
    );

    h.clock_a.advance(4999);
    h.a.on_poll(&status, &mut h.a_transport);
    assert!(h.a.is_bound(), "shutdown timer has not elapsed yet");

    h.clock_a.advance(2);
    h.a.on_poll(&status, &mut h.a_transport);
    assert!(!h.a.is_bound(), "shutdown timer elapsed, endpoint must unbind");
}
