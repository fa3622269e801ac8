use serde::{Deserialize, Serialize};

use crate::{Frame, MAX_PLAYERS, NULL_FRAME};

/// Gossiped connection status for one player slot. Maintained per remote slot and copied into
/// every outbound `Input` message so both peers converge on who is still connected and how far
/// along they are. `last_frame` only ever rises and `disconnected` is sticky once set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub disconnected: bool,
    pub last_frame: Frame,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            disconnected: false,
            last_frame: NULL_FRAME,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub(crate) struct SyncRequest {
    pub random_request: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub(crate) struct SyncReply {
    pub random_reply: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Input {
    pub start_frame: Frame,
    pub input_size: usize,
    pub ack_frame: Frame,
    pub num_bits: u16,
    /// The nibblet-encoded bit stream from `codec::encode`. Bounded by `MAX_COMPRESSED_BITS`
    /// bits; represented as a growable buffer rather than a fixed array since serde already
    /// length-prefixes it and `num_bits` tracks the meaningful bit count precisely.
    pub bits: Vec<u8>,
    pub disconnect_requested: bool,
    pub peer_connect_status: [ConnectionStatus; MAX_PLAYERS],
}

impl Default for Input {
    fn default() -> Self {
        Self {
            start_frame: NULL_FRAME,
            input_size: 0,
            ack_frame: NULL_FRAME,
            num_bits: 0,
            bits: Vec::new(),
            disconnect_requested: false,
            peer_connect_status: [ConnectionStatus::default(); MAX_PLAYERS],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct InputAck {
    pub ack_frame: Frame,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub(crate) struct QualityReport {
    pub ping_timestamp: u32,
    pub frame_advantage: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub(crate) struct QualityReply {
    pub pong_timestamp: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum MessageBody {
    SyncRequest(SyncRequest),
    SyncReply(SyncReply),
    Input(Input),
    InputAck(InputAck),
    QualityReport(QualityReport),
    QualityReply(QualityReply),
    KeepAlive,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MessageHeader {
    pub magic: u16,
    pub sequence_number: u16,
}

/// A message that a [`Transport`] sends and receives. When implementing [`Transport`], deserialize
/// received datagrams into this type before passing them to [`Endpoint::on_message`].
///
/// [`Transport`]: crate::network::pipeline::Transport
/// [`Endpoint::on_message`]: crate::network::endpoint::Endpoint::on_message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub header: MessageHeader,
    pub(crate) body: MessageBody,
}

impl Message {
    pub(crate) fn type_name(&self) -> &'static str {
        match &self.body {
            MessageBody::SyncRequest(_) => "sync-request",
            MessageBody::SyncReply(_) => "sync-reply",
            MessageBody::Input(_) => "input",
            MessageBody::InputAck(_) => "input-ack",
            MessageBody::QualityReport(_) => "quality-report",
            MessageBody::QualityReply(_) => "quality-reply",
            MessageBody::KeepAlive => "keep-alive",
        }
    }

    pub(crate) fn is_sync(&self) -> bool {
        matches!(self.body, MessageBody::SyncRequest(_) | MessageBody::SyncReply(_))
    }
}
