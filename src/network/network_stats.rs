/// A snapshot of connection quality for one endpoint, returned by
/// [`Endpoint::network_stats`](crate::network::endpoint::Endpoint::network_stats).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct NetworkStats {
    /// Round-trip time in milliseconds, from the most recent quality report/reply exchange.
    pub ping: u32,
    /// Number of frames currently buffered in the pending output queue, awaiting acknowledgement.
    pub send_queue_len: usize,
    /// Outbound bandwidth, including the simulated transport header overhead.
    pub kbps_sent: usize,
    /// The remote's self-reported frame advantage, as of the last quality report.
    pub remote_frames_behind: i32,
    /// Our own estimate of how far ahead of the remote we are.
    pub local_frames_behind: i32,
}
