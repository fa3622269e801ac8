use crate::Frame;

const FRAME_WINDOW_SIZE: usize = 30;

/// Narrow contract for the external time-synchronization heuristic: it records one sample per
/// sent input frame and, on request, turns the accumulated samples into a recommended frame
/// delay. [`TimeSync`] is this crate's own reference implementation; a host may substitute a
/// different heuristic entirely.
pub trait TimeSyncAdvisor {
    /// Records one sample. `local_advantage` and `remote_advantage` follow the sign convention
    /// of [`Endpoint::local_frame_advantage`](crate::network::endpoint::Endpoint): positive
    /// means we believe we are ahead of the remote.
    fn advance_frame(&mut self, frame: Frame, local_advantage: i32, remote_advantage: i32);

    /// Returns a recommended number of frames to wait before advancing, meeting the two peers
    /// in the middle of their observed advantage. `require_idle_input` is part of the contract
    /// surface for advisors that only want to recommend a wait while no local input is pending;
    /// the reference implementation ignores it.
    fn recommend_frame_wait_duration(&self, require_idle_input: bool) -> i32;
}

/// Sliding-window average of local/remote frame advantage samples, used to recommend how many
/// frames a host should idle to let a lagging peer catch up.
#[derive(Debug)]
pub struct TimeSync {
    local: [i32; FRAME_WINDOW_SIZE],
    remote: [i32; FRAME_WINDOW_SIZE],
}

impl Default for TimeSync {
    fn default() -> Self {
        Self {
            local: [0; FRAME_WINDOW_SIZE],
            remote: [0; FRAME_WINDOW_SIZE],
        }
    }
}

impl TimeSync {
    pub fn new() -> Self {
        Self::default()
    }

    fn average_frame_advantage(&self) -> i32 {
        // average local and remote frame advantages
        let local_sum: i32 = self.local.iter().sum();
        let local_avg = local_sum as f32 / self.local.len() as f32;
        let remote_sum: i32 = self.remote.iter().sum();
        let remote_avg = remote_sum as f32 / self.remote.len() as f32;

        // meet in the middle
        ((remote_avg - local_avg) / 2.0) as i32
    }
}

impl TimeSyncAdvisor for TimeSync {
    fn advance_frame(&mut self, frame: Frame, local_advantage: i32, remote_advantage: i32) {
        self.local[frame as usize % self.local.len()] = local_advantage;
        self.remote[frame as usize % self.remote.len()] = remote_advantage;
    }

    fn recommend_frame_wait_duration(&self, _require_idle_input: bool) -> i32 {
        self.average_frame_advantage()
    }
}

// #########
// # TESTS #
// #########
