//! Frame admission between the frame source and the runner.

use tokio::sync::mpsc;
use tracing::trace;

use crate::config::AdmissionPolicy;
use crate::frame::Frame;
use crate::metrics;

/// Outcome of offering a frame to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// No slot was free and the policy discards surplus frames
    Dropped,
    /// The runner is gone
    Closed,
}

/// Producer half of the admission queue.
#[derive(Debug, Clone)]
pub struct FrameGate {
    policy: AdmissionPolicy,
    tx: mpsc::Sender<Frame>,
}

/// Create an admission queue sized by `policy`.
///
/// The runner holds at most one frame in flight, so `slots` is the number of
/// frames that may wait behind it.
pub fn frame_gate(policy: AdmissionPolicy) -> (FrameGate, mpsc::Receiver<Frame>) {
    let (tx, rx) = mpsc::channel(policy.slots());
    (FrameGate { policy, tx }, rx)
}

impl FrameGate {
    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }

    /// Offer a frame to the runner.
    pub async fn offer(&self, frame: Frame) -> Admission {
        let sequence = frame.sequence();
        let admission = match self.policy {
            AdmissionPolicy::DropNewest { .. } => match self.tx.try_send(frame) {
                Ok(()) => Admission::Admitted,
                Err(mpsc::error::TrySendError::Full(_)) => Admission::Dropped,
                Err(mpsc::error::TrySendError::Closed(_)) => Admission::Closed,
            },
            AdmissionPolicy::Backpressure { .. } => match self.tx.send(frame).await {
                Ok(()) => Admission::Admitted,
                Err(_) => Admission::Closed,
            },
        };

        match admission {
            Admission::Admitted => metrics::record_frame_admitted(),
            Admission::Dropped => {
                trace!(sequence, "Frame dropped, no admission slot free");
                metrics::record_frame_dropped();
            }
            Admission::Closed => {}
        }
        admission
    }
}
