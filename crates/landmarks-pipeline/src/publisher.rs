//! Single-slot latest-value snapshot channel.

use std::sync::Arc;

use tokio::sync::watch;

use crate::metrics;
use crate::snapshot::Snapshot;

/// Publishing half of the snapshot channel.
///
/// Holds only the most recent snapshot. Publishing never blocks and never
/// fails, whether or not anyone is observing.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    tx: Arc<watch::Sender<Option<Arc<Snapshot>>>>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        metrics::record_snapshot_published(snapshot.has_overlay());
        self.tx.send_replace(Some(snapshot.clone()));
        snapshot
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.tx.borrow().clone()
    }

    /// Register an observer. Its first [`next`](SnapshotObserver::next)
    /// yields the current snapshot, if any.
    pub fn subscribe(&self) -> SnapshotObserver {
        SnapshotObserver {
            rx: self.tx.subscribe(),
            primed: false,
        }
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of the snapshot channel.
///
/// A slow observer skips intermediate snapshots and always resumes at the
/// latest one.
#[derive(Debug)]
pub struct SnapshotObserver {
    rx: watch::Receiver<Option<Arc<Snapshot>>>,
    primed: bool,
}

impl SnapshotObserver {
    /// Current snapshot without waiting.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.rx.borrow().clone()
    }

    /// Wait for a snapshot not yet seen by this observer.
    ///
    /// Returns `None` once every publisher handle is dropped.
    pub async fn next(&mut self) -> Option<Arc<Snapshot>> {
        if !self.primed {
            self.primed = true;
            if let Some(snapshot) = self.rx.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
        loop {
            self.rx.changed().await.ok()?;
            if let Some(snapshot) = self.rx.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
    }
}

impl Clone for SnapshotObserver {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            primed: self.primed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::RgbaImage;
    use landmarks_models::{FrameSize, Rotation};

    fn snapshot(sequence: u64) -> Snapshot {
        Snapshot {
            frame_sequence: sequence,
            frame_size: FrameSize::new(2, 2).unwrap(),
            rotation: Rotation::Degrees0,
            content: Some(Arc::new(RgbaImage::new(2, 2))),
            overlay: None,
            scenes: Vec::new(),
            published_at: Utc::now(),
        }
    }

    #[test]
    fn test_publish_without_observers() {
        let publisher = SnapshotPublisher::new();
        assert!(publisher.latest().is_none());
        publisher.publish(snapshot(1));
        publisher.publish(snapshot(2));
        assert_eq!(publisher.latest().map(|s| s.frame_sequence), Some(2));
    }

    #[tokio::test]
    async fn test_late_observer_sees_latest_only() {
        let publisher = SnapshotPublisher::new();
        for seq in 1..=3 {
            publisher.publish(snapshot(seq));
        }

        let mut observer = publisher.subscribe();
        assert_eq!(observer.next().await.map(|s| s.frame_sequence), Some(3));

        publisher.publish(snapshot(4));
        publisher.publish(snapshot(5));
        assert_eq!(observer.next().await.map(|s| s.frame_sequence), Some(5));
    }

    #[tokio::test]
    async fn test_observer_ends_with_publisher() {
        let publisher = SnapshotPublisher::new();
        let mut observer = publisher.subscribe();
        drop(publisher);
        assert!(observer.next().await.is_none());
    }
}
