//! Frame processor trait and the ordered processor set driven by the runner.

use async_trait::async_trait;
use landmarks_models::Scene;
use tracing::{debug, warn};

use crate::canvas::Canvas;
use crate::error::PipelineResult;
use crate::frame::Frame;

/// A pluggable unit of per-frame work.
///
/// A processor turns a frame into at most one [`Scene`] and knows how to draw
/// that scene. It may hold an expensive external resource (a detector
/// instance) which is acquired in [`initialize`](FrameProcessor::initialize)
/// and torn down in [`release`](FrameProcessor::release).
///
/// The runner never calls one processor concurrently with itself.
#[async_trait]
pub trait FrameProcessor: Send {
    /// Processor name for logging and metrics.
    fn name(&self) -> &str;

    /// Acquire backend resources. Called once before the first frame.
    async fn initialize(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    /// Analyze one frame.
    ///
    /// Returns `Ok(None)` when nothing was detected or the frame was rejected.
    /// The returned future may be dropped at any suspension point when the
    /// session stops; a dropped call must leave no side effects behind.
    /// Return [`PipelineError::Cancelled`](crate::PipelineError::Cancelled)
    /// when the backend itself reports cancellation.
    async fn process(&mut self, frame: &Frame) -> PipelineResult<Option<Scene>>;

    /// Draw `scene` onto `canvas`. Pure drawing, no detection work.
    fn render_visualization(&self, scene: &Scene, frame: &Frame, canvas: &mut dyn Canvas);

    /// Tear down held resources. Must be idempotent.
    async fn release(&mut self);
}

struct Slot {
    processor: Box<dyn FrameProcessor>,
    released: bool,
}

/// Ordered list of processors owned by one session run.
///
/// Configuration order is composition order: later processors draw on top.
pub struct ProcessorSet {
    slots: Vec<Slot>,
}

impl ProcessorSet {
    pub fn new(processors: Vec<Box<dyn FrameProcessor>>) -> Self {
        Self {
            slots: processors
                .into_iter()
                .map(|processor| Slot {
                    processor,
                    released: false,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.processor.name().to_string())
            .collect()
    }

    /// Initialize every processor in order, stopping at the first failure.
    pub async fn initialize_all(&mut self) -> PipelineResult<()> {
        for slot in &mut self.slots {
            debug!(processor = %slot.processor.name(), "Initializing processor");
            slot.processor.initialize().await?;
        }
        Ok(())
    }

    /// Release every processor that has not been released yet.
    pub async fn release_all(&mut self) {
        for slot in &mut self.slots {
            if slot.released {
                continue;
            }
            slot.processor.release().await;
            slot.released = true;
            debug!(processor = %slot.processor.name(), "Processor released");
        }
    }

    /// Whether every processor has been released.
    pub fn is_released(&self) -> bool {
        self.slots.iter().all(|slot| slot.released)
    }

    pub(crate) fn processors_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn FrameProcessor>> {
        self.slots.iter_mut().map(|slot| &mut slot.processor)
    }

    pub(crate) fn processor(&self, index: usize) -> Option<&dyn FrameProcessor> {
        self.slots.get(index).map(|slot| slot.processor.as_ref())
    }
}

impl Drop for ProcessorSet {
    fn drop(&mut self) {
        let pending: Vec<&str> = self
            .slots
            .iter()
            .filter(|slot| !slot.released)
            .map(|slot| slot.processor.name())
            .collect();
        if !pending.is_empty() {
            warn!(processors = ?pending, "Processor set dropped without release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        releases: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FrameProcessor for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn process(&mut self, _frame: &Frame) -> PipelineResult<Option<Scene>> {
            Ok(None)
        }

        fn render_visualization(&self, _scene: &Scene, _frame: &Frame, _canvas: &mut dyn Canvas) {}

        async fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_release_all_runs_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut set = ProcessorSet::new(vec![
            Box::new(Counting {
                releases: releases.clone(),
            }),
            Box::new(Counting {
                releases: releases.clone(),
            }),
        ]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["counting", "counting"]);
        set.initialize_all().await.unwrap();
        set.release_all().await;
        set.release_all().await;

        assert!(set.is_released());
        assert_eq!(releases.load(Ordering::SeqCst), 2);
    }
}
