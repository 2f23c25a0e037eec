//! Runner integration tests: layering, admission and timeouts.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{frame, Calls, GatedProcessor, MarkProcessor};
use landmarks_models::{BoundingBox, Scene};
use landmarks_pipeline::{
    frame_gate, Admission, AdmissionPolicy, Canvas, Color, Frame, FrameOutcome, FrameProcessor,
    PipelineError, PipelineResult, PipelineRunner, ProcessorSet, RunnerConfig, SnapshotPublisher,
};
use tokio::sync::{mpsc, watch, Mutex, Semaphore};

fn runner(processors: Vec<Box<dyn FrameProcessor>>, config: RunnerConfig) -> PipelineRunner {
    PipelineRunner::new(
        Arc::new(Mutex::new(ProcessorSet::new(processors))),
        config,
        SnapshotPublisher::new(),
    )
}

fn layered(first: Color, second: Color) -> Vec<Box<dyn FrameProcessor>> {
    vec![
        Box::new(MarkProcessor::new(
            "first",
            first,
            BoundingBox::new(0.0, 0.0, 6.0, 6.0),
            Calls::new(),
        )),
        Box::new(MarkProcessor::new(
            "second",
            second,
            BoundingBox::new(3.0, 3.0, 6.0, 6.0),
            Calls::new(),
        )),
    ]
}

#[tokio::test]
async fn test_later_processor_draws_on_top() {
    let runner = runner(layered(Color::RED, Color::GREEN), RunnerConfig::default());
    let outcome = runner.run_frame(frame(1)).await;
    let overlay = outcome.snapshot().unwrap().overlay.clone().unwrap();

    assert_eq!(overlay.get_pixel(1, 1).0, [255, 0, 0, 255]);
    assert_eq!(overlay.get_pixel(4, 4).0, [0, 255, 0, 255]);
    assert_eq!(overlay.get_pixel(8, 8).0, [0, 255, 0, 255]);
}

#[tokio::test]
async fn test_swapping_order_swaps_layers() {
    let runner = runner(layered(Color::GREEN, Color::RED), RunnerConfig::default());
    let outcome = runner.run_frame(frame(1)).await;
    let snapshot = outcome.snapshot().unwrap();
    let overlay = snapshot.overlay.clone().unwrap();

    assert_eq!(overlay.get_pixel(4, 4).0, [255, 0, 0, 255]);
    let names: Vec<&str> = snapshot
        .scenes
        .iter()
        .map(|scene| scene.objects[0].tracking_id.as_str())
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[tokio::test]
async fn test_zero_detections_publish_without_overlay() {
    let calls = Calls::new();
    let runner = runner(
        vec![Box::new(MarkProcessor::empty(calls.clone()))],
        RunnerConfig::default(),
    );
    let outcome = runner.run_frame(frame(7)).await;
    let snapshot = outcome.snapshot().unwrap();

    assert_eq!(snapshot.frame_sequence, 7);
    assert!(snapshot.overlay.is_none());
    assert!(snapshot.scenes.is_empty());
    assert_eq!(calls.processed(), 1);
}

#[tokio::test]
async fn test_one_slot_admits_exactly_one_waiting_frame() {
    let (started_tx, mut started) = mpsc::unbounded_channel();
    let permits = Arc::new(Semaphore::new(0));
    let calls = Calls::new();
    let runner = runner(
        vec![Box::new(GatedProcessor {
            started: started_tx,
            permits: permits.clone(),
            calls: calls.clone(),
        })],
        RunnerConfig::default(),
    );
    let publisher = runner_publisher(&runner);

    let (gate, frames) = frame_gate(AdmissionPolicy::DropNewest { slots: 1 });
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let task = tokio::spawn({
        let runner = runner.clone();
        async move { runner.run(frames, cancel_rx).await }
    });

    assert_eq!(gate.offer(frame(1)).await, Admission::Admitted);
    assert_eq!(started.recv().await, Some(1));

    // Frame 1 is in flight; only one of the next two fits.
    assert_eq!(gate.offer(frame(2)).await, Admission::Admitted);
    assert_eq!(gate.offer(frame(3)).await, Admission::Dropped);

    permits.add_permits(8);
    assert_eq!(started.recv().await, Some(2));
    drop(gate);
    task.await.unwrap();

    assert_eq!(calls.processed(), 2);
    assert_eq!(publisher.latest().map(|s| s.frame_sequence), Some(2));
    assert!(started.try_recv().is_err());
}

#[tokio::test]
async fn test_cancelled_frame_publishes_nothing() {
    let (started_tx, mut started) = mpsc::unbounded_channel();
    let calls = Calls::new();
    let runner = runner(
        vec![Box::new(GatedProcessor {
            started: started_tx,
            permits: Arc::new(Semaphore::new(0)),
            calls: calls.clone(),
        })],
        RunnerConfig::default(),
    );
    let publisher = runner_publisher(&runner);

    let (gate, frames) = frame_gate(AdmissionPolicy::default());
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let task = tokio::spawn({
        let runner = runner.clone();
        async move { runner.run(frames, cancel_rx).await }
    });

    gate.offer(frame(1)).await;
    assert_eq!(started.recv().await, Some(1));
    cancel_tx.send_replace(true);
    task.await.unwrap();

    assert!(publisher.latest().is_none());
    assert_eq!(calls.processed(), 0);
}

/// Never finishes on its own.
struct Stalled;

#[async_trait]
impl FrameProcessor for Stalled {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn process(&mut self, _frame: &Frame) -> PipelineResult<Option<Scene>> {
        std::future::pending().await
    }

    fn render_visualization(&self, _scene: &Scene, _frame: &Frame, _canvas: &mut dyn Canvas) {}

    async fn release(&mut self) {}
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_processor_counts_as_empty() {
    let processors: Vec<Box<dyn FrameProcessor>> = vec![
        Box::new(Stalled),
        Box::new(MarkProcessor::new(
            "mark",
            Color::BLUE,
            BoundingBox::new(0.0, 0.0, 4.0, 4.0),
            Calls::new(),
        )),
    ];
    let runner = runner(
        processors,
        RunnerConfig::default().with_process_timeout(Duration::from_millis(100)),
    );

    match runner.run_frame(frame(1)).await {
        FrameOutcome::Published(snapshot) => {
            assert_eq!(snapshot.scenes.len(), 1);
            assert!(snapshot.has_overlay());
        }
        other => panic!("expected a snapshot, got {:?}", other),
    }
}

/// Reports cancellation from its own backend on every call.
struct SelfCancelling;

#[async_trait]
impl FrameProcessor for SelfCancelling {
    fn name(&self) -> &str {
        "self-cancelling"
    }

    async fn process(&mut self, _frame: &Frame) -> PipelineResult<Option<Scene>> {
        Err(PipelineError::Cancelled)
    }

    fn render_visualization(&self, _scene: &Scene, _frame: &Frame, _canvas: &mut dyn Canvas) {}

    async fn release(&mut self) {}
}

#[tokio::test]
async fn test_processor_cancellation_keeps_other_scenes() {
    let calls = Calls::new();
    let processors: Vec<Box<dyn FrameProcessor>> = vec![
        Box::new(SelfCancelling),
        Box::new(MarkProcessor::new(
            "mark",
            Color::BLUE,
            BoundingBox::new(0.0, 0.0, 4.0, 4.0),
            calls.clone(),
        )),
    ];
    let runner = runner(processors, RunnerConfig::default());
    let publisher = runner_publisher(&runner);

    match runner.run_frame(frame(1)).await {
        FrameOutcome::Published(snapshot) => {
            assert_eq!(snapshot.scenes.len(), 1);
            assert_eq!(snapshot.scenes[0].objects[0].tracking_id, "mark");
            assert!(snapshot.has_overlay());
        }
        other => panic!("expected a snapshot, got {:?}", other),
    }
    assert_eq!(publisher.latest().map(|s| s.frame_sequence), Some(1));
    assert_eq!(calls.processed(), 1);
}

fn runner_publisher(runner: &PipelineRunner) -> SnapshotPublisher {
    runner.publisher().clone()
}
