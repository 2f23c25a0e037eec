//! Stub processors and sources shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::RgbaImage;
use landmarks_models::{BoundingBox, Object, Rotation, Scene};
use landmarks_pipeline::{
    Canvas, Color, Frame, FrameProcessor, FrameSource, Paint, PipelineError, PipelineResult,
    SnapshotObserver,
};
use tokio::sync::{mpsc, Semaphore};

pub fn image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::new(width, height)
}

pub fn frame(sequence: u64) -> Frame {
    Frame::new(sequence, image(16, 16), Rotation::Degrees0)
}

/// Wait for a snapshot with at least `sequence`, failing after a few seconds.
pub async fn wait_for_sequence(observer: &mut SnapshotObserver, sequence: u64) -> Vec<u64> {
    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(snapshot) = observer.next().await {
            seen.push(snapshot.frame_sequence);
            if snapshot.frame_sequence >= sequence {
                break;
            }
        }
    })
    .await
    .expect("snapshot did not arrive in time");
    seen
}

/// Counts lifecycle calls on a processor.
#[derive(Debug, Default)]
pub struct Calls {
    pub initialized: AtomicUsize,
    pub processed: AtomicUsize,
    pub released: AtomicUsize,
}

impl Calls {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

/// Detects one object at a fixed rectangle and fills it with its color.
pub struct MarkProcessor {
    pub name: String,
    pub color: Color,
    pub rect: BoundingBox,
    pub detect: bool,
    pub fail_init: bool,
    pub calls: Arc<Calls>,
}

impl MarkProcessor {
    pub fn new(name: &str, color: Color, rect: BoundingBox, calls: Arc<Calls>) -> Self {
        Self {
            name: name.to_string(),
            color,
            rect,
            detect: true,
            fail_init: false,
            calls,
        }
    }

    pub fn empty(calls: Arc<Calls>) -> Self {
        Self {
            detect: false,
            ..Self::new("empty", Color::RED, BoundingBox::new(0.0, 0.0, 1.0, 1.0), calls)
        }
    }

    pub fn failing_init(calls: Arc<Calls>) -> Self {
        Self {
            fail_init: true,
            ..Self::new("broken", Color::RED, BoundingBox::new(0.0, 0.0, 1.0, 1.0), calls)
        }
    }
}

#[async_trait]
impl FrameProcessor for MarkProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&mut self) -> PipelineResult<()> {
        self.calls.initialized.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(PipelineError::processor_init(&self.name, "backend unavailable"));
        }
        Ok(())
    }

    async fn process(&mut self, frame: &Frame) -> PipelineResult<Option<Scene>> {
        self.calls.processed.fetch_add(1, Ordering::SeqCst);
        if !self.detect {
            return Ok(None);
        }
        let object = Object::new("mark", self.name.clone(), self.rect);
        Ok(Some(Scene::new(frame.frame_size()?, vec![object])))
    }

    fn render_visualization(&self, scene: &Scene, _frame: &Frame, canvas: &mut dyn Canvas) {
        for object in &scene.objects {
            canvas.draw_rect(&object.bounding, &Paint::fill(self.color));
        }
    }

    async fn release(&mut self) {
        self.calls.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Reports each frame it starts and waits for a permit before finishing.
pub struct GatedProcessor {
    pub started: mpsc::UnboundedSender<u64>,
    pub permits: Arc<Semaphore>,
    pub calls: Arc<Calls>,
}

#[async_trait]
impl FrameProcessor for GatedProcessor {
    fn name(&self) -> &str {
        "gated"
    }

    async fn process(&mut self, frame: &Frame) -> PipelineResult<Option<Scene>> {
        let _ = self.started.send(frame.sequence());
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PipelineError::Cancelled)?;
        permit.forget();
        self.calls.processed.fetch_add(1, Ordering::SeqCst);
        let object = Object::new("mark", "gated", BoundingBox::new(0.0, 0.0, 2.0, 2.0));
        Ok(Some(Scene::new(frame.frame_size()?, vec![object])))
    }

    fn render_visualization(&self, scene: &Scene, _frame: &Frame, canvas: &mut dyn Canvas) {
        for object in &scene.objects {
            canvas.draw_rect(&object.bounding, &Paint::fill(Color::YELLOW));
        }
    }

    async fn release(&mut self) {
        self.calls.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// A source whose device can never be opened.
pub struct UnavailableSource {
    pub released: Arc<AtomicUsize>,
}

#[async_trait]
impl FrameSource for UnavailableSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn acquire(&mut self) -> PipelineResult<()> {
        Err(PipelineError::source_unavailable("camera 2 is in use"))
    }

    async fn next_frame(&mut self) -> Option<Frame> {
        None
    }

    async fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
