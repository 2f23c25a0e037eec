//! Snapshot observer that logs detections and dumps the latest frame.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops;
use landmarks_faces::{face_info_line, type_ids};
use landmarks_pipeline::{Snapshot, SnapshotObserver};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::WorkerResult;

/// Totals gathered while observing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverSummary {
    pub snapshots: u64,
    pub with_overlay: u64,
    pub faces: u64,
    pub last_sequence: Option<u64>,
}

/// Consumes snapshots until the publisher goes away or `stop` flips.
pub struct SnapshotLogger {
    observer: SnapshotObserver,
    output_dir: Option<PathBuf>,
}

impl SnapshotLogger {
    pub fn new(observer: SnapshotObserver, output_dir: Option<PathBuf>) -> Self {
        Self {
            observer,
            output_dir,
        }
    }

    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> ObserverSummary {
        let mut summary = ObserverSummary::default();
        loop {
            let snapshot = tokio::select! {
                biased;
                _ = stop.wait_for(|s| *s) => break,
                snapshot = self.observer.next() => match snapshot {
                    Some(snapshot) => snapshot,
                    None => break,
                },
            };

            summary.snapshots += 1;
            summary.last_sequence = Some(snapshot.frame_sequence);
            if snapshot.has_overlay() {
                summary.with_overlay += 1;
            }
            summary.faces += log_snapshot(&snapshot) as u64;

            if let Some(dir) = self.output_dir.clone() {
                let snapshot = snapshot.clone();
                let written =
                    tokio::task::spawn_blocking(move || write_latest(&dir, &snapshot)).await;
                match written {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Failed to write snapshot"),
                    Err(e) => warn!(error = %e, "Snapshot writer task failed"),
                }
            }
        }
        debug!(snapshots = summary.snapshots, "Snapshot observer finished");
        summary
    }
}

/// Log one snapshot, returning the number of faces it carries.
fn log_snapshot(snapshot: &Snapshot) -> usize {
    let faces: Vec<String> = snapshot
        .scenes
        .iter()
        .flat_map(|scene| scene.objects_of_type(type_ids::FACE))
        .map(|face| face_info_line(face).trim_end().to_string())
        .collect();

    info!(
        sequence = snapshot.frame_sequence,
        objects = snapshot.object_count(),
        overlay = snapshot.has_overlay(),
        rotation = %snapshot.rotation,
        faces = ?faces,
        "Snapshot"
    );
    faces.len()
}

/// Write `latest.png` (content with overlay composited) and `latest.json`
/// (scenes) into `dir`, replacing the previous pair. Without content the
/// overlay is written over a transparent background.
pub fn write_latest(dir: &Path, snapshot: &Arc<Snapshot>) -> WorkerResult<()> {
    std::fs::create_dir_all(dir)?;

    let mut composed = match snapshot.content.as_ref() {
        Some(content) => content.as_ref().clone(),
        None => image::RgbaImage::new(snapshot.frame_size.width, snapshot.frame_size.height),
    };
    if let Some(overlay) = snapshot.overlay.as_ref() {
        imageops::overlay(&mut composed, overlay.as_ref(), 0, 0);
    }
    composed.save_with_format(dir.join("latest.png"), image::ImageFormat::Png)?;

    let document = json!({
        "frame_sequence": snapshot.frame_sequence,
        "published_at": snapshot.published_at.to_rfc3339(),
        "rotation": snapshot.rotation.degrees(),
        "scenes": snapshot.scenes,
    });
    let body = serde_json::to_vec_pretty(&document)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(dir.join("latest.json"), body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::{Rgba, RgbaImage};
    use landmarks_models::{FrameSize, Rotation};

    fn snapshot(content: Option<RgbaImage>, overlay: Option<RgbaImage>) -> Arc<Snapshot> {
        Arc::new(Snapshot {
            frame_sequence: 4,
            frame_size: FrameSize::new(4, 4).unwrap(),
            rotation: Rotation::Degrees0,
            content: content.map(Arc::new),
            overlay: overlay.map(Arc::new),
            scenes: Vec::new(),
            published_at: Utc::now(),
        })
    }

    #[test]
    fn test_write_latest_composites_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let content = RgbaImage::from_pixel(4, 4, Rgba([10, 10, 10, 255]));
        let mut overlay = RgbaImage::new(4, 4);
        overlay.put_pixel(1, 1, Rgba([0, 255, 0, 255]));

        write_latest(dir.path(), &snapshot(Some(content), Some(overlay))).unwrap();

        let written = image::open(dir.path().join("latest.png")).unwrap().to_rgba8();
        assert_eq!(written.get_pixel(1, 1).0, [0, 255, 0, 255]);
        assert_eq!(written.get_pixel(0, 0).0, [10, 10, 10, 255]);
        assert!(dir.path().join("latest.json").exists());
    }

    #[test]
    fn test_write_latest_without_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut overlay = RgbaImage::new(4, 4);
        overlay.put_pixel(2, 2, Rgba([255, 0, 0, 255]));

        write_latest(dir.path(), &snapshot(None, Some(overlay))).unwrap();

        let written = image::open(dir.path().join("latest.png")).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (4, 4));
        assert_eq!(written.get_pixel(2, 2).0, [255, 0, 0, 255]);
        assert_eq!(written.get_pixel(0, 0).0[3], 0);
    }
}
