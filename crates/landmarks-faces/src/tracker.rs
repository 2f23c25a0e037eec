//! IoU-based tracker for keeping face identity across frames.
//!
//! Uses greedy matching by Intersection over Union between consecutive
//! frames. Backends without native tracking use it to assign tracking ids.

use std::collections::HashMap;

use landmarks_models::BoundingBox;

#[derive(Debug, Clone)]
struct Track {
    /// Last known bounding box
    bbox: BoundingBox,
    /// Frames since last detection
    age: u32,
}

/// Greedy IoU tracker.
#[derive(Debug)]
pub struct IouTracker {
    /// Minimum IoU for a detection to continue a track
    iou_threshold: f32,
    /// Frames a track survives without a matching detection
    max_gap: u32,
    tracks: HashMap<i32, Track>,
    next_track_id: i32,
}

impl IouTracker {
    pub fn new(iou_threshold: f32, max_gap: u32) -> Self {
        Self {
            iou_threshold,
            max_gap,
            tracks: HashMap::new(),
            next_track_id: 0,
        }
    }

    /// Assign a track id to each detection, in input order.
    pub fn update(&mut self, detections: &[BoundingBox]) -> Vec<i32> {
        let mut unmatched: Vec<i32> = self.tracks.keys().copied().collect();
        unmatched.sort_unstable();

        let mut assigned = Vec::with_capacity(detections.len());
        for bbox in detections {
            let mut best_iou = self.iou_threshold;
            let mut best_track = None;
            for &track_id in &unmatched {
                if let Some(track) = self.tracks.get(&track_id) {
                    let iou = bbox.iou(&track.bbox);
                    if iou > best_iou {
                        best_iou = iou;
                        best_track = Some(track_id);
                    }
                }
            }

            let track_id = match best_track {
                Some(track_id) => {
                    unmatched.retain(|&id| id != track_id);
                    track_id
                }
                None => {
                    let track_id = self.next_track_id;
                    self.next_track_id += 1;
                    track_id
                }
            };
            self.tracks.insert(track_id, Track { bbox: *bbox, age: 0 });
            assigned.push(track_id);
        }

        // Age tracks that found no detection this frame.
        for track_id in unmatched {
            let expired = match self.tracks.get_mut(&track_id) {
                Some(track) => {
                    track.age += 1;
                    track.age > self.max_gap
                }
                None => false,
            };
            if expired {
                self.tracks.remove(&track_id);
            }
        }

        assigned
    }

    pub fn reset(&mut self) {
        self.tracks.clear();
        self.next_track_id = 0;
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}
