//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; a recorder must be installed by
//! the host process for the values to go anywhere.

use metrics::{counter, gauge, histogram};

/// Metric names as constants for consistency.
pub mod names {
    // Admission
    pub const FRAMES_ADMITTED_TOTAL: &str = "landmarks_frames_admitted_total";
    pub const FRAMES_DROPPED_TOTAL: &str = "landmarks_frames_dropped_total";
    pub const FRAMES_MALFORMED_TOTAL: &str = "landmarks_frames_malformed_total";
    pub const FRAMES_ABANDONED_TOTAL: &str = "landmarks_frames_abandoned_total";

    // Processing
    pub const FRAME_DURATION_SECONDS: &str = "landmarks_frame_duration_seconds";
    pub const FRAME_LATENCY_SECONDS: &str = "landmarks_frame_latency_seconds";
    pub const PROCESSOR_FAILURES_TOTAL: &str = "landmarks_processor_failures_total";
    pub const PROCESSOR_TIMEOUTS_TOTAL: &str = "landmarks_processor_timeouts_total";
    pub const OBJECTS_DETECTED_TOTAL: &str = "landmarks_objects_detected_total";

    // Publishing
    pub const SNAPSHOTS_PUBLISHED_TOTAL: &str = "landmarks_snapshots_published_total";

    // Session
    pub const SESSIONS_ACTIVE: &str = "landmarks_sessions_active";
}

/// Record a frame admitted for processing.
pub fn record_frame_admitted() {
    counter!(names::FRAMES_ADMITTED_TOTAL).increment(1);
}

/// Record a frame discarded by the admission policy.
pub fn record_frame_dropped() {
    counter!(names::FRAMES_DROPPED_TOTAL).increment(1);
}

/// Record a frame skipped because its pixel data was unusable.
pub fn record_frame_malformed() {
    counter!(names::FRAMES_MALFORMED_TOTAL).increment(1);
}

/// Record a frame abandoned by cancellation.
pub fn record_frame_abandoned() {
    counter!(names::FRAMES_ABANDONED_TOTAL).increment(1);
}

/// Record end-to-end processing time of one frame.
pub fn record_frame_duration(duration_secs: f64) {
    histogram!(names::FRAME_DURATION_SECONDS).record(duration_secs);
}

/// Record time from frame capture to snapshot publication.
pub fn record_frame_latency(latency_secs: f64) {
    histogram!(names::FRAME_LATENCY_SECONDS).record(latency_secs);
}

/// Record a processor failure that was degraded to an empty result.
pub fn record_processor_failure(processor: &str) {
    let labels = [("processor", processor.to_string())];
    counter!(names::PROCESSOR_FAILURES_TOTAL, &labels).increment(1);
}

/// Record a processor exceeding its processing deadline.
pub fn record_processor_timeout(processor: &str) {
    let labels = [("processor", processor.to_string())];
    counter!(names::PROCESSOR_TIMEOUTS_TOTAL, &labels).increment(1);
}

/// Record objects found by a processor in one frame.
pub fn record_objects_detected(processor: &str, count: usize) {
    let labels = [("processor", processor.to_string())];
    counter!(names::OBJECTS_DETECTED_TOTAL, &labels).increment(count as u64);
}

/// Record a published snapshot.
pub fn record_snapshot_published(has_overlay: bool) {
    let labels = [("overlay", has_overlay.to_string())];
    counter!(names::SNAPSHOTS_PUBLISHED_TOTAL, &labels).increment(1);
}

/// Adjust the running sessions gauge.
pub fn adjust_active_sessions(delta: f64) {
    gauge!(names::SESSIONS_ACTIVE).increment(delta);
}
