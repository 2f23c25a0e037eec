//! Worker configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use landmarks_faces::FaceDetectorOptions;
use landmarks_pipeline::{CameraSelection, Color, RunnerConfig};

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Synthetic camera frame width
    pub frame_width: u32,
    /// Synthetic camera frame height
    pub frame_height: u32,
    /// Synthetic camera frame rate
    pub fps: u32,
    /// Number of moving markers drawn per frame
    pub markers: u32,
    /// Stop after this long; `None` runs until interrupted
    pub run_duration: Option<Duration>,
    /// Which enumerated camera to open
    pub camera: CameraSelection,
    /// Prometheus listen address, metrics disabled when unset
    pub metrics_addr: Option<SocketAddr>,
    /// Directory receiving `latest.png` and `latest.json`
    pub output_dir: Option<PathBuf>,
    /// TrueType font for overlay text (`WORKER_FONT_PATH`). Required for the
    /// face info line; without it overlays carry boxes and landmarks only.
    pub font_path: Option<PathBuf>,
    /// Marker color the color-key backend treats as a face
    pub key_color: Color,
    pub key_tolerance: u8,
    pub face: FaceDetectorOptions,
    pub runner: RunnerConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            fps: 15,
            markers: 2,
            run_duration: None,
            camera: CameraSelection::First,
            metrics_addr: None,
            output_dir: None,
            font_path: None,
            key_color: Color::rgb(255, 0, 255),
            key_tolerance: 24,
            face: FaceDetectorOptions::default(),
            runner: RunnerConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        let defaults = Self::default();
        let metrics_addr = match std::env::var("WORKER_METRICS_ADDR") {
            Ok(addr) if !addr.trim().is_empty() => Some(addr.trim().parse().map_err(|e| {
                WorkerError::config_error(format!("WORKER_METRICS_ADDR '{}': {}", addr, e))
            })?),
            _ => None,
        };

        let config = Self {
            frame_width: env_parse("WORKER_FRAME_WIDTH").unwrap_or(defaults.frame_width),
            frame_height: env_parse("WORKER_FRAME_HEIGHT").unwrap_or(defaults.frame_height),
            fps: env_parse("WORKER_FPS").unwrap_or(defaults.fps),
            markers: env_parse("WORKER_MARKERS").unwrap_or(defaults.markers),
            run_duration: env_parse::<u64>("WORKER_RUN_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            camera: std::env::var("WORKER_CAMERA")
                .map(|value| CameraSelection::parse(&value))
                .unwrap_or(defaults.camera),
            metrics_addr,
            output_dir: env_path("WORKER_OUTPUT_DIR"),
            font_path: env_path("WORKER_FONT_PATH"),
            key_color: defaults.key_color,
            key_tolerance: env_parse("WORKER_KEY_TOLERANCE").unwrap_or(defaults.key_tolerance),
            face: FaceDetectorOptions::from_env(),
            runner: RunnerConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WorkerResult<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(WorkerError::config_error(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        if self.fps == 0 {
            return Err(WorkerError::config_error("fps must be non-zero"));
        }
        self.face.validate()?;
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.camera, CameraSelection::First);
        assert_eq!(config.frame_interval(), Duration::from_secs_f64(1.0 / 15.0));
    }

    #[test]
    fn test_rejects_zero_fps() {
        let config = WorkerConfig {
            fps: 0,
            ..WorkerConfig::default()
        };
        assert!(matches!(config.validate(), Err(WorkerError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_bad_face_options() {
        let mut config = WorkerConfig::default();
        config.face.min_face_size = 2.0;
        assert!(matches!(config.validate(), Err(WorkerError::Face(_))));
    }
}
