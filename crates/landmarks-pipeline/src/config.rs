//! Runner configuration.

use std::time::Duration;

/// How frames arriving while another frame is in flight are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPolicy {
    /// Queue up to `slots` frames; a frame arriving with every slot taken is
    /// dropped. The frame in flight is never interrupted.
    DropNewest { slots: usize },
    /// Queue up to `slots` frames and make the source wait for a free slot.
    Backpressure { slots: usize },
}

impl AdmissionPolicy {
    pub fn slots(&self) -> usize {
        match self {
            AdmissionPolicy::DropNewest { slots } | AdmissionPolicy::Backpressure { slots } => {
                (*slots).max(1)
            }
        }
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        AdmissionPolicy::DropNewest { slots: 1 }
    }
}

/// Pipeline runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Frame admission policy
    pub admission: AdmissionPolicy,
    /// Carry the camera frame in the snapshot content
    pub content_enabled: bool,
    /// Deadline for a single `process` call; `None` waits indefinitely
    pub process_timeout: Option<Duration>,
    /// Render processor visualizations into the snapshot overlay
    pub visualization_enabled: bool,
    /// Publish an (empty) overlay even when no processor drew
    pub force_overlay: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            admission: AdmissionPolicy::default(),
            content_enabled: true,
            process_timeout: None,
            visualization_enabled: true,
            force_overlay: false,
        }
    }
}

impl RunnerConfig {
    /// Create config from environment variables.
    ///
    /// - `LANDMARKS_ADMISSION`: `drop_newest` (default) or `backpressure`
    /// - `LANDMARKS_ADMISSION_SLOTS`: queued frame slots (default 1)
    /// - `LANDMARKS_CONTENT`: carry the camera frame in snapshots (default true)
    /// - `LANDMARKS_PROCESS_TIMEOUT_MS`: per-processor deadline, unset or 0 for none
    /// - `LANDMARKS_VISUALIZATION`: render overlays (default true)
    /// - `LANDMARKS_FORCE_OVERLAY`: publish empty overlays (default false)
    pub fn from_env() -> Self {
        let slots = env_parse("LANDMARKS_ADMISSION_SLOTS").unwrap_or(1usize).max(1);
        let admission = match std::env::var("LANDMARKS_ADMISSION")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "backpressure" => AdmissionPolicy::Backpressure { slots },
            _ => AdmissionPolicy::DropNewest { slots },
        };

        Self {
            admission,
            content_enabled: env_parse("LANDMARKS_CONTENT").unwrap_or(true),
            process_timeout: env_parse::<u64>("LANDMARKS_PROCESS_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            visualization_enabled: env_parse("LANDMARKS_VISUALIZATION").unwrap_or(true),
            force_overlay: env_parse("LANDMARKS_FORCE_OVERLAY").unwrap_or(false),
        }
    }

    pub fn with_admission(mut self, admission: AdmissionPolicy) -> Self {
        self.admission = admission;
        self
    }

    pub fn with_content(mut self, enabled: bool) -> Self {
        self.content_enabled = enabled;
        self
    }

    pub fn with_process_timeout(mut self, timeout: Duration) -> Self {
        self.process_timeout = Some(timeout);
        self
    }

    pub fn with_visualization(mut self, enabled: bool) -> Self {
        self.visualization_enabled = enabled;
        self
    }

    pub fn with_force_overlay(mut self, force: bool) -> Self {
        self.force_overlay = force;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
