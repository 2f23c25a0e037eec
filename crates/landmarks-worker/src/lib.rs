//! Demo worker for the frame-analysis pipeline.
//!
//! This crate provides:
//! - A synthetic camera frame source
//! - Session wiring for the face processor
//! - A snapshot logger that dumps the latest annotated frame
//! - Tracing and Prometheus setup

pub mod config;
pub mod error;
pub mod executor;
pub mod observer;
pub mod synthetic;
pub mod telemetry;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::WorkerExecutor;
pub use observer::{write_latest, ObserverSummary, SnapshotLogger};
pub use synthetic::{synthetic_cameras, SyntheticCamera};
