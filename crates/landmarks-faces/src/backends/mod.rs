//! Bundled detection backends.

pub mod color_key;

pub use color_key::ColorKeyBackend;
