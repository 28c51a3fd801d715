//! Configuration management for intervue.
//!
//! Loads and saves the application configuration from a TOML file in the
//! user's config directory, writing defaults on first run.

pub mod file;

pub use file::{
    ensure_config, get_config_path, CaptureConfig, IntervueConfig, InterviewConfig, UploadConfig,
};
