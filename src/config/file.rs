//! Configuration file management for intervue.
//!
//! Configuration lives in a TOML file in the user's config directory. A
//! missing file is written with defaults on first run so every knob is
//! visible and editable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Capture device and encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Capture device to use. Options:
    /// - "default" for the system default device
    /// - numeric index (0, 1, 2, etc.) from `intervue list-devices`
    /// - device name from `intervue list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested capture sample rate in Hz (the device's native rate wins)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Encode format string: "codec [ffmpeg_options]" (e.g. "libopus -b:a 24k")
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            output_format: default_output_format(),
        }
    }
}

/// Interview pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Per-question answer time budget in seconds; hitting it auto-stops the
    /// recording.
    #[serde(default = "default_answer_seconds")]
    pub answer_seconds: u64,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            answer_seconds: default_answer_seconds(),
        }
    }
}

/// Submission endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Base URL of the application backend; the submission path is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_output_format() -> String {
    "libopus -b:a 24k".to_string()
}

fn default_answer_seconds() -> u64 {
    60
}

fn default_base_url() -> String {
    "https://video-backend-1ci2.onrender.com".to_string()
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervueConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub interview: InterviewConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl IntervueConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        let config: IntervueConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Writes the default configuration if no config file exists yet.
///
/// # Errors
/// - If the config directory cannot be created or the file written
pub fn ensure_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    if config_path.exists() {
        return Ok(());
    }
    IntervueConfig::default().save()?;
    tracing::info!("Default configuration written to {}", config_path.display());
    Ok(())
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let config_path = home.join(".config").join("intervue").join("intervue.toml");

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: IntervueConfig = toml::from_str("").unwrap();
        assert_eq!(config.capture.device, "default");
        assert_eq!(config.capture.sample_rate, 16000);
        assert_eq!(config.capture.output_format, "libopus -b:a 24k");
        assert_eq!(config.interview.answer_seconds, 60);
        assert!(config.upload.base_url.starts_with("https://"));
    }

    #[test]
    fn test_partial_override() {
        let config: IntervueConfig = toml::from_str(
            r#"
            [interview]
            answer_seconds = 90

            [upload]
            base_url = "http://localhost:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.interview.answer_seconds, 90);
        assert_eq!(config.upload.base_url, "http://localhost:8080");
        // Untouched tables keep their defaults.
        assert_eq!(config.capture.device, "default");
    }

    #[test]
    fn test_round_trip() {
        let config = IntervueConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: IntervueConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.capture.sample_rate, config.capture.sample_rate);
        assert_eq!(parsed.interview.answer_seconds, config.interview.answer_seconds);
        assert_eq!(parsed.upload.base_url, config.upload.base_url);
    }
}
