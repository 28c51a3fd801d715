//! Answer capture.
//!
//! [`AnswerRecorder`] is the live half of a recording session: it owns the
//! input stream for exactly one answer, accumulates PCM chunks as the
//! backend delivers them, and finalizes the buffer into one encoded media
//! object. The stream is a scoped resource: dropped on stop, cancel, error
//! and teardown alike, so the device is never left open.

use crate::capture::device::{acquire_device, suppress_alsa_warnings};
use crate::capture::error::CaptureError;
use crate::capture::ffmpeg::find_ffmpeg;
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use hound::WavWriter;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Captures one answer from the configured input device.
///
/// Captures at the device's native rate, downmixes to mono, and encodes the
/// result through ffmpeg into the configured container.
pub struct AnswerRecorder {
    /// Actual sample rate, updated from the device on start
    sample_rate: u32,
    /// Accumulated PCM chunks (i16 mono)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Live input stream; Some only while capturing
    stream: Option<cpal::Stream>,
    /// Device name, index or "default"
    device_name: String,
}

impl AnswerRecorder {
    /// Creates a recorder for the given device spec. The requested sample
    /// rate is advisory; the device's native rate wins and is readable via
    /// [`Self::sample_rate`] after [`Self::start`].
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            device_name,
        }
    }

    /// Acquires the capture device and starts accumulating chunks.
    ///
    /// # Errors
    /// A classified [`CaptureError`]: permission refused, device missing or
    /// busy, configuration unsatisfiable, or an aborted setup.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        let device = acquire_device(&self.device_name)?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Capturing at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }
        self.sample_rate = device_sample_rate;

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );

        let samples_arc = Arc::clone(&self.samples);

        let stream = suppress_alsa_warnings(|| {
            let stream = device.build_input_stream(
                &device_config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    Self::accumulate_chunk(data, &samples_arc, num_channels);
                },
                |err| {
                    tracing::error!("Capture stream error: {}", err);
                },
                None,
            )?;
            stream.play()?;
            Ok(stream)
        })?;

        self.stream = Some(stream);
        tracing::debug!("Capture stream started");
        Ok(())
    }

    /// Appends one backend chunk to the buffer, downmixed to mono.
    fn accumulate_chunk(data: &[i16], samples_arc: &Arc<Mutex<Vec<i16>>>, num_channels: usize) {
        let mut samples = samples_arc.lock().unwrap();

        match num_channels {
            1 => samples.extend_from_slice(data),
            2 => {
                for chunk in data.chunks_exact(2) {
                    let mono = ((chunk[0] as i32 + chunk[1] as i32) / 2) as i16;
                    samples.push(mono);
                }
            }
            _ => {
                for chunk in data.chunks_exact(num_channels) {
                    let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                    samples.push((sum / num_channels as i32) as i16);
                }
            }
        }
    }

    /// Returns a clone of the accumulated samples (for the level meter).
    pub fn samples(&self) -> Vec<i16> {
        self.samples.lock().unwrap().clone()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    /// Actual capture sample rate (valid after [`Self::start`]).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Releases the capture device without producing media bytes.
    pub fn release(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Capture stream released without finalizing");
        }
    }

    /// Releases the device and encodes the accumulated buffer into the
    /// configured container. This is the single point where a recording
    /// session turns into finished media bytes.
    ///
    /// # Arguments
    /// * `format` - codec and options for ffmpeg, e.g. "libopus -b:a 24k"
    ///
    /// # Errors
    /// - If the format string is empty
    /// - If ffmpeg is missing or the encode fails
    pub fn finalize(&mut self, format: &str) -> Result<Vec<u8>> {
        self.stream = None;

        let samples = self.samples.lock().unwrap().clone();
        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            samples.len(),
            self.sample_rate
        );

        let codec = format
            .split_whitespace()
            .next()
            .ok_or_else(|| anyhow!("Invalid capture format string: empty"))?;

        let wav_bytes = encode_wav(&samples, self.sample_rate)?;
        if codec == "pcm_s16le" {
            return Ok(wav_bytes);
        }

        let temp_dir = std::env::temp_dir();
        let temp_wav = temp_dir.join(format!("intervue_{}.wav", std::process::id()));
        let temp_out = temp_dir.join(format!(
            "intervue_{}.{}",
            std::process::id(),
            container_extension(format)
        ));

        std::fs::write(&temp_wav, &wav_bytes)?;
        let encode_result = convert_with_ffmpeg(&temp_wav, &temp_out, format);

        let media = encode_result.and_then(|()| {
            std::fs::read(&temp_out).map_err(|e| anyhow!("Failed to read encoded media: {e}"))
        });

        for temp in [&temp_wav, &temp_out] {
            if let Err(e) = std::fs::remove_file(temp) {
                tracing::debug!("Failed to remove temp file {}: {}", temp.display(), e);
            }
        }

        let media = media?;
        tracing::info!("Answer encoded: {} bytes ({})", media.len(), codec);
        Ok(media)
    }
}

/// Serializes mono i16 samples into an in-memory WAV container.
fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let wav_spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, wav_spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}

/// Encodes the intermediate WAV through ffmpeg.
///
/// The format string is "codec [ffmpeg options]"; mono is always enforced.
fn convert_with_ffmpeg(input_wav: &Path, output_path: &Path, format: &str) -> Result<()> {
    let format_parts: Vec<&str> = format.split_whitespace().collect();
    let codec = format_parts
        .first()
        .ok_or_else(|| anyhow!("Invalid format string: empty"))?;

    let ffmpeg_path = find_ffmpeg()?;

    let mut cmd = std::process::Command::new(&ffmpeg_path);
    cmd.arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(input_wav)
        .arg("-acodec")
        .arg(codec)
        .arg("-ac")
        .arg("1")
        .arg("-y");
    for option in &format_parts[1..] {
        cmd.arg(option);
    }
    cmd.arg(output_path);

    let output = cmd.output()?;
    if output.status.success() {
        tracing::debug!("Media encoded with codec {}", codec);
        Ok(())
    } else {
        let error_msg = String::from_utf8_lossy(&output.stderr);
        tracing::error!("ffmpeg encode failed: {}", error_msg);
        Err(anyhow!("Media encoding failed: {error_msg}"))
    }
}

/// Maps a format string to the container extension used in wire file names.
pub fn container_extension(format: &str) -> &str {
    let codec = format.split_whitespace().next().unwrap_or(format);
    match codec {
        "libopus" => "webm",
        "libvorbis" => "ogg",
        "flac" => "flac",
        "aac" => "m4a",
        "pcm_s16le" => "wav",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_extension_mapping() {
        assert_eq!(container_extension("libopus -b:a 24k"), "webm");
        assert_eq!(container_extension("libvorbis"), "ogg");
        assert_eq!(container_extension("flac"), "flac");
        assert_eq!(container_extension("aac -ab 16k"), "m4a");
        assert_eq!(container_extension("pcm_s16le"), "wav");
        assert_eq!(container_extension("mp3 -ab 16k"), "mp3");
    }

    #[test]
    fn test_encode_wav_produces_valid_container() {
        let bytes = encode_wav(&[0, 100, -100, 32000], 16000).unwrap();
        // RIFF header plus 4 samples of 2 bytes each.
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 8);
    }

    #[test]
    fn test_encode_wav_accepts_empty_buffer() {
        // Start followed by an immediate stop still finalizes to a valid file.
        let bytes = encode_wav(&[], 16000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(bytes.len(), 44);
    }

    #[test]
    fn test_accumulate_chunk_downmixes_stereo() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        AnswerRecorder::accumulate_chunk(&[100, 200, -50, 50], &samples, 2);
        assert_eq!(*samples.lock().unwrap(), vec![150, 0]);
    }

    #[test]
    fn test_accumulate_chunk_passes_mono_through() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        AnswerRecorder::accumulate_chunk(&[1, 2, 3], &samples, 1);
        AnswerRecorder::accumulate_chunk(&[4], &samples, 1);
        assert_eq!(*samples.lock().unwrap(), vec![1, 2, 3, 4]);
    }
}
