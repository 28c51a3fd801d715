//! Capture device lookup.
//!
//! Resolves the configured device spec ("default", a numeric index, or a
//! device name) to a concrete input device, with ALSA's noisy stderr
//! suppressed on Linux while the backend is probed.

use crate::capture::error::CaptureError;
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Resolves `device_spec` to an input device.
///
/// # Arguments
/// * `device_spec` - "default" for the system default, a numeric index from
///   `intervue list-devices`, or a device name
///
/// # Errors
/// - `DeviceNotFound` if no device matches the spec (or none exists at all)
/// - A classified error if the backend cannot enumerate devices
pub fn acquire_device(device_spec: &str) -> Result<cpal::Device, CaptureError> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();

        if device_spec == "default" {
            host.default_input_device().ok_or_else(|| {
                CaptureError::device_not_found("no default input device available")
            })
        } else {
            find_device_by_spec(&host, device_spec)
        }
    })
}

/// Finds an input device by numeric index or by name.
fn find_device_by_spec(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device, CaptureError> {
    let devices: Vec<cpal::Device> = host.input_devices()?.collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        return devices.into_iter().nth(index).ok_or_else(|| {
            CaptureError::device_not_found(format!("device index {index} is out of range"))
        });
    }

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(CaptureError::device_not_found(format!(
        "capture device '{device_spec}' not found; run 'intervue list-devices' to see what is available"
    )))
}

/// Temporarily redirects stderr to /dev/null to silence ALSA library warnings
/// on Linux. On other platforms this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T, CaptureError>
where
    F: FnOnce() -> Result<T, CaptureError>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| CaptureError::aborted(format!("failed to open /dev/null: {e}")))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(CaptureError::aborted("failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(CaptureError::aborted("failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T, CaptureError>
where
    F: FnOnce() -> Result<T, CaptureError>,
{
    f()
}
