//! Microphone acquisition via CPAL.
//!
//! Handles device enumeration, stream construction for the supported sample
//! formats, and the frame pump feeding the analysis thread. All samples are
//! converted to mono f32 at the device's native rate; the analyzer computes
//! its frequency bins from that rate, so no resampling is needed.

use super::dispatch::FrameSlicer;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Audio input device wrapper.
pub struct InputDevice {
    device: cpal::Device,
}

impl InputDevice {
    /// List microphone names so the CLI can expose a human-friendly selector.
    pub fn list() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Open an input device, optionally forcing a specific one by name so
    /// users can pick the right microphone when several inputs exist.
    pub fn open(preferred: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred {
            Some(name) => {
                let mut devices = host.input_devices().context("no input devices available")?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| anyhow!("input device '{name}' not found"))?
            }
            None => host.default_input_device().with_context(|| {
                format!("no default input device available. {}", mic_permission_hint())
            })?,
        };
        Ok(Self { device })
    }

    /// Name of the selected device.
    pub fn name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown Device".to_string())
    }

    /// Open the capture stream and start the frame pump. The returned stream
    /// keeps capturing until it is dropped; frames of `frame_ms` worth of mono
    /// samples arrive on the receiver.
    pub(super) fn start_capture(&self, frame_ms: u64, channel_capacity: usize) -> Result<CaptureStream> {
        let default_config = self
            .device
            .default_input_config()
            .context("failed to query default input config")?;
        let format = default_config.sample_format();
        let device_config: StreamConfig = default_config.into();
        let sample_rate = device_config.sample_rate.0;
        let channels = usize::from(device_config.channels.max(1));
        let frame_samples = ((u64::from(sample_rate) * frame_ms) / 1000).max(1) as usize;

        let (sender, receiver) = bounded::<Vec<f32>>(channel_capacity.max(1));
        let dropped = Arc::new(AtomicUsize::new(0));
        let slicer = Arc::new(Mutex::new(FrameSlicer::new(
            frame_samples,
            sender,
            dropped.clone(),
        )));

        let err_fn = |err| tracing::warn!("audio stream error: {err}");
        let stream = match format {
            SampleFormat::F32 => {
                let slicer = slicer.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[f32], _| {
                        if let Ok(mut pump) = slicer.try_lock() {
                            pump.push(data, channels, |sample| sample);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            SampleFormat::I16 => {
                let slicer = slicer.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[i16], _| {
                        if let Ok(mut pump) = slicer.try_lock() {
                            pump.push(data, channels, |sample| sample as f32 / 32_768.0);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            SampleFormat::U16 => {
                let slicer = slicer.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[u16], _| {
                        if let Ok(mut pump) = slicer.try_lock() {
                            pump.push(data, channels, |sample| {
                                (sample as f32 - 32_768.0) / 32_768.0
                            });
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )?
            }
            other => return Err(anyhow!("unsupported sample format: {other:?}")),
        };

        stream.play().context("failed to start capture stream")?;

        Ok(CaptureStream {
            stream,
            frames: receiver,
            dropped,
            sample_rate,
        })
    }
}

/// A live capture session: the CPAL stream plus the frame channel out of it.
/// Not `Send`; lives entirely on the thread that opened it.
pub(super) struct CaptureStream {
    pub(super) stream: cpal::Stream,
    pub(super) frames: Receiver<Vec<f32>>,
    pub(super) dropped: Arc<AtomicUsize>,
    pub(super) sample_rate: u32,
}

pub(super) fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}
