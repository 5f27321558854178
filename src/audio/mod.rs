//! Audio capture, frequency analysis, and utterance detection pipeline.
//!
//! Microphone audio is captured via CPAL, downmixed to mono, and sliced into
//! fixed-duration frames. Each frame updates a rolling FFT window; the mean
//! byte magnitude over the 100-3000 Hz band drives a debounced speech/silence
//! state machine that reports one completion event per qualifying utterance.

mod analyzer;
mod capture;
mod detector;
mod dispatch;
mod listener;

pub use analyzer::{SpectrumAnalyzer, BYTE_CEILING_DB, FFT_SIZE};
pub use capture::InputDevice;
pub use detector::{DetectorConfig, EnergyDetector, SpeechEvent};
pub use listener::{ListenerConfig, ListenerMetrics, SpeechActivityDetector};
