//! japa: a voice-counted mantra repetition tracker.
//!
//! The core is a continuous audio-energy monitor: microphone frames are
//! reduced to a voice-band energy scalar, calibrated against ambient noise,
//! and fed through a debounced speech/silence state machine that reports
//! exactly one completion event per qualifying utterance. No speech-to-text
//! is involved anywhere.

pub mod audio;
pub mod config;
pub mod counter;
pub mod telemetry;
