//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use crate::audio::{DetectorConfig, ListenerConfig};
use clap::Parser;

pub use defaults::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_ENTRY_FRAMES, DEFAULT_FRAME_MS, DEFAULT_MIN_DECIBELS,
    DEFAULT_MIN_UTTERANCE_MS, DEFAULT_SILENCE_GAP_MS,
};

/// CLI options for the japa counter. Validated values keep the audio pipeline
/// within sane bounds.
#[derive(Debug, Parser, Clone)]
#[command(name = "japa", about = "japa: voice-counted mantra repetition tracker", author, version)]
pub struct AppConfig {
    /// Preferred audio input device name
    #[arg(long = "input-device")]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Analyzer noise floor in decibels; quieter sounds register no magnitude
    #[arg(
        long = "min-decibels",
        env = "JAPA_MIN_DECIBELS",
        default_value_t = DEFAULT_MIN_DECIBELS,
        allow_hyphen_values = true
    )]
    pub min_decibels: f32,

    /// Analysis frame duration (milliseconds)
    #[arg(long = "frame-ms", default_value_t = DEFAULT_FRAME_MS)]
    pub frame_ms: u64,

    /// Frame channel capacity between the capture callback and analysis loop
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Consecutive speech frames required before an utterance opens
    #[arg(long = "entry-frames", default_value_t = DEFAULT_ENTRY_FRAMES)]
    pub entry_frames: u32,

    /// Minimum utterance duration for a repetition to count (milliseconds)
    #[arg(long = "min-utterance-ms", default_value_t = DEFAULT_MIN_UTTERANCE_MS)]
    pub min_utterance_ms: u64,

    /// Silence required after speech before an utterance closes (milliseconds)
    #[arg(long = "silence-gap-ms", default_value_t = DEFAULT_SILENCE_GAP_MS)]
    pub silence_gap_ms: u64,

    /// Stop after this many counted repetitions
    #[arg(long)]
    pub target: Option<u64>,

    /// Stop after this many seconds
    #[arg(long = "session-secs")]
    pub session_secs: Option<u64>,

    /// Print a JSON session summary on exit
    #[arg(long = "summary-json", default_value_t = false)]
    pub summary_json: bool,

    /// Enable JSON trace logging to file
    #[arg(long = "logs", env = "JAPA_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs)
    #[arg(long = "no-logs", env = "JAPA_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

impl AppConfig {
    /// Listener settings derived from the validated CLI values.
    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            device: self.input_device.clone(),
            min_decibels: self.min_decibels,
            frame_ms: self.frame_ms,
            channel_capacity: self.channel_capacity,
            detector: DetectorConfig {
                entry_frames: self.entry_frames,
                min_utterance_ms: self.min_utterance_ms,
                silence_gap_ms: self.silence_gap_ms,
            },
        }
    }
}
