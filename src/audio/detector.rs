//! Utterance detection over per-frame voice-band energy.
//!
//! Classifies each analysis frame as speech or silence against a threshold
//! derived from calibrated background noise, then applies entry and exit
//! debouncing so one sustained vocalization produces exactly one completion
//! event. Pure state machine: consumes `(energy, now_ms)` pairs and owns no
//! I/O, so the timing gates are testable with a synthetic clock.

use std::collections::VecDeque;

/// Frames retained for the short-term energy trend.
pub(super) const ROLLING_BUFFER_FRAMES: usize = 30;

/// Trailing window used for the recent-energy average.
pub(super) const TRAILING_WINDOW_FRAMES: usize = 10;

/// Frames averaged into the locked background noise level.
pub(super) const CALIBRATION_FRAMES: u32 = 50;

/// Lower bound for the calibrated threshold.
pub(super) const THRESHOLD_FLOOR: f32 = 18.0;

/// Multiplier applied to the calibrated background noise level.
pub(super) const NOISE_MULTIPLIER: f32 = 3.0;

/// Fixed threshold used until calibration completes.
pub(super) const BOOTSTRAP_THRESHOLD: f32 = 25.0;

/// Timing and debounce knobs. The defaults are tuned for mantra repetition:
/// short vocalizations separated by deliberate pauses, where the entry gate
/// suppresses clicks, the duration floor rejects coughs and mic bumps, and
/// the silence gap tolerates mid-mantra breathing without splitting one
/// utterance into two.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Consecutive qualifying frames before an utterance opens.
    pub entry_frames: u32,
    /// Minimum voiced duration for a completed utterance to count.
    pub min_utterance_ms: u64,
    /// Silence required after the last voiced frame before the utterance closes.
    pub silence_gap_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            entry_frames: 5,
            min_utterance_ms: 800,
            silence_gap_ms: 1_500,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Sustained voicing confirmed; an utterance is now open.
    Started,
    /// Utterance closed and long enough to count as one repetition.
    Completed { speech_ms: u64 },
    /// Utterance closed but too short to count. No callback fires for these.
    Discarded { speech_ms: u64 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SpeechState {
    Silence,
    Speaking,
}

pub struct EnergyDetector {
    cfg: DetectorConfig,
    buffer: VecDeque<f32>,
    noise_sum: f32,
    calibration_frames: u32,
    background_noise: f32,
    is_calibrated: bool,
    state: SpeechState,
    consecutive_speech: u32,
    consecutive_silence: u32,
    speech_start_ms: u64,
    last_speech_ms: u64,
}

impl EnergyDetector {
    pub fn new(cfg: DetectorConfig) -> Self {
        Self {
            cfg,
            buffer: VecDeque::with_capacity(ROLLING_BUFFER_FRAMES),
            noise_sum: 0.0,
            calibration_frames: 0,
            background_noise: 0.0,
            is_calibrated: false,
            state: SpeechState::Silence,
            consecutive_speech: 0,
            consecutive_silence: 0,
            speech_start_ms: 0,
            last_speech_ms: 0,
        }
    }

    /// Process one analysis frame. `now_ms` is milliseconds from an arbitrary
    /// session epoch and must be monotonically non-decreasing.
    pub fn on_frame(&mut self, voice_energy: f32, now_ms: u64) -> Option<SpeechEvent> {
        self.buffer.push_back(voice_energy);
        if self.buffer.len() > ROLLING_BUFFER_FRAMES {
            self.buffer.pop_front();
        }

        // Calibration frames still flow through classification below, so
        // detection never pauses while the noise floor is being learned.
        if !self.is_calibrated && self.calibration_frames < CALIBRATION_FRAMES {
            self.noise_sum += voice_energy;
            self.calibration_frames += 1;
            if self.calibration_frames == CALIBRATION_FRAMES {
                self.background_noise = self.noise_sum / CALIBRATION_FRAMES as f32;
                self.is_calibrated = true;
                tracing::debug!(
                    noise_floor = self.background_noise,
                    "background noise calibrated"
                );
            }
        }

        let window = self.buffer.len().min(TRAILING_WINDOW_FRAMES);
        let avg_recent = self.buffer.iter().rev().take(window).sum::<f32>() / window as f32;
        let threshold = self.threshold();

        // Both the instantaneous and the short-trend energy must clear the
        // bar, which rejects single-frame spikes and dropouts.
        if voice_energy > threshold && avg_recent > threshold {
            self.consecutive_speech += 1;
            self.consecutive_silence = 0;

            if self.state == SpeechState::Silence
                && self.consecutive_speech >= self.cfg.entry_frames
            {
                self.state = SpeechState::Speaking;
                self.speech_start_ms = now_ms;
                self.last_speech_ms = now_ms;
                return Some(SpeechEvent::Started);
            }
            if self.state == SpeechState::Speaking {
                self.last_speech_ms = now_ms;
            }
            None
        } else {
            self.consecutive_silence += 1;
            self.consecutive_speech = 0;

            if self.state == SpeechState::Speaking {
                let silence_ms = now_ms.saturating_sub(self.last_speech_ms);
                if silence_ms > self.cfg.silence_gap_ms {
                    let speech_ms = self.last_speech_ms.saturating_sub(self.speech_start_ms);
                    self.state = SpeechState::Silence;
                    return if speech_ms >= self.cfg.min_utterance_ms {
                        Some(SpeechEvent::Completed { speech_ms })
                    } else {
                        Some(SpeechEvent::Discarded { speech_ms })
                    };
                }
            }
            None
        }
    }

    /// Current classification threshold.
    pub fn threshold(&self) -> f32 {
        if self.is_calibrated {
            (self.background_noise * NOISE_MULTIPLIER).max(THRESHOLD_FLOOR)
        } else {
            BOOTSTRAP_THRESHOLD
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.is_calibrated
    }

    pub fn background_noise(&self) -> f32 {
        self.background_noise
    }

    pub fn is_speaking(&self) -> bool {
        self.state == SpeechState::Speaking
    }

    pub fn consecutive_speech_frames(&self) -> u32 {
        self.consecutive_speech
    }

    pub fn consecutive_silence_frames(&self) -> u32 {
        self.consecutive_silence
    }

    /// Clear all transient state, including the calibration lock.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.noise_sum = 0.0;
        self.calibration_frames = 0;
        self.background_noise = 0.0;
        self.is_calibrated = false;
        self.state = SpeechState::Silence;
        self.consecutive_speech = 0;
        self.consecutive_silence = 0;
        self.speech_start_ms = 0;
        self.last_speech_ms = 0;
    }
}
