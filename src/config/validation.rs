use super::defaults::{MAX_FRAME_MS, MAX_SESSION_SECS, MIN_DECIBEL_FLOOR, MIN_FRAME_MS};
use super::AppConfig;
use crate::audio::BYTE_CEILING_DB;
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values against the pipeline's bounds.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FRAME_MS..=MAX_FRAME_MS).contains(&self.frame_ms) {
            bail!(
                "--frame-ms must be between {MIN_FRAME_MS} and {MAX_FRAME_MS}, got {}",
                self.frame_ms
            );
        }

        if !(8..=1024).contains(&self.channel_capacity) {
            bail!(
                "--channel-capacity must be between 8 and 1024, got {}",
                self.channel_capacity
            );
        }

        if !(MIN_DECIBEL_FLOOR..BYTE_CEILING_DB).contains(&self.min_decibels) {
            bail!(
                "--min-decibels must be at least {MIN_DECIBEL_FLOOR} and below the {BYTE_CEILING_DB} dB analyzer ceiling, got {}",
                self.min_decibels
            );
        }

        if !(1..=50).contains(&self.entry_frames) {
            bail!(
                "--entry-frames must be between 1 and 50, got {}",
                self.entry_frames
            );
        }

        if !(50..=10_000).contains(&self.min_utterance_ms) {
            bail!(
                "--min-utterance-ms must be between 50 and 10000, got {}",
                self.min_utterance_ms
            );
        }

        if !(200..=30_000).contains(&self.silence_gap_ms) {
            bail!(
                "--silence-gap-ms must be between 200 and 30000, got {}",
                self.silence_gap_ms
            );
        }

        if self.target == Some(0) {
            bail!("--target must be at least 1");
        }

        if let Some(secs) = self.session_secs {
            if secs == 0 || secs > MAX_SESSION_SECS {
                bail!("--session-secs must be between 1 and {MAX_SESSION_SECS}, got {secs}");
            }
        }

        Ok(())
    }
}
