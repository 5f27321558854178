//! Named defaults shared by the CLI definition and validation.

pub const DEFAULT_MIN_DECIBELS: f32 = -70.0;
pub const DEFAULT_FRAME_MS: u64 = 16;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
pub const DEFAULT_ENTRY_FRAMES: u32 = 5;
pub const DEFAULT_MIN_UTTERANCE_MS: u64 = 800;
pub const DEFAULT_SILENCE_GAP_MS: u64 = 1_500;

pub(super) const MIN_FRAME_MS: u64 = 5;
pub(super) const MAX_FRAME_MS: u64 = 120;
pub(super) const MIN_DECIBEL_FLOOR: f32 = -150.0;
pub(super) const MAX_SESSION_SECS: u64 = 86_400;
