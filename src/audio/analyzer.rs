//! Rolling-window frequency analysis.
//!
//! Keeps the most recent `FFT_SIZE` mono samples, and on each analysis tick
//! produces byte-valued frequency magnitudes (0-255 between a configurable
//! decibel floor and a fixed ceiling) with a light exponential smoothing
//! pass. Only the mean magnitude over the voice band is exposed; low-frequency
//! rumble and high-frequency hiss are excluded by construction.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

/// FFT window length in samples.
pub const FFT_SIZE: usize = 2048;

/// Magnitudes at or above this level saturate the byte scale.
pub const BYTE_CEILING_DB: f32 = -30.0;

/// Weight given to the previous spectrum. Kept low so transients survive.
const SMOOTHING_TIME_CONSTANT: f32 = 0.1;

/// Voice band bounds in Hz. Covers fundamentals and low harmonics of chanted
/// speech while skipping rumble below and hiss above.
const VOICE_BAND_LOW_HZ: u64 = 100;
const VOICE_BAND_HIGH_HZ: u64 = 3_000;

pub struct SpectrumAnalyzer {
    min_decibels: f32,
    fft: Arc<dyn Fft<f32>>,
    hann: Vec<f32>,
    window: VecDeque<f32>,
    smoothed: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    band_start: usize,
    band_end: usize,
    band_len: usize,
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate: u32, min_decibels: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let hann: Vec<f32> = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (FFT_SIZE - 1) as f32).cos()))
            .collect();
        let (band_start, band_end) = voice_band(sample_rate);
        let num_bins = FFT_SIZE / 2;
        let band_end = band_end.min(num_bins);
        Self {
            min_decibels,
            fft,
            hann,
            window: VecDeque::with_capacity(FFT_SIZE),
            smoothed: vec![0.0; num_bins],
            scratch: Vec::with_capacity(FFT_SIZE),
            band_start,
            band_end,
            band_len: (band_end - band_start).max(1),
        }
    }

    /// Append captured samples to the rolling window, evicting the oldest.
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            if self.window.len() == FFT_SIZE {
                self.window.pop_front();
            }
            self.window.push_back(sample);
        }
    }

    /// Run one analysis pass over the current window and return the mean byte
    /// magnitude across the voice band. Windows shorter than `FFT_SIZE` are
    /// zero-padded at the front, so early ticks simply read low.
    pub fn voice_band_energy(&mut self) -> f32 {
        let pad = FFT_SIZE - self.window.len();
        self.scratch.clear();
        self.scratch
            .extend(std::iter::repeat(Complex::new(0.0f32, 0.0)).take(pad));
        for (i, &sample) in self.window.iter().enumerate() {
            self.scratch
                .push(Complex::new(sample * self.hann[pad + i], 0.0));
        }

        self.fft.process(&mut self.scratch);

        let num_bins = FFT_SIZE / 2;
        let mut sum = 0.0f32;
        for bin in 0..num_bins {
            let c = self.scratch[bin];
            let magnitude = (c.re * c.re + c.im * c.im).sqrt() / FFT_SIZE as f32;
            let smoothed = SMOOTHING_TIME_CONSTANT * self.smoothed[bin]
                + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
            self.smoothed[bin] = smoothed;
            if bin >= self.band_start && bin < self.band_end {
                sum += f32::from(byte_magnitude(smoothed, self.min_decibels));
            }
        }
        sum / self.band_len as f32
    }
}

/// Frequency bin range covering the voice band for the given sample rate.
pub(super) fn voice_band(sample_rate: u32) -> (usize, usize) {
    let rate = u64::from(sample_rate.max(1));
    let start = (VOICE_BAND_LOW_HZ * FFT_SIZE as u64 / rate) as usize;
    let end = (VOICE_BAND_HIGH_HZ * FFT_SIZE as u64 / rate) as usize;
    (start, end.max(start + 1))
}

/// Convert a linear magnitude to the 0-255 byte scale between `min_db` and
/// the fixed ceiling.
pub(super) fn byte_magnitude(linear: f32, min_db: f32) -> u8 {
    if linear <= 0.0 {
        return 0;
    }
    let db = 20.0 * linear.log10();
    let scaled = 255.0 * (db - min_db) / (BYTE_CEILING_DB - min_db);
    scaled.clamp(0.0, 255.0) as u8
}
