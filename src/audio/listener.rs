//! Lifecycle owner for live speech-activity detection.
//!
//! `SpeechActivityDetector` ties the capture stream, the spectrum analyzer,
//! and the energy state machine together on a dedicated worker thread, and
//! raises the caller's callbacks from that thread. `start()` reports failure
//! as a boolean so microphone problems never panic across the public
//! boundary; `stop()` is idempotent and releases the hardware before
//! returning.

use super::analyzer::SpectrumAnalyzer;
use super::capture::{CaptureStream, InputDevice};
use super::detector::{DetectorConfig, EnergyDetector, SpeechEvent};
use anyhow::{anyhow, Context, Result};
use cpal::traits::StreamTrait;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// How long `start()` waits for the worker to acquire the microphone. Covers
/// slow permission prompts without hanging the caller forever.
const STREAM_OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for a listening session.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Preferred input device name; `None` uses the system default.
    pub device: Option<String>,
    /// Analyzer floor: sounds quieter than this register no magnitude.
    pub min_decibels: f32,
    /// Analysis frame duration in milliseconds.
    pub frame_ms: u64,
    /// Capacity of the frame channel between the audio callback and the
    /// analysis loop.
    pub channel_capacity: usize,
    pub detector: DetectorConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            device: None,
            min_decibels: -70.0,
            frame_ms: 16,
            channel_capacity: 64,
            detector: DetectorConfig::default(),
        }
    }
}

/// Per-session counters, logged when the session ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListenerMetrics {
    pub frames_processed: u64,
    pub frames_dropped: usize,
    pub utterances_counted: u64,
    pub utterances_discarded: u64,
    pub noise_floor: Option<f32>,
}

type SharedCallback = Arc<Mutex<dyn FnMut() + Send>>;

struct CaptureSession {
    stop_flag: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<ListenerMetrics>>,
}

pub struct SpeechActivityDetector {
    config: ListenerConfig,
    on_speech_detected: SharedCallback,
    on_speech_ended: SharedCallback,
    session: Option<CaptureSession>,
}

impl SpeechActivityDetector {
    /// `on_speech_detected` fires once per confirmed utterance start;
    /// `on_speech_ended` fires once per utterance that clears the minimum
    /// duration gate. Both run on the worker thread.
    pub fn new<D, E>(on_speech_detected: D, on_speech_ended: E, config: ListenerConfig) -> Self
    where
        D: FnMut() + Send + 'static,
        E: FnMut() + Send + 'static,
    {
        Self {
            config,
            on_speech_detected: Arc::new(Mutex::new(on_speech_detected)),
            on_speech_ended: Arc::new(Mutex::new(on_speech_ended)),
            session: None,
        }
    }

    /// Acquire the microphone and begin detection. Returns false (after
    /// logging) if the stream cannot be opened. If already running, the
    /// previous session is fully torn down first so only one capture stream
    /// is ever open.
    pub fn start(&mut self) -> bool {
        if self.session.is_some() {
            self.stop();
        }
        match self.spawn_session() {
            Ok(session) => {
                self.session = Some(session);
                true
            }
            Err(err) => {
                tracing::error!("failed to start speech detection: {err:#}");
                false
            }
        }
    }

    /// Stop detection and release the microphone. No frame is processed after
    /// this returns. Calling on an already-stopped detector is a no-op.
    pub fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = session.handle.take() {
            match handle.join() {
                Ok(metrics) => {
                    tracing::info!(
                        frames_processed = metrics.frames_processed,
                        frames_dropped = metrics.frames_dropped,
                        utterances_counted = metrics.utterances_counted,
                        utterances_discarded = metrics.utterances_discarded,
                        noise_floor = metrics.noise_floor,
                        "speech detection stopped"
                    );
                }
                Err(_) => tracing::warn!("listener worker panicked during shutdown"),
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    fn spawn_session(&self) -> Result<CaptureSession> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        let config = self.config.clone();
        let on_started = self.on_speech_detected.clone();
        let on_ended = self.on_speech_ended.clone();
        let flag = stop_flag.clone();
        let handle = thread::Builder::new()
            .name("japa-listener".into())
            .spawn(move || run_session(config, on_started, on_ended, flag, ready_tx))
            .context("failed to spawn listener thread")?;

        match ready_rx.recv_timeout(STREAM_OPEN_TIMEOUT) {
            Ok(Ok(())) => Ok(CaptureSession {
                stop_flag,
                handle: Some(handle),
            }),
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                stop_flag.store(true, Ordering::Relaxed);
                let _ = handle.join();
                Err(anyhow!("timed out waiting for the capture stream to open"))
            }
        }
    }
}

impl Drop for SpeechActivityDetector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker body: open the stream, report readiness, then run the per-frame
/// loop until stopped. The stream lives entirely on this thread.
fn run_session(
    config: ListenerConfig,
    on_started: SharedCallback,
    on_ended: SharedCallback,
    stop_flag: Arc<AtomicBool>,
    ready: Sender<Result<()>>,
) -> ListenerMetrics {
    let mut metrics = ListenerMetrics::default();

    let capture = match open_capture(&config) {
        Ok(capture) => {
            let _ = ready.send(Ok(()));
            capture
        }
        Err(err) => {
            let _ = ready.send(Err(err));
            return metrics;
        }
    };

    let mut analyzer = SpectrumAnalyzer::new(capture.sample_rate, config.min_decibels);
    let mut detector = EnergyDetector::new(config.detector.clone());
    let session_epoch = Instant::now();
    let wait = Duration::from_millis(config.frame_ms.max(1));

    while !stop_flag.load(Ordering::Relaxed) {
        match capture.frames.recv_timeout(wait) {
            Ok(frame) => {
                analyzer.push_samples(&frame);
                let energy = analyzer.voice_band_energy();
                metrics.frames_processed += 1;
                let now_ms = session_epoch.elapsed().as_millis() as u64;
                match detector.on_frame(energy, now_ms) {
                    Some(SpeechEvent::Started) => {
                        tracing::debug!(energy, threshold = detector.threshold(), "speech started");
                        invoke(&on_started);
                    }
                    Some(SpeechEvent::Completed { speech_ms }) => {
                        metrics.utterances_counted += 1;
                        tracing::debug!(speech_ms, "utterance completed");
                        invoke(&on_ended);
                    }
                    Some(SpeechEvent::Discarded { speech_ms }) => {
                        metrics.utterances_discarded += 1;
                        tracing::debug!(speech_ms, "utterance too short, not counted");
                    }
                    None => {}
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("audio stream disconnected");
                break;
            }
        }
    }

    // Best-effort teardown: a failed pause must not block the stream drop.
    if let Err(err) = capture.stream.pause() {
        tracing::debug!("failed to pause capture stream: {err}");
    }
    metrics.frames_dropped = capture.dropped.load(Ordering::Relaxed);
    metrics.noise_floor = detector.is_calibrated().then(|| detector.background_noise());
    drop(capture.stream);
    metrics
}

fn open_capture(config: &ListenerConfig) -> Result<CaptureStream> {
    let device = InputDevice::open(config.device.as_deref())?;
    tracing::debug!(device = device.name(), "opening capture stream");
    device.start_capture(config.frame_ms, config.channel_capacity)
}

fn invoke(callback: &SharedCallback) {
    let mut cb = callback.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    cb();
}
