//! Fallback tone playback via `cpal`.
//!
//! [`CpalAudio`] plays a synthesised sine tone on the default output device.
//! Desktop hosts have no audio-session categories, so
//! [`set_session_mode`](AudioPlatform::set_session_mode) only verifies that
//! an output device exists.
//!
//! `cpal::Stream` is not `Send`, so each tone builds, plays and drops its
//! stream inside a single `spawn_blocking` call.

use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use thiserror::Error;

use super::{AudioPlatform, PlatformError, SessionMode, SoundSource};

/// Attack/release ramp so the tone starts and ends without a click.
const RAMP_MS: u64 = 10;

// ---------------------------------------------------------------------------
// ToneError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
enum ToneError {
    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format: {0:?}")]
    SampleFormat(cpal::SampleFormat),
}

// ---------------------------------------------------------------------------
// ToneGenerator
// ---------------------------------------------------------------------------

/// Sine oscillator with a linear attack/release envelope; silent once the
/// requested duration has elapsed.
#[derive(Debug, Clone)]
struct ToneGenerator {
    phase_step: f32,
    phase: f32,
    volume: f32,
    position: u64,
    total: u64,
    ramp: u64,
}

impl ToneGenerator {
    fn new(frequency_hz: f32, duration_ms: u64, volume: f32, sample_rate: u32) -> Self {
        let sample_rate = u64::from(sample_rate.max(1));
        let total = duration_ms * sample_rate / 1000;
        let ramp = (RAMP_MS * sample_rate / 1000).min(total / 2);
        Self {
            phase_step: std::f32::consts::TAU * frequency_hz / sample_rate as f32,
            phase: 0.0,
            volume: volume.clamp(0.0, 1.0),
            position: 0,
            total,
            ramp,
        }
    }

    fn is_finished(&self) -> bool {
        self.position >= self.total
    }

    fn envelope(&self) -> f32 {
        if self.ramp == 0 {
            return 1.0;
        }
        let from_end = self.total - self.position;
        let edge = self.position.min(from_end) as f32;
        (edge / self.ramp as f32).min(1.0)
    }

    fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        let value = self.phase.sin() * self.volume * self.envelope();
        self.phase = (self.phase + self.phase_step) % std::f32::consts::TAU;
        self.position += 1;
        value
    }
}

fn write_frames<T>(output: &mut [T], channels: usize, tone: &mut ToneGenerator)
where
    T: SizedSample + FromSample<f32>,
{
    for frame in output.chunks_mut(channels.max(1)) {
        let value = T::from_sample(tone.next_sample());
        for sample in frame.iter_mut() {
            *sample = value;
        }
    }
}

fn play_on_device<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tone: ToneGenerator,
    duration: Duration,
) -> Result<(), ToneError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut tone = tone;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            write_frames(data, channels, &mut tone);
        },
        |err: cpal::StreamError| {
            log::error!("cpal output stream error: {err}");
        },
        None,
    )?;
    stream.play()?;
    // Keep the stream alive for the tone plus one ramp of slack.
    std::thread::sleep(duration + Duration::from_millis(RAMP_MS));
    Ok(())
}

fn play_tone_blocking(frequency_hz: f32, duration_ms: u64, volume: f32) -> Result<(), ToneError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(ToneError::NoDevice)?;
    let supported = device.default_output_config()?;
    let format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let tone = ToneGenerator::new(frequency_hz, duration_ms, volume, config.sample_rate.0);
    let duration = Duration::from_millis(duration_ms);

    match format {
        cpal::SampleFormat::F32 => play_on_device::<f32>(&device, &config, tone, duration),
        cpal::SampleFormat::I16 => play_on_device::<i16>(&device, &config, tone, duration),
        cpal::SampleFormat::U16 => play_on_device::<u16>(&device, &config, tone, duration),
        other => Err(ToneError::SampleFormat(other)),
    }
}

// ---------------------------------------------------------------------------
// CpalAudio
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct CpalAudio;

impl CpalAudio {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioPlatform for CpalAudio {
    async fn set_session_mode(&self, mode: &SessionMode) -> Result<(), PlatformError> {
        log::debug!("audio: session mode {mode:?}");
        let has_device = tokio::task::spawn_blocking(|| {
            cpal::default_host().default_output_device().is_some()
        })
        .await
        .map_err(|e| PlatformError::Session(e.to_string()))?;
        if has_device {
            Ok(())
        } else {
            Err(PlatformError::Unavailable("audio output device"))
        }
    }

    async fn play_sound(&self, source: &SoundSource, volume: f32) -> Result<(), PlatformError> {
        let SoundSource::Tone {
            frequency_hz,
            duration_ms,
        } = *source;

        tokio::task::spawn_blocking(move || play_tone_blocking(frequency_hz, duration_ms, volume))
            .await
            .map_err(|e| PlatformError::Playback(format!("tone task failed: {e}")))?
            .map_err(|e| match e {
                ToneError::NoDevice => PlatformError::Unavailable("audio output device"),
                other => PlatformError::Playback(other.to_string()),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
