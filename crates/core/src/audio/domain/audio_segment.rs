use crate::shared::constants::{TARGET_CHANNELS, WHISPER_SAMPLE_RATE};

/// Decoded PCM audio: interleaved samples normalized to [-1.0, 1.0].
#[derive(Clone, Debug)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// True when the segment already matches the mono 16 kHz speech profile.
    pub fn is_speech_profile(&self) -> bool {
        self.sample_rate == WHISPER_SAMPLE_RATE && self.channels == TARGET_CHANNELS
    }
}
