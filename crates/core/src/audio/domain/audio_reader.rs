use crate::audio::domain::audio_segment::AudioSegment;
use std::path::Path;

/// Domain interface for decoding audio from a media file.
pub trait AudioReader: Send + Sync {
    /// Decode the audio track to a mono PCM AudioSegment at the given sample rate.
    /// Returns None if the file has no audio track.
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;

    /// Return the stored audio sample rate and channel count without decoding.
    fn audio_metadata(&self, path: &Path)
        -> Result<Option<(u32, u16)>, Box<dyn std::error::Error>>;
}
