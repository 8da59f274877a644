use std::path::Path;

use ffmpeg_next::decoder::Audio as AudioDecoder;
use ffmpeg_next::format::context::Input;
use ffmpeg_next::format::{sample, Sample};
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::frame::audio::Audio as AudioFrame;
use ffmpeg_next::ChannelLayout;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;

type DecodeResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Decodes the best audio stream of a media file with ffmpeg-next,
/// downmixing to mono f32 at the requested rate.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> DecodeResult<Option<AudioSegment>> {
        let Some((mut input, stream_index, mut decoder)) = open_audio(path)? else {
            return Ok(None);
        };

        let mut mono = MonoResampler::new(&decoder, target_sample_rate)?;
        for (stream, packet) in input.packets() {
            if stream.index() == stream_index {
                decoder.send_packet(&packet)?;
                mono.drain(&mut decoder)?;
            }
        }
        decoder.send_eof()?;
        mono.drain(&mut decoder)?;
        let samples = mono.finish();

        log::debug!(
            "Decoded {} samples ({:.2}s) from {}",
            samples.len(),
            samples.len() as f64 / target_sample_rate as f64,
            path.display()
        );

        Ok(Some(AudioSegment::new(samples, target_sample_rate, 1)))
    }

    fn audio_metadata(&self, path: &Path) -> DecodeResult<Option<(u32, u16)>> {
        Ok(open_audio(path)?.map(|(_, _, decoder)| (decoder.rate(), decoder.channels() as u16)))
    }
}

/// Open `path` and a decoder for its best audio stream. `None` when the
/// file has no audio.
fn open_audio(path: &Path) -> DecodeResult<Option<(Input, usize, AudioDecoder)>> {
    ffmpeg_next::init()?;

    let input = ffmpeg_next::format::input(path)?;
    let Some(stream) = input.streams().best(ffmpeg_next::media::Type::Audio) else {
        return Ok(None);
    };
    let stream_index = stream.index();
    let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
        .decoder()
        .audio()?;

    Ok(Some((input, stream_index, decoder)))
}

/// Converts decoded frames to planar mono f32 and collects the samples.
struct MonoResampler {
    context: resampling::Context,
    decoded: AudioFrame,
    resampled: AudioFrame,
    samples: Vec<f32>,
}

impl MonoResampler {
    fn new(decoder: &AudioDecoder, rate: u32) -> DecodeResult<Self> {
        let context = resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            Sample::F32(sample::Type::Planar),
            ChannelLayout::MONO,
            rate,
        )?;
        Ok(Self {
            context,
            decoded: AudioFrame::empty(),
            resampled: AudioFrame::empty(),
            samples: Vec::new(),
        })
    }

    /// Pull every frame the decoder has ready through the resampler.
    fn drain(&mut self, decoder: &mut AudioDecoder) -> DecodeResult<()> {
        while decoder.receive_frame(&mut self.decoded).is_ok() {
            self.context.run(&self.decoded, &mut self.resampled)?;
            append_plane(&self.resampled, &mut self.samples);
        }
        Ok(())
    }

    /// Flush samples still buffered in the resampler.
    fn finish(mut self) -> Vec<f32> {
        if let Ok(Some(delay)) = self.context.flush(&mut self.resampled) {
            if delay.output > 0 {
                append_plane(&self.resampled, &mut self.samples);
            }
        }
        self.samples
    }
}

fn append_plane(frame: &AudioFrame, out: &mut Vec<f32>) {
    let count = frame.samples();
    if count == 0 {
        return;
    }
    let bytes = frame.data(0);
    let plane = unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const f32, count) };
    out.extend_from_slice(plane);
}
