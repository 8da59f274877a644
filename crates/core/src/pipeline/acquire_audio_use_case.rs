use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::acquisition::domain::media_downloader::MediaDownloader;
use crate::acquisition::domain::media_reference::{AcquiredMedia, MediaReference};
use crate::audio::domain::transcoder::Transcoder;
use crate::pipeline::progress_reporter::ProgressReporter;
use crate::shared::analysis_error::AnalysisError;
use crate::shared::constants::NORMALIZED_AUDIO_FILENAME;

/// Turns a media reference into a normalized WAV inside the run's work dir.
pub struct AcquireAudioUseCase {
    youtube: Box<dyn MediaDownloader>,
    direct: Box<dyn MediaDownloader>,
    transcoder: Arc<dyn Transcoder>,
}

impl AcquireAudioUseCase {
    pub fn new(
        youtube: Box<dyn MediaDownloader>,
        direct: Box<dyn MediaDownloader>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            youtube,
            direct,
            transcoder,
        }
    }

    /// Fetch the media. Local files are passed through untouched.
    pub fn acquire(
        &self,
        reference: &MediaReference,
        work_dir: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<AcquiredMedia, AnalysisError> {
        match reference {
            MediaReference::YouTube(url) => {
                reporter.info("Downloading YouTube audio...");
                let path = self.youtube.download(url, work_dir)?;
                Ok(AcquiredMedia::temporary(path))
            }
            MediaReference::Direct(url) => {
                reporter.info("Downloading direct video...");
                let path = self.direct.download(url, work_dir)?;
                Ok(AcquiredMedia::temporary(path))
            }
            MediaReference::Local(path) => {
                reporter.info("Using local file...");
                if !path.is_file() {
                    return Err(AnalysisError::Input(format!(
                        "{} is not a file",
                        path.display()
                    )));
                }
                Ok(AcquiredMedia::user_owned(path.clone()))
            }
        }
    }

    /// Acquire and normalize, returning the path of the mono 16 kHz WAV.
    ///
    /// Downloaded media is deleted once converted; user files never are.
    pub fn run(
        &self,
        reference: &MediaReference,
        work_dir: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<PathBuf, AnalysisError> {
        let media = self.acquire(reference, work_dir, reporter)?;

        reporter.info("Converting to WAV...");
        let output = work_dir.join(NORMALIZED_AUDIO_FILENAME);
        self.transcoder.normalize(&media.path, &output)?;

        if media.is_temporary() {
            if let Err(e) = fs::remove_file(&media.path) {
                log::warn!("Failed to remove {}: {e}", media.path.display());
            }
        }

        Ok(output)
    }
}
