use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::acquisition::domain::media_downloader::MediaDownloader;
use crate::shared::analysis_error::AnalysisError;
use crate::shared::constants::{YOUTUBE_AUDIO_FORMAT, YOUTUBE_TEMP_STEM};

/// Downloads the best available audio track of a video with `yt-dlp`.
///
/// The output lands at `<work_dir>/temp_audio.<ext>`; the extension is
/// whatever the post-processor produced, so the file is found afterwards by
/// its stem.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    program: PathBuf,
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self::with_program("yt-dlp")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDownloader for YtDlpDownloader {
    fn download(&self, url: &str, work_dir: &Path) -> Result<PathBuf, AnalysisError> {
        let template = work_dir.join(format!("{YOUTUBE_TEMP_STEM}.%(ext)s"));

        let mut cmd = Command::new(&self.program);
        cmd.args(["--format", "bestaudio/best"])
            .args(["--extract-audio", "--audio-format", YOUTUBE_AUDIO_FORMAT])
            .args(["--no-playlist", "--quiet", "--no-warnings"])
            .arg("--output")
            .arg(&template)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        log::debug!("Running downloader: {cmd:?}");

        let output = cmd.output().map_err(|e| {
            AnalysisError::Download(format!("failed to run {}: {e}", self.program.display()))
        })?;

        if !output.status.success() {
            return Err(AnalysisError::Download(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        find_downloaded(work_dir)?
            .ok_or_else(|| AnalysisError::Download("yt-dlp produced no audio file".to_string()))
    }
}

/// First completed `temp_audio.*` file in `work_dir`, in name order.
fn find_downloaded(work_dir: &Path) -> Result<Option<PathBuf>, AnalysisError> {
    let prefix = format!("{YOUTUBE_TEMP_STEM}.");
    let entries = fs::read_dir(work_dir).map_err(|e| AnalysisError::io(work_dir, e))?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix) && !n.ends_with(".part"))
        })
        .collect();
    matches.sort();

    Ok(matches.into_iter().next())
}
