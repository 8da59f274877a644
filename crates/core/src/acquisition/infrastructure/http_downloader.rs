use std::path::{Path, PathBuf};

use crate::acquisition::domain::media_downloader::MediaDownloader;
use crate::shared::analysis_error::AnalysisError;
use crate::shared::constants::DIRECT_DOWNLOAD_FILENAME;
use crate::shared::http_fetch;

/// Fetches a media file over plain HTTP(S) into `<work_dir>/temp_video.mp4`.
///
/// No content-type or size checks: whatever the server returns is handed to
/// the transcoder. The request has no overall timeout.
pub struct HttpDownloader;

impl MediaDownloader for HttpDownloader {
    fn download(&self, url: &str, work_dir: &Path) -> Result<PathBuf, AnalysisError> {
        let dest = work_dir.join(DIRECT_DOWNLOAD_FILENAME);
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| AnalysisError::Download(e.to_string()))?;

        let bytes = http_fetch::fetch_to_file(&client, url, &dest, None)
            .map_err(|e| AnalysisError::Download(e.to_string()))?;
        log::debug!("Fetched {bytes} bytes from {url}");

        Ok(dest)
    }
}
