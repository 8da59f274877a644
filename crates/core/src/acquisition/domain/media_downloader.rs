use std::path::{Path, PathBuf};

use crate::shared::analysis_error::AnalysisError;

/// Domain interface for fetching remote media into a local directory.
///
/// Implementations return the path of the file they produced inside
/// `work_dir`, or `AnalysisError::Download`.
pub trait MediaDownloader: Send + Sync {
    fn download(&self, url: &str, work_dir: &Path) -> Result<PathBuf, AnalysisError>;
}
