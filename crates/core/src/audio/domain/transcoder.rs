use std::path::Path;

use crate::shared::analysis_error::AnalysisError;

/// Domain interface for the external media transcoder.
///
/// Both operations produce mono 16 kHz WAV at `output`, overwriting any
/// existing file. Failures are `AnalysisError::Transcode` carrying the
/// transcoder's own diagnostics.
pub trait Transcoder: Send + Sync {
    /// Convert arbitrary media into the speech profile.
    fn normalize(&self, input: &Path, output: &Path) -> Result<(), AnalysisError>;

    /// Keep only the first `seconds` of `input`.
    fn trim(&self, input: &Path, output: &Path, seconds: u32) -> Result<(), AnalysisError>;
}
