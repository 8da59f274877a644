use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::APP_DIR_NAME;
use super::http_fetch::{self, FetchError, ProgressFn};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed: {0}")]
    Download(#[from] FetchError),
    #[error("model {name} not found in {searched}")]
    NotFound { name: String, searched: String },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Look a model file up by name without downloading.
///
/// Checks the user cache directory first, then `bundled_dir`.
pub fn locate(name: &str, bundled_dir: Option<&Path>) -> Result<Option<PathBuf>, ModelResolveError> {
    let cached_path = model_cache_dir()?.join(name);
    if cached_path.exists() {
        return Ok(Some(cached_path));
    }

    Ok(bundled_dir
        .map(|dir| dir.join(name))
        .filter(|path| path.exists()))
}

/// Like [`locate`], but a missing model is an error.
pub fn require(name: &str, bundled_dir: Option<&Path>) -> Result<PathBuf, ModelResolveError> {
    locate(name, bundled_dir)?.ok_or_else(|| ModelResolveError::NotFound {
        name: name.to_string(),
        searched: model_cache_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_default(),
    })
}

/// Resolve a model file by name, checking cache locations before downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled path (for development / pre-packaged installs)
/// 3. Download from URL to cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = locate(name, bundled_dir)? {
        return Ok(path);
    }

    let cache_dir = model_cache_dir()?;
    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    let cached_path = cache_dir.join(name);
    log::info!("Downloading {name} from {url}");
    let client = reqwest::blocking::Client::builder()
        .timeout(None::<std::time::Duration>)
        .build()
        .map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;
    http_fetch::fetch_to_file(&client, url, &cached_path, progress.as_ref())?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/AccentScope/models/`
/// - Linux: `$XDG_CACHE_HOME/AccentScope/models/` or `~/.cache/AccentScope/models/`
/// - Windows: `%LOCALAPPDATA%/AccentScope/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME).join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join(APP_DIR_NAME).join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}
