use std::path::{Path, PathBuf};

use crate::shared::analysis_error::AnalysisError;
use crate::shared::constants::YOUTUBE_HOSTS;

/// Where the media for an analysis run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaReference {
    YouTube(String),
    Direct(String),
    Local(PathBuf),
}

impl MediaReference {
    /// Classify a user-supplied input string.
    ///
    /// Checks run in a fixed order: YouTube host substring, then HTTP(S)
    /// scheme prefix, then an existing local path. A local file literally
    /// named `youtube.com` is therefore treated as a YouTube reference.
    pub fn parse(input: &str) -> Result<Self, AnalysisError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AnalysisError::Input("no video URL or path given".to_string()));
        }

        if YOUTUBE_HOSTS.iter().any(|host| input.contains(host)) {
            return Ok(Self::YouTube(input.to_string()));
        }

        if has_http_scheme(input) {
            return Ok(Self::Direct(input.to_string()));
        }

        let path = Path::new(input);
        if path.exists() {
            return Ok(Self::Local(path.to_path_buf()));
        }

        Err(AnalysisError::Input(format!(
            "'{input}' is not a YouTube URL, an http(s) URL or an existing file"
        )))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::YouTube(_) => "YouTube",
            Self::Direct(_) => "direct URL",
            Self::Local(_) => "local file",
        }
    }
}

fn has_http_scheme(input: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        input
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Who is responsible for deleting an acquired media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaOwnership {
    /// Downloaded by the pipeline; removed once normalized.
    Temporary,
    /// Supplied by the user; never removed.
    UserOwned,
}

/// A local media file ready for normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredMedia {
    pub path: PathBuf,
    pub ownership: MediaOwnership,
}

impl AcquiredMedia {
    pub fn temporary(path: PathBuf) -> Self {
        Self {
            path,
            ownership: MediaOwnership::Temporary,
        }
    }

    pub fn user_owned(path: PathBuf) -> Self {
        Self {
            path,
            ownership: MediaOwnership::UserOwned,
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.ownership == MediaOwnership::Temporary
    }
}
