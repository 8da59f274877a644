use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed reading response body from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Stream `url` into `dest`, returning the number of bytes written.
///
/// The body goes to `<dest>.part` first and is renamed on completion, so a
/// failed transfer never leaves a file at `dest` (or a stale `.part`).
pub fn fetch_to_file(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &Path,
    progress: Option<&ProgressFn>,
) -> Result<u64, FetchError> {
    let temp_path = part_path(dest);

    let result = fetch_inner(client, url, dest, &temp_path, progress);

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

fn fetch_inner(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<&ProgressFn>,
) -> Result<u64, FetchError> {
    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    let mut file = fs::File::create(temp_path).map_err(|e| FetchError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    })?;

    let mut buf = vec![0u8; 1024 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(|e| FetchError::Read {
            url: url.to_string(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(|e| FetchError::Write {
            path: temp_path.to_path_buf(),
            source: e,
        })?;
        downloaded += n as u64;
        if let Some(cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(|e| FetchError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    })?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| FetchError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(downloaded)
}
