use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::audio::domain::transcoder::Transcoder;
use crate::shared::analysis_error::AnalysisError;
use crate::shared::constants::{TARGET_CHANNELS, WHISPER_SAMPLE_RATE};

/// Transcodes media by running the `ffmpeg` executable.
///
/// stderr is captured and handed back untouched on failure so the user sees
/// exactly what ffmpeg complained about.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: Vec<OsString>) -> Result<(), AnalysisError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        log::debug!("Running transcoder: {cmd:?}");

        let output = cmd.output().map_err(|e| AnalysisError::Transcode {
            message: format!("failed to run {}", self.program.display()),
            diagnostics: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(AnalysisError::Transcode {
                message: format!("ffmpeg exited with {}", output.status),
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcoder for FfmpegTranscoder {
    fn normalize(&self, input: &Path, output: &Path) -> Result<(), AnalysisError> {
        self.run(speech_profile_args(input, output, None))
    }

    fn trim(&self, input: &Path, output: &Path, seconds: u32) -> Result<(), AnalysisError> {
        self.run(speech_profile_args(input, output, Some(seconds)))
    }
}

/// Arguments for a mono 16 kHz PCM WAV conversion, optionally capped.
fn speech_profile_args(input: &Path, output: &Path, duration: Option<u32>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-nostdin".into(),
        "-hide_banner".into(),
        "-i".into(),
        input.as_os_str().to_os_string(),
        "-vn".into(),
        "-ac".into(),
        TARGET_CHANNELS.to_string().into(),
        "-ar".into(),
        WHISPER_SAMPLE_RATE.to_string().into(),
    ];
    if let Some(seconds) = duration {
        args.push("-t".into());
        args.push(seconds.to_string().into());
    }
    args.push("-c:a".into());
    args.push("pcm_s16le".into());
    args.push(output.as_os_str().to_os_string());
    args
}
