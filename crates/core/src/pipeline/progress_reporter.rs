use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// The user-visible steps of an analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Acquire,
    Transcribe,
    Classify,
    Evaluate,
}

impl Stage {
    pub const ALL: &[Stage] = &[
        Stage::Acquire,
        Stage::Transcribe,
        Stage::Classify,
        Stage::Evaluate,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Stage::Acquire => "Downloading and converting audio",
            Stage::Transcribe => "Transcribing audio",
            Stage::Classify => "Classifying accent",
            Stage::Evaluate => "Evaluating fluency",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Acquire => write!(f, "acquire"),
            Stage::Transcribe => write!(f, "transcribe"),
            Stage::Classify => write!(f, "classify"),
            Stage::Evaluate => write!(f, "evaluate"),
        }
    }
}

/// Presentation-layer sink for pipeline events.
///
/// Decouples the orchestration from how progress is shown (log lines,
/// terminal, a GUI) so callers can observe a run without changing it.
pub trait ProgressReporter: Send {
    fn stage_started(&mut self, stage: Stage);

    /// Fraction of the stage completed, in [0, 1].
    fn stage_progress(&mut self, stage: Stage, fraction: f64);

    fn stage_succeeded(&mut self, stage: Stage, message: &str);

    fn stage_failed(&mut self, stage: Stage, message: &str);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// A problem that did not stop the run.
    fn warn(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent reporter that discards all events.
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {
    fn stage_started(&mut self, _stage: Stage) {}
    fn stage_progress(&mut self, _stage: Stage, _fraction: f64) {}
    fn stage_succeeded(&mut self, _stage: Stage, _message: &str) {}
    fn stage_failed(&mut self, _stage: Stage, _message: &str) {}
    fn info(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Failed,
}

/// Reporter writing through the `log` crate that also times each stage
/// and produces a summary at the end of the run.
///
/// Progress lines are throttled to one per `step_percent` of a stage.
pub struct LogProgressReporter {
    step_percent: u32,
    start_time: Instant,
    running: HashMap<Stage, Instant>,
    last_percent: HashMap<Stage, u32>,
    finished: Vec<(Stage, StageOutcome, f64)>,
    messages: Vec<String>,
}

impl LogProgressReporter {
    pub fn new(step_percent: u32) -> Self {
        Self {
            step_percent: step_percent.clamp(1, 100),
            start_time: Instant::now(),
            running: HashMap::new(),
            last_percent: HashMap::new(),
            finished: Vec::new(),
            messages: Vec::new(),
        }
    }

    fn finish(&mut self, stage: Stage, outcome: StageOutcome) {
        let elapsed_ms = self
            .running
            .remove(&stage)
            .map(|start| start.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        self.last_percent.remove(&stage);
        self.finished.push((stage, outcome, elapsed_ms));
    }

    /// Outcome and duration (ms) of every finished stage, in finish order.
    pub fn finished(&self) -> &[(Stage, StageOutcome, f64)] {
        &self.finished
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns the formatted summary string, or `None` if no stage finished.
    pub fn summary_string(&self) -> Option<String> {
        if self.finished.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Run summary ({:.1}s total):",
            elapsed_ms / 1000.0
        )];

        for (stage, outcome, duration_ms) in &self.finished {
            let pct = if elapsed_ms > 0.0 {
                duration_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            let status = match outcome {
                StageOutcome::Succeeded => "ok",
                StageOutcome::Failed => "FAILED",
            };
            let stage = stage.to_string();
            lines.push(format!(
                "  {stage:12}: {status:6} {duration_ms:8.0}ms  ({pct:4.1}%)"
            ));
        }

        Some(lines.join("\n"))
    }
}

impl Default for LogProgressReporter {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressReporter for LogProgressReporter {
    fn stage_started(&mut self, stage: Stage) {
        self.running.insert(stage, Instant::now());
        log::info!("{}...", stage.description());
    }

    fn stage_progress(&mut self, stage: Stage, fraction: f64) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u32;
        let last = self.last_percent.get(&stage).copied();
        let due = match last {
            None => true,
            Some(last) => percent == 100 || percent >= last + self.step_percent,
        };
        if due && last != Some(percent) {
            self.last_percent.insert(stage, percent);
            log::info!("{}: {percent}%", stage.description());
        }
    }

    fn stage_succeeded(&mut self, stage: Stage, message: &str) {
        self.finish(stage, StageOutcome::Succeeded);
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn stage_failed(&mut self, stage: Stage, message: &str) {
        self.finish(stage, StageOutcome::Failed);
        self.messages.push(message.to_string());
        log::error!("{} failed: {message}", stage.description());
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn warn(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::warn!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
