/// A timed span of recognized speech. Times are in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Output of one speech-recognition pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptionResult {
    segments: Vec<Segment>,
    duration: f64,
}

impl TranscriptionResult {
    pub fn new(segments: Vec<Segment>, duration: f64) -> Self {
        Self { segments, duration }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Duration of the transcribed audio in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Join segment texts into the working transcript: each trimmed text
/// followed by a newline, in segment order.
///
/// `on_segment(done, total)` fires after each segment is appended.
pub fn assemble_transcript(
    segments: &[Segment],
    mut on_segment: impl FnMut(usize, usize),
) -> String {
    let total = segments.len();
    let mut transcript = String::new();
    for (i, segment) in segments.iter().enumerate() {
        transcript.push_str(segment.text.trim());
        transcript.push('\n');
        on_segment(i + 1, total);
    }
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_trims_and_terminates_each_segment() {
        let segments = vec![
            Segment::new(" Hello", 0.0, 0.5),
            Segment::new("world ", 0.5, 1.0),
        ];
        let transcript = assemble_transcript(&segments, |_, _| {});
        assert_eq!(transcript, "Hello\nworld\n");
    }

    #[test]
    fn test_assemble_reports_progress_per_segment() {
        let segments = vec![
            Segment::new("a", 0.0, 1.0),
            Segment::new("b", 1.0, 2.0),
            Segment::new("c", 2.0, 3.0),
        ];
        let mut calls = Vec::new();
        assemble_transcript(&segments, |done, total| calls.push((done, total)));
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_assemble_empty_is_empty_string() {
        let mut called = false;
        let transcript = assemble_transcript(&[], |_, _| called = true);
        assert!(transcript.is_empty());
        assert!(!called);
    }

    #[test]
    fn test_result_accessors() {
        let result = TranscriptionResult::new(vec![Segment::new("hi", 0.0, 0.4)], 12.5);
        assert_eq!(result.segments().len(), 1);
        assert_eq!(result.duration(), 12.5);
        assert!(!result.is_empty());
        assert!(TranscriptionResult::new(vec![], 1.0).is_empty());
    }
}
