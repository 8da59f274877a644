/// Keep at most `max_chars` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Prompt asking for a 0-100% fluency rating and a short evaluation of the
/// first `max_chars` characters of the transcript.
pub fn build_prompt(transcript: &str, max_chars: usize) -> String {
    format!(
        "\nThis is a transcript of a spoken English video. Please do the following:\n\
         1. Rate the speaker's English fluency on a scale from 0 to 100%.\n\
         2. Provide a short 2-3 sentence evaluation of their speaking quality.\n\
         \n\
         Transcript:\n\
         {}\n",
        truncate_chars(transcript, max_chars)
    )
}
