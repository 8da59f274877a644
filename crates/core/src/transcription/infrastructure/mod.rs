pub mod threaded_transcriber;
pub mod whisper_recognizer;
