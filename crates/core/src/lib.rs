pub mod acquisition {
    pub mod domain {
        pub mod media_downloader;
        pub mod media_reference;
    }
    pub mod infrastructure;
}

pub mod audio {
    pub mod domain {
        pub mod audio_reader;
        pub mod audio_segment;
        pub mod transcoder;
    }
    pub mod infrastructure;
}

pub mod transcription {
    pub mod domain {
        pub mod speech_recognizer;
        pub mod transcript;
    }
    pub mod infrastructure;
}

pub mod classification {
    pub mod domain {
        pub mod accent;
        pub mod accent_classifier;
    }
    pub mod infrastructure;
}

pub mod evaluation {
    pub mod domain {
        pub mod fluency_evaluator;
        pub mod fluency_prompt;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod acquire_audio_use_case;
    pub mod analysis_report;
    pub mod analyze_video_use_case;
    pub mod classify_accent_use_case;
    pub mod model_registry;
    pub mod progress_reporter;
    pub mod transcribe_audio_use_case;
}

pub mod shared {
    pub mod analysis_config;
    pub mod analysis_error;
    pub mod constants;
    pub mod http_fetch;
    pub mod model_resolver;
    #[cfg(test)]
    pub(crate) mod test_support;
}
