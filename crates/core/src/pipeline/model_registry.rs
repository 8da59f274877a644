use std::sync::{Arc, Mutex};

use crate::classification::domain::accent_classifier::AccentClassifier;
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;

pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

type Factory<T> = Box<dyn Fn() -> Result<Arc<T>, LoadError> + Send + Sync>;

/// A shared handle built on first request.
///
/// The slot lock is held while the factory runs, so concurrent first
/// requests build once. Failed builds are not cached.
struct LazySlot<T: ?Sized> {
    factory: Factory<T>,
    value: Mutex<Option<Arc<T>>>,
}

impl<T: ?Sized> LazySlot<T> {
    fn new(factory: Factory<T>) -> Self {
        Self {
            factory,
            value: Mutex::new(None),
        }
    }

    fn get(&self) -> Result<Arc<T>, LoadError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| "model slot poisoned by a panicking loader")?;
        if let Some(ref value) = *guard {
            return Ok(value.clone());
        }
        let value = (self.factory)()?;
        *guard = Some(value.clone());
        Ok(value)
    }
}

/// Process-wide cache of the inference models, handed to the pipeline
/// explicitly instead of living in globals.
///
/// Each model is loaded lazily the first time a run needs it and shared by
/// every later run.
pub struct ModelRegistry {
    recognizer: LazySlot<dyn SpeechRecognizer>,
    classifier: LazySlot<dyn AccentClassifier>,
}

impl ModelRegistry {
    pub fn new<R, C>(recognizer_factory: R, classifier_factory: C) -> Self
    where
        R: Fn() -> Result<Arc<dyn SpeechRecognizer>, LoadError> + Send + Sync + 'static,
        C: Fn() -> Result<Arc<dyn AccentClassifier>, LoadError> + Send + Sync + 'static,
    {
        Self {
            recognizer: LazySlot::new(Box::new(recognizer_factory)),
            classifier: LazySlot::new(Box::new(classifier_factory)),
        }
    }

    /// Registry over already-built models; nothing is loaded lazily.
    pub fn preloaded(
        recognizer: Arc<dyn SpeechRecognizer>,
        classifier: Arc<dyn AccentClassifier>,
    ) -> Self {
        Self::new(move || Ok(recognizer.clone()), move || Ok(classifier.clone()))
    }

    pub fn speech_recognizer(&self) -> Result<Arc<dyn SpeechRecognizer>, LoadError> {
        self.recognizer.get()
    }

    pub fn accent_classifier(&self) -> Result<Arc<dyn AccentClassifier>, LoadError> {
        self.classifier.get()
    }
}
