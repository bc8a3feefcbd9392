// src/clients/mock.rs

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    clients::ai::{AiError, QuizGenerator},
    services::generation::GenerationRequest,
};

/// Generator for tests and local runs: answers every call with the same
/// scripted outcome and records what it was asked.
#[derive(Debug)]
pub struct ScriptedGenerator {
    outcome: Result<String, AiError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn responding(raw: impl Into<String>) -> Self {
        Self::with_outcome(Ok(raw.into()))
    }

    pub fn failing(error: AiError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, AiError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuizGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.last_request.lock() {
            *slot = Some(request.clone());
        }
        self.outcome.clone()
    }
}
