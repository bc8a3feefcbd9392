// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    clients::{ai::QuizGenerator, storage::ObjectStore, store::QuizStore},
    config::Config,
};

/// Shared handles, built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn QuizStore>,
    pub generator: Arc<dyn QuizGenerator>,
    pub storage: Arc<dyn ObjectStore>,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn QuizStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<dyn QuizGenerator> {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ObjectStore> {
    fn from_ref(state: &AppState) -> Self {
        state.storage.clone()
    }
}
