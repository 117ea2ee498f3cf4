// src/state.rs

use axum::extract::FromRef;

use crate::{config::Config, repository::Store, session::SessionRegistry};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: SessionRegistry,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        Self {
            store,
            sessions: SessionRegistry::with_ttl(config.session_ttl),
            config,
        }
    }
}

impl FromRef<AppState> for Store {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SessionRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
