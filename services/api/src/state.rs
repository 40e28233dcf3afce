//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared,
//! read-only interview catalog, the generation backend, and the live sessions.

use crate::config::Config;
use crate::sessions::SessionStore;
use interview_core::{Generator, ProfileStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileStore>,
    pub generator: Arc<dyn Generator>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}
