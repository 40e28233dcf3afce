//! Interview API Library Crate
//!
//! This library contains the HTTP surface of the interview practice partner:
//! configuration, application state, the in-memory session registry, API
//! handlers and routing. The `api` binary is a thin wrapper around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod sessions;
pub mod state;
