//! Session orchestration: login, refresh, and logout.

pub mod service;

pub use service::{AuthSessionService, TokenPair};
