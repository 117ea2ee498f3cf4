// src/session/mod.rs

//! In-progress quiz attempts.
//!
//! `QuizSession` is the state machine for one attempt; `SessionRegistry`
//! owns the live sessions of all users on the server side.

pub mod registry;
pub mod scoring;
pub mod state;

pub use registry::SessionRegistry;
pub use scoring::{Score, score_answers};
pub use state::{QuizSession, SessionError, SessionState, SessionView, Submission};
