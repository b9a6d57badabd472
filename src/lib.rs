//! EventManager: a conversational event-planning assistant.
//!
//! Walks the user through six questions, validates each answer, stores the
//! finished event and replies with a generated plan. Free conversation goes
//! to a remote text model with a template fallback.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod storage;

pub mod events;
pub mod history;
pub mod activity;
pub mod intent;

pub mod providers;
pub mod responder;

pub mod chat;
pub mod console;
pub mod export;
