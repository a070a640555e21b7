//! Databot Dev Server
//!
//! A stand-in for the assistant service: a WebSocket endpoint that answers
//! every text frame with exactly one text frame, from a canned responder.
//! Used to run the terminal client locally and in end-to-end tests.

pub mod responder;
pub mod server;

pub use responder::{Echo, MarkdownDemo, Mode, Responder};
pub use server::{DevServer, DEFAULT_BIND, DEFAULT_PATH};
