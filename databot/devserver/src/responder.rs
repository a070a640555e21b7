//! Canned assistants
//!
//! A responder turns one user message into at most one reply. `None` is sent
//! to the client as an empty text frame.

use std::fmt;
use std::str::FromStr;

/// Produces the reply for one received message
pub trait Responder: Send + Sync {
    /// Reply to `message`, or `None` for nothing to say
    fn respond(&self, message: &str) -> Option<String>;
}

/// Sends every message straight back
#[derive(Debug, Default, Clone, Copy)]
pub struct Echo;

impl Responder for Echo {
    fn respond(&self, message: &str) -> Option<String> {
        if message.is_empty() {
            None
        } else {
            Some(message.to_string())
        }
    }
}

/// Answers with markup exercising every construct the clients format
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownDemo;

impl Responder for MarkdownDemo {
    fn respond(&self, message: &str) -> Option<String> {
        let question = message.trim();
        if question.is_empty() {
            return None;
        }
        let words = question.split_whitespace().count();
        Some(format!(
            "## Results\n\
             You asked: *{question}*\n\
             - words: **{words}**\n\
             - characters: **{chars}**\n\
             \n\
             ```\n\
             SELECT count(*) FROM questions;\n\
             ```\n\
             Run `EXPLAIN` for the plan, or see [the docs](https://example.com/databot).",
            chars = question.chars().count(),
        ))
    }
}

/// Which responder the server runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// [`Echo`]
    #[default]
    Echo,
    /// [`MarkdownDemo`]
    MarkdownDemo,
}

impl Mode {
    /// Build the responder for this mode
    pub fn responder(self) -> Box<dyn Responder> {
        match self {
            Mode::Echo => Box::new(Echo),
            Mode::MarkdownDemo => Box::new(MarkdownDemo),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Echo => write!(f, "echo"),
            Mode::MarkdownDemo => write!(f, "markdown-demo"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "echo" => Ok(Mode::Echo),
            "markdown-demo" => Ok(Mode::MarkdownDemo),
            other => Err(format!(
                "unknown mode '{other}' (expected 'echo' or 'markdown-demo')"
            )),
        }
    }
}
