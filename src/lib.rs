//! Interactive feedback over MCP.
//!
//! A single tool, `interactive_feedback`, lets an agent stop and ask the
//! human a question. Each call launches a prompt program as a child process,
//! waits for it to exit, and returns the JSON object it left in a temporary
//! handoff file.
//!
//! ```text
//! MCP client ──stdio──▶ FeedbackServer ──▶ FeedbackBroker
//!                                              │ spawn, wait
//!                                              ▼
//!                                        feedback-prompt ──▶ handoff.json
//! ```

pub mod broker;
pub mod config;
pub mod error;
pub mod handoff;
pub mod logging;
pub mod prompt;
pub mod request;
pub mod server;

pub use broker::{FeedbackBroker, PromptCommand};
pub use error::{FeedbackError, Result};
pub use request::{FeedbackRequest, FeedbackResult, PredefinedOptions, OPTION_DELIMITER};
pub use server::{serve_stdio, FeedbackServer};
