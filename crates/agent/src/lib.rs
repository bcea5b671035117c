//! Tool-calling orchestrator
//!
//! Drives a bounded loop of model turns: dispatch structured tool
//! invocations to the retrieval pipeline, replay duplicate calls from the
//! session cache, and terminate on a plain-text answer or the round
//! ceiling. No failure inside the loop is fatal to the request: the
//! worst case is a canned answer plus whatever items accumulated.

pub mod orchestrator;
pub mod router;
pub mod session;

pub use orchestrator::{AssistantResponse, ChatRequest, ShoppingAgent};
pub use router::{ToolOutcome, ToolRouter};
pub use session::ConversationState;
