//! Conversation runtime - slot filling and turn orchestration
//!
//! This crate is the "brain" of the metrobot system - the per-turn agent that:
//! - Intercepts form payloads embedded in user messages and validates them
//! - Drives the LLM with the current slot state and conversation history
//! - Merges extracted slot values into the session draft
//! - Translates control sentinels in model output into UI directives
//!
//! # Turn shape
//!
//! Each incoming message takes exactly one of two paths:
//! 1. **Form interception** (`orchestrator`) - fenced JSON in the user text is
//!    validated and merged; the turn ends without an LLM call
//! 2. **AI turn** - system prompt (`prompts`) + history go to the provider
//!    (`llm`), and the reply is mined for slot updates, product selections,
//!    and action sentinels
//!
//! # Key types
//!
//! - `OrderAgent` - main orchestrator (see `orchestrator` module)
//! - `LlmClient` - pluggable completion provider trait
//! - `GroqClient` - reqwest implementation against Groq's chat-completions API
//!
//! # Safety principle
//!
//! The LLM never decides whether an order submits. Submission happens only
//! after server-side validation accepts every slot and the user confirms.

pub mod groq;
pub mod llm;
pub mod orchestrator;
pub mod prompts;

pub use groq::GroqClient;
pub use llm::{LlmClient, LlmError};
pub use orchestrator::{AgentError, OrderAgent};
