//! These models represent the objects passed around by the orchestrator
//!
//! There are three related formats we need to interact with:
//! - relay messages, stored per session and sent from the relay to the orchestrator
//! - openai messages/tools, sent from the orchestrator to the LLM
//! - tool requests/results, exchanged between the orchestrator and the tool registry
//!
//! We always immediately convert those data models into the internal structs using
//! to/from helpers. The wire shapes live next to the code that speaks them.
pub mod message;
pub mod role;
pub mod tool;
