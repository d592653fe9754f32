//! # Daybook Core
//!
//! Domain types, traits, and error definitions for the Daybook calendar
//! agent. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration (e.g. SQLite vs. PostgreSQL
//!   turn storage, or a scripted mock LLM in tests)
//! - Driving the agent loop without a live model or calendar service
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod channel;
pub mod tool;
pub mod store;
pub mod event;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, Conversation, SessionKey};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use channel::{Channel, ChannelMessage, ChannelId};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
pub use store::{Turn, TurnStore};
pub use event::{DomainEvent, EventBus};
