//! The Daybook agent — reasoning loop and turn orchestration.
//!
//! [`AgentLoop`] drives the LLM through a bounded tool-calling cycle with
//! two pieces of deterministic policy layered on top of the model's own
//! decisions: mutations must target event ids resolved by a lookup in the
//! same turn, and a failed update falls back to a create-then-delete swap.
//!
//! [`Orchestrator`] is the per-message entry point: identity gate, history
//! load, agent run, best-effort persistence.

pub mod loop_runner;
pub mod orchestrator;
pub mod sop;

pub use loop_runner::AgentLoop;
pub use orchestrator::{IntrusionNotifier, LogOnlyNotifier, Orchestrator};
