//! LLM provider implementations for Daybook.

pub mod gemini;

pub use gemini::GeminiProvider;
