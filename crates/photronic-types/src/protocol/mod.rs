//! Protocol definitions for chat-completion providers.
//!
//! This module contains wire types for the supported LLM APIs:
//! - Google Gemini (GenerateContent API)
//! - OpenAI (ChatCompletions API, and compatible gateways)
//!
//! Only the fields Photronic sends or reads are modelled; unknown response
//! fields are ignored.

pub mod gemini;
pub mod openai;

// Re-export common protocol enums
pub use gemini::GeminiRole;
pub use openai::OpenAIRole;
