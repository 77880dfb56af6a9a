//! Application, provider, and edit-pricing configuration models.

mod app;
mod edit;
mod enums;
mod llm;

pub use app::{AppConfig, ConversationConfig};
pub use edit::{CostTable, EditConfig};
pub use enums::{HistoryWindow, ProviderKind};
pub use llm::{ActiveProvider, GeminiConfig, LlmConfig, OpenAiCompatibleConfig};
