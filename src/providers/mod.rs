//! Upstream service clients.

pub mod dadata;
pub mod openai;
pub mod traits;

pub use dadata::DadataClient;
pub use openai::{McpToolConfig, OpenAiMcpClient};
pub use traits::{AnalysisProvider, PartyProvider};
