//! Text-generation capability: message types, generator seam, HTTP provider

pub mod generator;
pub mod messages;
pub mod provider;

pub use generator::{GenerationClient, GenerationError, TextGenerator};
pub use messages::{
    ChatMessage, Generation, GenerationOptions, GenerationRequest, MessageRole, TokenUsage,
};
pub use provider::{HttpGeneratorConfig, HttpTextGenerator};
