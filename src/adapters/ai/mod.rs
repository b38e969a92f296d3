//! Chat model adapters.

mod mock_model;
mod openai_chat;

pub use mock_model::{MockChatModel, ScriptedTurn};
pub use openai_chat::{OpenAiChatConfig, OpenAiChatModel};
