//! Application layer - turn orchestration and event translation.
//!
//! - `turn_engine` - drives the model/tool loop for one conversation turn
//! - `stream` - translates turn events into the outbound wire protocol

pub mod stream;
pub mod turn_engine;

pub use stream::{translate_events, StreamEvent};
pub use turn_engine::{TurnEngine, TurnEngineConfig, TurnError, TurnEvent};
