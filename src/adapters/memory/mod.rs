//! In-memory adapters for tests and local development.

mod checkpoint_store;

pub use checkpoint_store::InMemoryCheckpointStore;
