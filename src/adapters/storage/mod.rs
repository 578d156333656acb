//! Storage Adapters.
//!
//! In-memory implementations of the persistence ports.

mod memory;

pub use memory::{
    InMemoryConversationStore, InMemoryExperienceReader, InMemoryJobStore, StaticAuthProvider,
};
