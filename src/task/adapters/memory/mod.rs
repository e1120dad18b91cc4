//! In-memory adapters for task tracking.

mod document_store;
mod task;

pub use document_store::InMemoryDocumentStore;
pub use task::InMemoryTaskRepository;
