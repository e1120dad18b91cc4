//! Port contracts for task tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod document_store;
pub mod repository;

pub use document_store::{DocumentStore, DocumentStoreError, DocumentStoreResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
