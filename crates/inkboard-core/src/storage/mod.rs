//! Storage abstraction for persistence.

mod file;
mod memory;

pub use file::{FileStorage, read_document, write_document};
pub use memory::MemoryStorage;

use crate::canvas::CanvasDocument;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document storage backends.
///
/// Calls are synchronous; a whiteboard document is small enough to read or
/// write inside one event callback.
pub trait Storage: Send + Sync {
    /// Save a document.
    fn save(&self, id: &str, document: &CanvasDocument) -> StorageResult<()>;

    /// Load a document.
    fn load(&self, id: &str) -> StorageResult<CanvasDocument>;

    /// Delete a document.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all document IDs.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}
