//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::canvas::CanvasDocument;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Documents are kept in their serialized form so a load goes through the
/// same parsing as a file.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &CanvasDocument) -> StorageResult<()> {
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut docs = self.documents.write().map_err(lock_error)?;
        docs.insert(id.to_string(), json);
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<CanvasDocument> {
        let docs = self.documents.read().map_err(lock_error)?;
        let json = docs
            .get(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        CanvasDocument::from_json(json).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut docs = self.documents.write().map_err(lock_error)?;
        docs.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let docs = self.documents.read().map_err(lock_error)?;
        let mut ids: Vec<String> = docs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::tools::ToolKind;
    use kurbo::Point;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Line);
        canvas.pointer_down(Point::ZERO, None);
        canvas.pointer_up(Point::new(30.0, 0.0));

        storage.save("board", canvas.document()).unwrap();
        assert!(storage.exists("board").unwrap());

        let loaded = storage.load("board").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.elements()[0], canvas.document().elements()[0]);
    }

    #[test]
    fn test_load_missing() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.load("nope"),
            Err(StorageError::NotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_delete_and_list() {
        let storage = MemoryStorage::new();
        let document = CanvasDocument::new();
        storage.save("b", &document).unwrap();
        storage.save("a", &document).unwrap();
        assert_eq!(storage.list().unwrap(), vec!["a", "b"]);

        storage.delete("a").unwrap();
        assert!(!storage.exists("a").unwrap());
        assert_eq!(storage.list().unwrap(), vec!["b"]);
    }
}
