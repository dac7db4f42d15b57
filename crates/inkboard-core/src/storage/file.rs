//! JSON documents on the local file system.

use super::{Storage, StorageError, StorageResult};
use crate::canvas::CanvasDocument;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Read a JSON document from an arbitrary path.
pub fn read_document(path: &Path) -> StorageResult<CanvasDocument> {
    if !path.is_file() {
        return Err(StorageError::NotFound(path.display().to_string()));
    }
    let json = fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
    let document = CanvasDocument::from_json(&json)
        .map_err(|e| StorageError::Serialization(format!("{}: {e}", path.display())))?;
    log::info!("loaded document from {}", path.display());
    Ok(document)
}

/// Write a document as JSON to an arbitrary path.
pub fn write_document(path: &Path, document: &CanvasDocument) -> StorageResult<()> {
    let json = document
        .to_json()
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    fs::write(path, json).map_err(|e| io_error("write", path, e))?;
    log::info!("saved document to {}", path.display());
    Ok(())
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io(format!("cannot {action} {}: {err}", path.display()))
}

/// Map a document name onto a safe file stem.
///
/// Anything other than ASCII letters, digits, `-` and `_` becomes `_`.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// Named documents kept as `<name>.json` in one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it when missing.
    pub fn new(dir: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&dir).map_err(|e| io_error("create", &dir, e))?;
        Ok(Self { dir })
    }

    /// The per-user data directory, e.g. `~/.local/share/inkboard/documents`.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Other("no user data directory".to_string()))?;
        Self::new(base.join("inkboard").join("documents"))
    }

    pub fn document_path(&self, id: &str) -> PathBuf {
        self.dir.join(file_stem(id)).with_extension(EXTENSION)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &CanvasDocument) -> StorageResult<()> {
        write_document(&self.document_path(id), document)
    }

    fn load(&self, id: &str) -> StorageResult<CanvasDocument> {
        match read_document(&self.document_path(id)) {
            Err(StorageError::NotFound(_)) => Err(StorageError::NotFound(id.to_string())),
            other => other,
        }
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.document_path(id);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(io_error("delete", &path, e))
            }
            _ => Ok(()),
        }
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list", &self.dir, e)),
        };
        let mut ids: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|path| Some(path.file_stem()?.to_str()?.to_string()))
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.document_path(id).is_file())
    }
}
