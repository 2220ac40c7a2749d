//! Project persistence.
//!
//! The board engine only needs keyed storage of whole projects: list, get,
//! full-replace upsert, remove. Single writer, no cross-project
//! transactions. [`JsonFileStore`] is the one real implementation;
//! [`MemoryStore`] backs tests and can simulate write failures.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::Project;

/// Storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage unavailable")]
    Unavailable,
}

/// Durable keyed storage of project aggregates.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Project>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, StoreError>;

    /// Insert if the id is unseen, else replace the whole record.
    async fn upsert(&self, project: &Project) -> Result<(), StoreError>;

    async fn remove(&self, id: &str) -> Result<(), StoreError>;
}

/// All projects in one JSON array file, held in memory and rewritten on
/// every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    projects: Mutex<Vec<Project>>,
}

impl JsonFileStore {
    /// Open the store at the default data location.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::data_dir().ok_or(StoreError::Unavailable)?;
        Self::open(dir.join("ideaboard").join("projects.json"))
    }

    /// Open (or create) a store at a specific path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let projects = Self::read(&path)?;
        Ok(Self { path, projects: Mutex::new(projects) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<Vec<Project>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, projects: &[Project]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(projects)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for JsonFileStore {
    async fn list_all(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.projects.lock().clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.lock().iter().find(|p| p.id == id).cloned())
    }

    async fn upsert(&self, project: &Project) -> Result<(), StoreError> {
        let mut projects = self.projects.lock();
        let mut next = projects.clone();
        match next.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => next.push(project.clone()),
        }
        // The cache only advances once the file write succeeded.
        self.write(&next)?;
        *projects = next;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut projects = self.projects.lock();
        let next: Vec<_> = projects.iter().filter(|p| p.id != id).cloned().collect();
        self.write(&next)?;
        *projects = next;
        Ok(())
    }
}

/// In-memory store with a switchable failure mode for exercising the
/// optimistic-rollback path.
#[derive(Default)]
pub struct MemoryStore {
    projects: Mutex<Vec<Project>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current contents, for assertions.
    pub fn snapshot(&self) -> Vec<Project> {
        self.projects.lock().clone()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.projects.lock().clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.lock().iter().find(|p| p.id == id).cloned())
    }

    async fn upsert(&self, project: &Project) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        let mut projects = self.projects.lock();
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => projects.push(project.clone()),
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.projects.lock().retain(|p| p.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");

        let store = JsonFileStore::open(&path).unwrap();
        let project = Project::demo();
        store.upsert(&project).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 1);

        // A fresh handle sees the persisted data.
        let reopened = JsonFileStore::open(&path).unwrap();
        let loaded = reopened.get_by_id("demo-habit-tracker").await.unwrap().unwrap();
        assert_eq!(loaded, project);
    }

    #[tokio::test]
    async fn test_file_store_upsert_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("projects.json")).unwrap();

        let project = Project::demo();
        store.upsert(&project).await.unwrap();
        let mut renamed = project.clone();
        renamed.name = "Renamed".to_string();
        store.upsert(&renamed).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Renamed");
    }

    #[tokio::test]
    async fn test_file_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("projects.json")).unwrap();
        store.upsert(&Project::demo()).await.unwrap();
        store.remove("demo-habit-tracker").await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
        // Removing a missing id is a no-op, not an error.
        store.remove("demo-habit-tracker").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_failure_toggle() {
        let store = MemoryStore::new();
        let project = Project::demo();
        store.upsert(&project).await.unwrap();

        store.fail_writes(true);
        assert!(matches!(store.upsert(&project).await, Err(StoreError::Unavailable)));
        assert_eq!(store.snapshot().len(), 1);

        store.fail_writes(false);
        store.upsert(&project).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, "").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
