use crate::error::StoreError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;

/// Local copy of the learned words, one JSON array under a single key.
///
/// A missing or corrupt mirror reads as empty.
#[async_trait]
pub trait LocalMirror: Send + Sync {
    async fn load(&self) -> Vec<String>;

    async fn save(&self, words: &[String]) -> Result<(), StoreError>;
}

pub struct JsonFileMirror {
    path: PathBuf,
}

impl JsonFileMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LocalMirror for JsonFileMirror {
    async fn load(&self) -> Vec<String> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    async fn save(&self, words: &[String]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, serde_json::to_string(words)?).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMirror {
    words: Mutex<Vec<String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.words
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LocalMirror for MemoryMirror {
    async fn load(&self) -> Vec<String> {
        self.snapshot()
    }

    async fn save(&self, words: &[String]) -> Result<(), StoreError> {
        if let Ok(mut stored) = self.words.lock() {
            *stored = words.to_vec();
        }
        Ok(())
    }
}
