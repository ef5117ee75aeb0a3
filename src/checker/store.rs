use crate::error::StoreError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::fs;

pub const DUPLICATE_MESSAGE: &str = "Word already exists";
pub const ADDED_MESSAGE: &str = "Word added successfully";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddWordResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl AddWordResponse {
    fn added() -> Self {
        Self {
            success: true,
            message: ADDED_MESSAGE.to_string(),
        }
    }

    fn duplicate() -> Self {
        Self {
            success: false,
            message: DUPLICATE_MESSAGE.to_string(),
        }
    }
}

/// Authoritative store of learned words.
///
/// Adding a word that is already stored is a no-op reported as
/// `success: false`, never as an error.
#[async_trait]
pub trait WordStore: Send + Sync {
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    async fn add(&self, word: &str) -> Result<AddWordResponse, StoreError>;
}

/// Store reached over HTTP: GET lists records, POST adds one
pub struct HttpWordStore {
    client: Client,
    read_url: String,
    write_url: String,
}

impl HttpWordStore {
    pub fn new(
        read_url: impl Into<String>,
        write_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            read_url: read_url.into(),
            write_url: write_url.into(),
        })
    }
}

#[async_trait]
impl WordStore for HttpWordStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let response = self.client.get(&self.read_url).send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        let records: Vec<WordRecord> = response.json().await?;
        Ok(records.into_iter().map(|r| r.word).collect())
    }

    async fn add(&self, word: &str) -> Result<AddWordResponse, StoreError> {
        let response = self
            .client
            .post(&self.write_url)
            .json(&WordRecord {
                word: word.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Store kept as a JSON array of `{word}` records on disk
pub struct FileWordStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileWordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<WordRecord>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Vec::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl WordStore for FileWordStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read_records()
            .await?
            .into_iter()
            .map(|r| r.word)
            .collect())
    }

    async fn add(&self, word: &str) -> Result<AddWordResponse, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records().await?;
        if records.iter().any(|r| r.word == word) {
            return Ok(AddWordResponse::duplicate());
        }

        records.push(WordRecord {
            word: word.to_string(),
        });

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&records)?).await?;

        Ok(AddWordResponse::added())
    }
}

/// In-process store, for embedding and tests
#[derive(Default)]
pub struct MemoryWordStore {
    words: Mutex<Vec<String>>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: Mutex::new(words.into_iter().map(Into::into).collect()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.words.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulate a write made by another client
    pub fn insert_external(&self, word: impl Into<String>) {
        self.lock().push(word.into());
    }
}

#[async_trait]
impl WordStore for MemoryWordStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().clone())
    }

    async fn add(&self, word: &str) -> Result<AddWordResponse, StoreError> {
        let mut words = self.lock();
        if words.iter().any(|w| w == word) {
            return Ok(AddWordResponse::duplicate());
        }
        words.push(word.to_string());
        Ok(AddWordResponse::added())
    }
}
