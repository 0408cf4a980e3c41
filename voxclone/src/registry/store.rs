//! Voice registry persistence: a JSON object file mapping voice id to record.
//!
//! The whole map lives in memory behind one mutex. Every mutation happens
//! under the lock and rewrites the file before the lock is released, so
//! concurrent requests cannot lose each other's updates. Mutations run on
//! the blocking pool since they hold the lock across file I/O.

use super::types::{VoiceRecord, VoiceSummary};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace registry file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Registry update task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

type VoiceMap = BTreeMap<String, VoiceRecord>;

/// Persistent mapping from voice id to voice metadata.
pub struct VoiceRegistry {
    file: Arc<RegistryFile>,
}

struct RegistryFile {
    path: PathBuf,
    voices: Mutex<VoiceMap>,
}

impl VoiceRegistry {
    /// Open the registry at `path`, starting empty if the file doesn't exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let voices: VoiceMap = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            VoiceMap::new()
        };

        debug!("Loaded {} voices from {}", voices.len(), path.display());

        Ok(Self {
            file: Arc::new(RegistryFile {
                path,
                voices: Mutex::new(voices),
            }),
        })
    }

    /// All voices, oldest first.
    pub fn list(&self) -> Vec<VoiceSummary> {
        let voices = self.file.lock();
        let mut summaries: Vec<VoiceSummary> = voices
            .iter()
            .map(|(id, record)| VoiceSummary {
                id: id.clone(),
                record: record.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| {
            a.record
                .created_at
                .cmp(&b.record.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        summaries
    }

    pub fn get(&self, voice_id: &str) -> Option<VoiceRecord> {
        self.file.lock().get(voice_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.file.lock().len()
    }

    /// Add or replace a voice and write the registry to disk.
    pub async fn insert(&self, voice_id: String, record: VoiceRecord) -> Result<(), RegistryError> {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || file.insert(voice_id, record)).await?
    }

    /// Remove a voice and write the registry to disk. Returns the removed record.
    pub async fn remove(&self, voice_id: &str) -> Result<Option<VoiceRecord>, RegistryError> {
        let file = Arc::clone(&self.file);
        let voice_id = voice_id.to_string();
        tokio::task::spawn_blocking(move || file.remove(voice_id)).await?
    }
}

impl RegistryFile {
    fn lock(&self) -> MutexGuard<'_, VoiceMap> {
        match self.voices.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Voice registry lock was poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }

    fn insert(&self, voice_id: String, record: VoiceRecord) -> Result<(), RegistryError> {
        let mut voices = self.lock();
        let previous = voices.insert(voice_id.clone(), record);

        if let Err(e) = write_registry(&self.path, &voices) {
            // Keep memory in step with the file
            match previous {
                Some(old) => voices.insert(voice_id, old),
                None => voices.remove(&voice_id),
            };
            return Err(e);
        }

        Ok(())
    }

    fn remove(&self, voice_id: String) -> Result<Option<VoiceRecord>, RegistryError> {
        let mut voices = self.lock();
        let Some(removed) = voices.remove(&voice_id) else {
            return Ok(None);
        };

        if let Err(e) = write_registry(&self.path, &voices) {
            voices.insert(voice_id, removed);
            return Err(e);
        }

        Ok(Some(removed))
    }
}

/// Write the map to a temp file next to `path`, then atomically swap it in.
fn write_registry(path: &Path, voices: &VoiceMap) -> Result<(), RegistryError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, voices)?;
        writer.flush()?;
    }
    temp.persist(path)?;

    Ok(())
}
