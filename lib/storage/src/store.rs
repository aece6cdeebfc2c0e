// Index artifact persistence
use assessmatch_core::{Error, PersistedIndex, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use bincode::Options;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INDEX_MAGIC: [u8; 8] = *b"ASMINDEX";

/// Bumped whenever the layout of [`PersistedIndex`] changes.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk wrapper around the bincode-encoded index.
#[derive(Debug, Serialize, Deserialize)]
struct IndexEnvelope {
    magic: [u8; 8],
    version: u32,
    checksum: String,
    payload: Vec<u8>,
}

fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Reads and writes one index artifact at a fixed path.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// reader never observes a half-written artifact.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn save(&self, index: &PersistedIndex) -> Result<()> {
        let payload = bincode::DefaultOptions::new()
            .serialize(index)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let envelope = IndexEnvelope {
            magic: INDEX_MAGIC,
            version: FORMAT_VERSION,
            checksum: checksum(&payload),
            payload,
        };
        let bytes = bincode::DefaultOptions::new()
            .serialize(&envelope)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&bytes))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
            })?;

        info!(
            "Index saved to {:?} ({} records, {} bytes)",
            self.path,
            index.len(),
            bytes.len()
        );
        Ok(())
    }

    /// Load the artifact. Anything that does not decode into a consistent
    /// [`PersistedIndex`] is reported as [`Error::CorruptIndex`].
    pub fn load(&self) -> Result<PersistedIndex> {
        if !self.exists() {
            return Err(Error::IndexNotFound(self.path.clone()));
        }

        let bytes = std::fs::read(&self.path)?;
        let envelope: IndexEnvelope = bincode::DefaultOptions::new()
            .with_limit(bytes.len() as u64)
            .deserialize(&bytes)
            .map_err(|e| Error::CorruptIndex(format!("unreadable envelope: {}", e)))?;

        if envelope.magic != INDEX_MAGIC {
            return Err(Error::CorruptIndex("not an index artifact".into()));
        }
        if envelope.version != FORMAT_VERSION {
            return Err(Error::CorruptIndex(format!(
                "format version {} (expected {})",
                envelope.version, FORMAT_VERSION
            )));
        }
        if checksum(&envelope.payload) != envelope.checksum {
            return Err(Error::CorruptIndex("checksum mismatch".into()));
        }

        let index: PersistedIndex = bincode::DefaultOptions::new()
            .with_limit(envelope.payload.len() as u64)
            .deserialize(&envelope.payload)
            .map_err(|e| Error::CorruptIndex(format!("unreadable payload: {}", e)))?;
        index.validate()?;

        debug!("Index loaded from {:?} (built {})", self.path, index.built_at);
        Ok(index)
    }
}
