use crate::config::SnapshotConfig;
use crate::error::{Result, SnapshotError};
use ahash::AHashMap;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const ENTRY_EXTENSION: &str = "json";
const PARTIAL_EXTENSION: &str = "partial";

pub trait SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: AHashMap<String, String>,
    quota_bytes: Option<usize>,
    used_bytes: usize,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn from_config(config: &SnapshotConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            quota_bytes: config.quota_bytes,
            ..Self::default()
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn end_session(&mut self) {
        self.entries.clear();
        self.used_bytes = 0;
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let existing = self
            .entries
            .get(key)
            .map(|old| key.len() + old.len())
            .unwrap_or(0);
        let required = key.len() + value.len();
        let remaining = self.used_bytes - existing;

        if let Some(quota) = self.quota_bytes {
            if remaining + required > quota {
                return Err(SnapshotError::QuotaExceeded {
                    key: key.to_string(),
                    required,
                    available: quota.saturating_sub(remaining),
                });
            }
        }

        self.entries.insert(key.to_string(), value);
        self.used_bytes = remaining + required;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if let Some(old) = self.entries.remove(key) {
            self.used_bytes -= key.len() + old.len();
        }
        Ok(())
    }
}

/// One file per key, named by the SHA-256 of the key.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    root_dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&root_dir)?;

        Ok(Self { root_dir })
    }

    pub fn from_config(config: &SnapshotConfig) -> Result<Self> {
        config.validate()?;

        let dir = config.session_dir.as_ref().ok_or_else(|| {
            SnapshotError::InvalidConfig("session_dir is required for file session storage".to_string())
        })?;
        Self::new(dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn end_session(&mut self) -> Result<()> {
        for entry in std::fs::read_dir(&self.root_dir)? {
            let path = entry?.path();

            let owned = path
                .extension()
                .map(|ext| ext == ENTRY_EXTENSION || ext == PARTIAL_EXTENSION)
                .unwrap_or(false);

            if owned && path.is_file() {
                std::fs::remove_file(path)?;
            }
        }

        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root_dir
            .join(format!("{}.{}", key_digest(key), ENTRY_EXTENSION))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let path = self.entry_path(key);
        let partial = path.with_extension(PARTIAL_EXTENSION);

        {
            let mut file = File::create(&partial)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }

        std::fs::rename(&partial, &path)?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn key_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();

    digest.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{:02x}", byte);
        out
    })
}
