use crate::error::{Result, SnapshotError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub key_prefix: String,
    pub quota_bytes: Option<usize>,
    pub session_dir: Option<PathBuf>,
}

impl SnapshotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_quota_bytes(mut self, quota: usize) -> Self {
        self.quota_bytes = Some(quota);
        self
    }

    pub fn with_session_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.session_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.quota_bytes == Some(0) {
            return Err(SnapshotError::InvalidConfig(
                "quota_bytes must be greater than zero".to_string(),
            ));
        }

        if let Some(dir) = &self.session_dir {
            if dir.as_os_str().is_empty() {
                return Err(SnapshotError::InvalidConfig(
                    "session_dir must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
