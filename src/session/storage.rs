use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ClientError, Result};
use crate::models::Admin;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "adminToken";
/// Storage key holding the cached admin identity
pub const IDENTITY_KEY: &str = "adminUser";

/// What survived the last process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Persisted {
    pub credential: Option<String>,
    pub identity: Option<Admin>,
}

/// Durable home for the session. Both keys are written and cleared together.
pub trait CredentialStorage: Send + Sync {
    fn load(&self) -> Result<Persisted>;

    fn save(&self, credential: &str, identity: &Admin) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// One JSON file per storage key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStorage for FileStorage {
    fn load(&self) -> Result<Persisted> {
        let credential = match self.read(TOKEN_KEY)? {
            Some(raw) => serde_json::from_str::<String>(&raw)
                .map_err(|e| ClientError::storage(format!("{TOKEN_KEY}: {e}")))?,
            None => return Ok(Persisted::default()),
        };

        // A corrupt identity cache is recoverable: the profile gets refetched
        let identity = self.read(IDENTITY_KEY)?.and_then(|raw| {
            serde_json::from_str::<Admin>(&raw)
                .map_err(|e| tracing::warn!("discarding unreadable {}: {}", IDENTITY_KEY, e))
                .ok()
        });

        Ok(Persisted {
            credential: Some(credential),
            identity,
        })
    }

    fn save(&self, credential: &str, identity: &Admin) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let token = serde_json::to_string(credential).map_err(|e| ClientError::storage(e.to_string()))?;
        let admin =
            serde_json::to_string_pretty(identity).map_err(|e| ClientError::storage(e.to_string()))?;

        let written = fs::write(self.path(IDENTITY_KEY), admin)
            .and_then(|_| fs::write(self.path(TOKEN_KEY), token));
        if let Err(e) = written {
            // Never leave one key behind without the other
            let _ = self.clear();
            return Err(e.into());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let token = self.remove(TOKEN_KEY);
        let identity = self.remove(IDENTITY_KEY);
        token.and(identity)
    }
}

/// In-process storage; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Persisted>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds a credential, with or without a cached identity
    pub fn with(credential: impl Into<String>, identity: Option<Admin>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Persisted {
                credential: Some(credential.into()),
                identity,
            })),
        }
    }

    pub fn snapshot(&self) -> Persisted {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> Result<Persisted> {
        Ok(self.snapshot())
    }

    fn save(&self, credential: &str, identity: &Admin) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Persisted {
            credential: Some(credential.to_string()),
            identity: Some(identity.clone()),
        };
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Persisted::default();
        Ok(())
    }
}
