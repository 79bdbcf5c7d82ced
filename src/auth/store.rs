use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::KitConfig;
use crate::error::{KitError, Result};

/// Key-value storage for state that must survive between requests, such as
/// the PKCE code verifier across the OAuth redirect.
pub trait OptionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Process-local option store.
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    options: Mutex<HashMap<String, String>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let options = self.options.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(options.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Configuration for file-backed option storage.
#[derive(Debug, Clone)]
pub struct OptionStoreConfig {
    pub base_dir: PathBuf,
}

impl OptionStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        KitConfig::default_data_dir()
    }
}

/// File-backed option store keeping every option in one TOML file.
///
/// # Example
/// ```no_run
/// use kit_api::auth::{FileOptionStore, OptionStore};
///
/// let store = FileOptionStore::new_default();
/// store.set("ck_code_verifier", "verifier")?;
/// assert_eq!(store.get("ck_code_verifier")?.as_deref(), Some("verifier"));
/// # Ok::<(), kit_api::error::KitError>(())
/// ```
#[derive(Debug)]
pub struct FileOptionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileOptionStore {
    pub fn new(config: OptionStoreConfig) -> Self {
        Self {
            path: config.base_dir.join("options.toml"),
            guard: Mutex::new(()),
        }
    }

    pub fn new_default() -> Self {
        Self::new(OptionStoreConfig::new(OptionStoreConfig::default_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(KitError::Io(err)),
        };
        let file: OptionsFile = toml::from_str(&raw)?;
        if file.version != OPTIONS_FILE_VERSION {
            return Err(KitError::Configuration(format!(
                "Unsupported options file version {} at {}",
                file.version,
                self.path.display()
            )));
        }
        Ok(file.options)
    }

    fn write_file(&self, options: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OptionsFile {
            version: OPTIONS_FILE_VERSION,
            saved_at: DateTime::<Utc>::from(std::time::SystemTime::now()),
            options,
        };
        fs::write(&self.path, toml::to_string(&file)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl OptionStore for FileOptionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_file()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut options = self.read_file()?;
        options.insert(key.to_string(), value.to_string());
        self.write_file(options)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut options = self.read_file()?;
        if options.remove(key).is_none() {
            return Ok(());
        }
        self.write_file(options)
    }
}

const OPTIONS_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OptionsFile {
    version: u32,
    saved_at: DateTime<Utc>,
    options: BTreeMap<String, String>,
}
