//! Engine configuration and the sources it is read from.
//!
//! The polling loop reloads its [`EngineConfig`] from a [`ConfigSource`] on
//! every cycle, so edits take effect on the next cycle.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const MIN_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub target_path: PathBuf,
    pub temp_path: PathBuf,
    pub interval_secs: u64,
    pub active: bool,
}

impl EngineConfig {
    pub fn new(target_path: impl Into<PathBuf>) -> Self {
        Self {
            target_path: target_path.into(),
            temp_path: default_temp_path(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            active: true,
        }
    }

    pub fn with_temp_path(mut self, temp_path: impl Into<PathBuf>) -> Self {
        self.temp_path = temp_path.into();
        self
    }

    pub fn with_interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Poll interval, never shorter than [`MIN_INTERVAL_SECS`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(MIN_INTERVAL_SECS))
    }
}

pub fn default_temp_path() -> PathBuf {
    std::env::temp_dir().join("filekeep")
}

/// Somewhere an [`EngineConfig`] can be (re)loaded from.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<EngineConfig>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    directories: Directories,
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Serialize, Deserialize)]
struct Directories {
    main: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temp: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Settings {
    #[serde(default = "default_interval")]
    check_interval: u64,
    #[serde(default = "default_active")]
    active: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_INTERVAL_SECS,
            active: true,
        }
    }
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_active() -> bool {
    true
}

/// TOML settings file, re-read on every [`ConfigSource::load`].
///
/// ```toml
/// [directories]
/// main = "/home/me/notes"
/// temp = "/tmp/filekeep"
///
/// [settings]
/// check_interval = 5
/// active = true
/// ```
///
/// Relative directories are resolved against the file's own directory.
#[derive(Debug, Clone)]
pub struct TomlConfig {
    path: PathBuf,
}

impl TomlConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write `config` to the file, creating parent directories.
    pub fn store(&self, config: &EngineConfig) -> Result<()> {
        let file = ConfigFile {
            directories: Directories {
                main: config.target_path.clone(),
                temp: Some(config.temp_path.clone()),
            },
            settings: Settings {
                check_interval: config.interval_secs.max(MIN_INTERVAL_SECS),
                active: config.active,
            },
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }

    fn resolve(&self, path: PathBuf) -> PathBuf {
        if path.is_absolute() {
            return path;
        }
        match self.path.parent() {
            Some(base) => base.join(path),
            None => path,
        }
    }
}

impl ConfigSource for TomlConfig {
    fn load(&self) -> Result<EngineConfig> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let file: ConfigFile = toml::from_str(&contents)?;

        if file.directories.main.as_os_str().is_empty() {
            return Err(Error::Config(format!(
                "{}: directories.main is empty",
                self.path.display()
            )));
        }

        Ok(EngineConfig {
            target_path: self.resolve(file.directories.main),
            temp_path: file
                .directories
                .temp
                .map(|temp| self.resolve(temp))
                .unwrap_or_else(default_temp_path),
            interval_secs: file.settings.check_interval.max(MIN_INTERVAL_SECS),
            active: file.settings.active,
        })
    }
}

/// In-memory configuration that can be changed while a poller is reading it.
#[derive(Debug)]
pub struct MemoryConfig {
    config: Mutex<EngineConfig>,
}

impl MemoryConfig {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    pub fn update(&self, change: impl FnOnce(&mut EngineConfig)) {
        let mut config = self.config.lock().unwrap();
        change(&mut *config);
    }
}

impl ConfigSource for MemoryConfig {
    fn load(&self) -> Result<EngineConfig> {
        Ok(self.config.lock().unwrap().clone())
    }
}
