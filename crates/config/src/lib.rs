//! Configuration loading for hemwatch.
//!
//! Configuration is layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults (platform data directory, conservative update pass).
//! 2. A TOML file — `hemwatch.toml` in the platform config directory, or an
//!    explicit path via [`Config::load_from`].
//! 3. Environment variables prefixed `HEMWATCH_`, with `__` separating
//!    nested keys (`HEMWATCH_UPDATE__MAX_DELAY_MS=2000`).

pub mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use exn::ResultExt as _;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, Result};
use hemwatch_storage::{BackendHandle, backend::LocalBackend};

/// Name of the configuration file looked up in the platform config directory.
pub const CONFIG_FILE: &str = "hemwatch.toml";

/// Settings for the bulk update pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Refresh items already flagged as bought.
    pub include_bought: bool,
    /// Refresh items flagged as ignored.
    pub include_ignored: bool,
    /// Upper bound on the random pause between consecutive fetches.
    pub max_delay_ms: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self { include_bought: false, include_ignored: false, max_delay_ms: 8_000 }
    }
}

impl UpdateConfig {
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Complete hemwatch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path of the item library (partitions plus `catalog.csv`).
    pub library_root: PathBuf,
    /// Optional JSON file describing the physical stores to query for
    /// per-store stock. Absent means online stock only.
    pub stores_file: Option<PathBuf>,
    pub update: UpdateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_root: default_library_root(),
            stores_file: None,
            update: UpdateConfig::default(),
        }
    }
}

fn default_library_root() -> PathBuf {
    // Fall back to a relative directory only when the platform gives us no
    // home; load() surfaces that case properly via project_dirs().
    ProjectDirs::from("", "", "hemwatch")
        .map(|dirs| dirs.data_dir().join("library"))
        .unwrap_or_else(|| PathBuf::from("hemwatch-library"))
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "hemwatch").ok_or_else(|| exn::Exn::from(ErrorKind::NoProjectDirs))
}

impl Config {
    /// Load configuration from the default file location, the environment,
    /// and built-in defaults.
    pub fn load() -> Result<Self> {
        let file = project_dirs()?.config_dir().join(CONFIG_FILE);
        Self::load_from(&file)
    }

    /// Load configuration with an explicit TOML file path. The file is
    /// optional; defaults and environment still apply without it.
    pub fn load_from(file: &Path) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("HEMWATCH_").split("__"))
            .extract()
            .or_raise(|| ErrorKind::Invalid)?;
        tracing::debug!(library_root = %config.library_root.display(), "configuration loaded");
        Ok(config)
    }

    /// Open the configured library root as a storage backend.
    pub fn backend(&self) -> Result<BackendHandle> {
        let backend = LocalBackend::new("library", &self.library_root)
            .or_raise(|| ErrorKind::BadLibraryRoot(self.library_root.clone()))?;
        Ok(Arc::new(backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemwatch_storage::StorageBackend as _;

    #[test]
    fn defaults_are_conservative() {
        let config = Config::default();
        assert!(!config.update.include_bought);
        assert!(!config.update.include_ignored);
        assert_eq!(config.update.max_delay(), Duration::from_millis(8_000));
        assert_eq!(config.stores_file, None);
    }

    #[test]
    fn file_and_env_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "hemwatch.toml",
                r#"
                    library_root = "/srv/hemwatch"

                    [update]
                    include_ignored = true
                "#,
            )?;
            jail.set_env("HEMWATCH_UPDATE__MAX_DELAY_MS", "2000");

            let config = Config::load_from(Path::new("hemwatch.toml")).expect("load");
            assert_eq!(config.library_root, PathBuf::from("/srv/hemwatch"));
            assert!(config.update.include_ignored);
            assert!(!config.update.include_bought);
            assert_eq!(config.update.max_delay_ms, 2000);
            Ok(())
        });
    }

    #[test]
    fn missing_file_still_loads_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load_from(Path::new("does-not-exist.toml")).expect("load");
            assert_eq!(config.update, UpdateConfig::default());
            Ok(())
        });
    }

    #[test]
    fn backend_requires_an_absolute_root() {
        let config =
            Config { library_root: PathBuf::from("relative/library"), ..Config::default() };
        let err = config.backend().err().expect("relative root must be refused");
        assert!(matches!(&*err, ErrorKind::BadLibraryRoot(_)));
    }

    #[test]
    fn backend_opens_a_real_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config =
            Config { library_root: dir.path().to_path_buf(), ..Config::default() };
        let backend = config.backend().expect("backend");
        assert_eq!(backend.name(), "library");
    }
}
