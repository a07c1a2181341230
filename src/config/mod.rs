// src/config/mod.rs
pub mod types;

pub use self::types::{ClangdConfig, Config, LoadConfig, PathsConfig, PioClangdToml};

use crate::error::{PioError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pioclangd.toml";

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config from `pioclangd.toml` in `root`, or defaults if absent.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Self::new();
        config.load_local_config(root)?;
        Ok(config)
    }

    /// Overlays `pioclangd.toml` from `root` onto this config.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load_local_config(&mut self, root: &Path) -> Result<()> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(&path).map_err(|source| {
            PioError::ConfigUnreadable {
                path: path.clone(),
                source,
            }
        })?;
        self.parse_toml(&content)
            .map_err(|source| PioError::InvalidConfig { path, source })
    }

    /// Applies a TOML document to the file-backed sections.
    ///
    /// # Errors
    /// Returns the TOML error if `content` is malformed.
    pub fn parse_toml(&mut self, content: &str) -> std::result::Result<(), toml::de::Error> {
        let parsed: PioClangdToml = toml::from_str(content)?;
        self.paths = parsed.paths;
        self.load = parsed.load;
        self.clangd = parsed.clangd;
        Ok(())
    }

    /// Location of one environment's database under `root`.
    #[must_use]
    pub fn database_path(&self, root: &Path, env: &str) -> PathBuf {
        root.join(&self.paths.build_dir)
            .join(env)
            .join(&self.paths.database)
    }

    /// Location of the merged database. Absolute outputs are used as given.
    #[must_use]
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.output)
    }

    /// Location of the generated `.clangd` file.
    #[must_use]
    pub fn clangd_output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.clangd.output)
    }
}
