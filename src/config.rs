//! Console configuration loaded from the user's config directory.

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "console.toml";
const HISTORY_FILE: &str = "history";

/// Console settings read from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Primary prompt.
    pub prompt: String,
    /// Prompt shown while a block is still open (basic console only).
    pub continuation_prompt: String,
    /// Interpreter library used when neither `--lib` nor `PYTHON0_LIB` is set.
    pub library: Option<PathBuf>,
    /// Persist line history between sessions.
    pub history: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: ">>> ".to_string(),
            continuation_prompt: "... ".to_string(),
            library: None,
            history: true,
        }
    }
}

fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("dev", "new0", "new0")
        .ok_or_else(|| anyhow::anyhow!("unable to determine configuration directory"))
}

impl ConsoleConfig {
    /// Load configuration from disk or fall back to defaults when absent.
    pub fn load() -> anyhow::Result<Self> {
        let dirs = project_dirs()?;
        Self::load_from(&dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load configuration from `path`, using defaults when it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("parsing configuration {}", path.display()))
    }

    /// History file location, creating its directory. `None` when disabled.
    pub fn history_path(&self) -> anyhow::Result<Option<PathBuf>> {
        if !self.history {
            return Ok(None);
        }
        let dirs = project_dirs()?;
        let data_dir = dirs.data_local_dir();
        fs::create_dir_all(data_dir).context("creating new0 data directory")?;
        Ok(Some(data_dir.join(HISTORY_FILE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ConsoleConfig::load_from(&dir.path().join("console.toml")).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("console.toml");
        fs::write(&path, "library = \"/opt/python0/libpython0.so\"\nhistory = false\n").unwrap();
        let config = ConsoleConfig::load_from(&path).unwrap();
        assert_eq!(
            config.library.as_deref(),
            Some(Path::new("/opt/python0/libpython0.so"))
        );
        assert!(!config.history);
        assert_eq!(config.prompt, ">>> ");
        assert!(config.history_path().unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("console.toml");
        fs::write(&path, "history = \"sometimes\"").unwrap();
        let err = ConsoleConfig::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing configuration"));
    }
}
