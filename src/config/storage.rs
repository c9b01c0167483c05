//! Reading and writing `config.toml`

use super::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config/cache roots
pub(crate) const APP_DIR: &str = "git-stack";

/// Filename for user configuration
const CONFIG_FILE: &str = "config.toml";

/// Location of the user config file
pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the user config from its standard location
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Load config from `path`.
///
/// Returns the default `Config` if the file doesn't exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Save config to `path`, creating parent directories as needed
pub fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Config(format!("failed to create {}: {e}", dir.display())))?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

    fs::write(path, format!("# git-stack configuration\n\n{content}"))
        .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))
}
