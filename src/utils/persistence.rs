//! Locating the ~/.portfolio/ data directory.

use crate::constants::DATA_DIR_NAME;
use crate::error::{Result, TrophyError};
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the ~/.portfolio/ directory, without touching the filesystem.
pub fn data_dir_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or(TrophyError::NoDataDir)?;
    Ok(home_dir.join(DATA_DIR_NAME))
}

/// Get the ~/.portfolio/ directory path, creating it if needed.
pub fn data_dir() -> Result<PathBuf> {
    let dir = data_dir_path()?;
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Path of the JSON file backing `key` inside `dir`.
pub fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_path_format() {
        let dir = data_dir_path().expect("home directory should resolve");
        assert!(dir.ends_with(".portfolio"));
    }

    #[test]
    fn test_key_path_appends_json_extension() {
        let path = key_path(Path::new("/tmp/portfolio"), "achievements");
        assert_eq!(path, PathBuf::from("/tmp/portfolio/achievements.json"));
    }
}
