//! Centralized path management for the komal CLI
//!
//! Data files (identifier cache, processed log) live in the platform data
//! directory; the configuration file lives in the platform config directory.

use std::path::PathBuf;

/// The name of the application directory used across all platforms
const APP_DIR: &str = "komal";

/// File name of the identifier cache, compatible with older `mal_links.json` files
const CACHE_FILE: &str = "mal_links.json";

/// File name of the processed log
const PROGRESS_FILE: &str = "series.progress";

const CONFIG_FILE: &str = "config.toml";

/// Returns the base data directory for the application
///
/// `~/.local/share/komal` on Linux, the application data directory elsewhere,
/// and `.komal` in the current directory when neither can be determined.
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".komal"))
}

/// Default location of the identifier cache
pub fn default_cache_file() -> PathBuf {
    get_data_dir().join(CACHE_FILE)
}

/// Default location of the processed log
pub fn default_progress_file() -> PathBuf {
    get_data_dir().join(PROGRESS_FILE)
}

/// Returns the configuration directory
///
/// `XDG_CONFIG_HOME` wins on Unix-like systems so tests and containers can
/// relocate it.
pub fn get_config_dir() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join(APP_DIR);
    }

    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".komal"))
}

/// Returns the path to the configuration file
pub fn get_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_files_are_in_data_dir() {
        let data_dir = get_data_dir();
        assert!(default_cache_file().starts_with(&data_dir));
        assert!(default_progress_file().starts_with(&data_dir));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            default_cache_file().file_name().and_then(|n| n.to_str()),
            Some(CACHE_FILE)
        );
        assert_eq!(
            default_progress_file().file_name().and_then(|n| n.to_str()),
            Some(PROGRESS_FILE)
        );
    }

    #[test]
    fn test_config_path_is_in_config_dir() {
        let config_path = get_config_path();
        assert!(config_path.starts_with(get_config_dir()));
        assert!(config_path.to_string_lossy().contains(APP_DIR));
    }
}
