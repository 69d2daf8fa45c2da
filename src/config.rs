use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::catalog::catalog_url;

const CATALOG_FILE: &str = "data.json";
const LOG_FILE: &str = "jobboard.log";

/// Where log records go. The board owns the terminal, so it logs to a file.
#[derive(Debug, Clone, PartialEq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL or filesystem path of the catalog.
    pub source: String,
    pub log_level: log::LevelFilter,
}

impl Config {
    pub fn new(source: Option<String>, base_url: Option<String>, verbose: bool) -> Self {
        let source = source
            .or_else(|| base_url.map(|base| catalog_url(&base)))
            .unwrap_or_else(|| Self::default_source().display().to_string());
        let log_level = if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        Self { source, log_level }
    }

    /// `./data.json`, else `data.json` in the per-user data directory, else `./data.json` anyway.
    pub fn default_source() -> PathBuf {
        let local = PathBuf::from(CATALOG_FILE);
        if local.exists() {
            return local;
        }
        Self::data_dir_source()
            .filter(|path| path.exists())
            .unwrap_or(local)
    }

    fn data_dir_source() -> Option<PathBuf> {
        data_dir().map(|dir| data_file_in(&dir))
    }

    pub fn log_target(&self, interactive: bool) -> LogTarget {
        if !interactive {
            return LogTarget::Stderr;
        }
        let path = data_dir()
            .map(|dir| dir.join(LOG_FILE))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE));
        LogTarget::File(path)
    }
}

fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "jobboard").map(|dirs| dirs.data_dir().to_path_buf())
}

fn data_file_in(dir: &Path) -> PathBuf {
    dir.join(CATALOG_FILE)
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

pub fn init_logger(default_level: log::LevelFilter, target: &LogTarget) -> Result<()> {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(default_level).parse_default_env();
    if let LogTarget::File(path) = target {
        let file = open_log_file(path)?;
        builder
            .target(env_logger::Target::Pipe(Box::new(file)))
            .write_style(env_logger::WriteStyle::Never);
    }
    builder.init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_source_wins() {
        let config = Config::new(
            Some("jobs.json".to_string()),
            Some("http://localhost:5173".to_string()),
            false,
        );
        assert_eq!(config.source, "jobs.json");
        assert_eq!(config.log_level, log::LevelFilter::Warn);
    }

    #[test]
    fn test_base_url_uses_fixed_path() {
        let config = Config::new(None, Some("http://localhost:5173/".to_string()), true);
        assert_eq!(config.source, "http://localhost:5173/data.json");
        assert_eq!(config.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn test_default_source_is_a_data_json() {
        let config = Config::new(None, None, false);
        assert!(config.source.ends_with("data.json"));
    }

    #[test]
    fn test_board_logs_to_file() {
        let config = Config::new(Some("data.json".to_string()), None, false);
        match config.log_target(true) {
            LogTarget::File(path) => assert!(path.ends_with(LOG_FILE)),
            LogTarget::Stderr => panic!("board must not log to stderr"),
        }
        assert_eq!(config.log_target(false), LogTarget::Stderr);
    }

    #[test]
    fn test_open_log_file_creates_directories() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("jobboard-log-{}", nanos));
        let path = dir.join("nested").join(LOG_FILE);

        open_log_file(&path).unwrap();
        assert!(path.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_data_file_in() {
        assert_eq!(data_file_in(Path::new("/tmp/x")), PathBuf::from("/tmp/x/data.json"));
    }
}
