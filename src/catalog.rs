use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::models::Job;

/// Fixed static path of the catalog on a web host.
pub const CATALOG_PATH: &str = "/data.json";

// --- Source trait ---

pub trait CatalogSource: Send {
    fn fetch(&self) -> Result<String>;
    fn describe(&self) -> String;
}

pub fn resolve_source(location: &str) -> Box<dyn CatalogSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location.to_string()))
    } else {
        Box::new(FileSource::new(PathBuf::from(location)))
    }
}

/// Joins a site root with the fixed catalog path.
pub fn catalog_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), CATALOG_PATH)
}

// --- HTTP source ---

#[derive(Debug)]
pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(url: String) -> Self {
        let client = reqwest::blocking::Client::new();
        Self { url, client }
    }
}

impl CatalogSource for HttpSource {
    fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .with_context(|| format!("Failed to send request to {}", self.url))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow!("Catalog request to {} failed with status {}", self.url, status));
        }

        response
            .text()
            .with_context(|| format!("Failed to read response body from {}", self.url))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// --- File source ---

#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CatalogSource for FileSource {
    fn fetch(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read catalog file: {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// --- Decoding ---

/// Decodes a catalog body. The top level must be an array; elements that do not
/// decode as a job are dropped and logged, the rest are kept in order.
pub fn decode_catalog(body: &str) -> Result<Vec<Job>> {
    let value: serde_json::Value =
        serde_json::from_str(body).context("Catalog is not valid JSON")?;
    let serde_json::Value::Array(items) = value else {
        return Err(anyhow!("Catalog must be a JSON array"));
    };

    let mut jobs = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Job>(item) {
            Ok(job) => jobs.push(job),
            Err(e) => log::warn!("Dropping malformed job record at index {}: {}", index, e),
        }
    }
    Ok(jobs)
}

/// Fetches and decodes once. Any failure is logged and yields an empty catalog.
pub fn load_catalog(source: &dyn CatalogSource) -> Vec<Job> {
    log::debug!("Loading catalog from {}", source.describe());
    match source.fetch().and_then(|body| decode_catalog(&body)) {
        Ok(jobs) => {
            log::info!("Loaded {} jobs from {}", jobs.len(), source.describe());
            jobs
        }
        Err(e) => {
            log::error!("Failed to fetch jobs from {}: {:#}", source.describe(), e);
            Vec::new()
        }
    }
}

// --- Background loading ---

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    #[default]
    NotStarted,
    Loading,
    /// Loaded, or failed and recovered as an empty catalog.
    Finished(Vec<Job>),
}

impl LoadStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, LoadStatus::Finished(_))
    }

    pub fn jobs(&self) -> &[Job] {
        match self {
            LoadStatus::Finished(jobs) => jobs,
            _ => &[],
        }
    }
}

/// Runs one catalog load off the UI thread. Dropping it before completion discards the result.
#[derive(Default)]
pub struct CatalogLoader {
    status: LoadStatus,
    receiver: Option<Receiver<Vec<Job>>>,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn finished(jobs: Vec<Job>) -> Self {
        Self {
            status: LoadStatus::Finished(jobs),
            receiver: None,
        }
    }

    pub fn spawn(source: Box<dyn CatalogSource>) -> Self {
        let mut loader = Self::new();
        loader.start(source);
        loader
    }

    pub fn start(&mut self, source: Box<dyn CatalogSource>) {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let jobs = load_catalog(source.as_ref());
            // Receiver is gone if the view was torn down first.
            let _ = tx.send(jobs);
        });
        self.receiver = Some(rx);
        self.status = LoadStatus::Loading;
    }

    /// Non-blocking. Returns true when this call moved the status to finished.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.receiver else {
            return false;
        };
        let jobs = match rx.try_recv() {
            Ok(jobs) => jobs,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                log::error!("Catalog loader thread exited without a result");
                Vec::new()
            }
        };
        self.receiver = None;
        self.status = LoadStatus::Finished(jobs);
        true
    }

    /// Blocks until the current load resolves.
    #[cfg(test)]
    pub(crate) fn wait(&mut self) -> &[Job] {
        if let Some(rx) = self.receiver.take() {
            let jobs = rx.recv().unwrap_or_else(|_| {
                log::error!("Catalog loader thread exited without a result");
                Vec::new()
            });
            self.status = LoadStatus::Finished(jobs);
        }
        self.status.jobs()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct StaticSource(Result<String, String>);

    impl CatalogSource for StaticSource {
        fn fetch(&self) -> Result<String> {
            self.0.clone().map_err(|e| anyhow!(e))
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    const TWO_JOBS: &str = r#"[
        {"id": 1, "company": "Photosnap", "logo": "a.svg", "new": true, "featured": true,
         "position": "Senior Frontend Developer", "role": "Frontend", "level": "Senior",
         "postedAt": "1d ago", "contract": "Full Time", "location": "USA Only",
         "languages": ["HTML", "CSS"], "tools": []},
        {"id": 2, "company": "Manage", "logo": "b.svg", "new": false, "featured": false,
         "position": "Fullstack Developer", "role": "Fullstack", "level": "Midweight",
         "postedAt": "1d ago", "contract": "Part Time", "location": "Remote",
         "languages": ["Python"], "tools": ["React"], "description": "ignored"}
    ]"#;

    #[test]
    fn test_decode_catalog() {
        let jobs = decode_catalog(TWO_JOBS).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].company, "Photosnap");
        assert_eq!(jobs[1].tools, vec!["React"]);
    }

    #[test]
    fn test_decode_catalog_rejects_non_array() {
        assert!(decode_catalog(r#"{"jobs": []}"#).is_err());
        assert!(decode_catalog("not json").is_err());
    }

    #[test]
    fn test_decode_catalog_drops_malformed_record() {
        let body = r#"[
            {"id": 1, "company": "Missing most fields"},
            {"id": 2, "company": "Eyecam Co.", "logo": "c.svg", "new": false, "featured": false,
             "position": "Full Stack Engineer", "role": "Fullstack", "level": "Midweight",
             "postedAt": "3w ago", "contract": "Full Time", "location": "Worldwide",
             "languages": ["JavaScript", "Python"], "tools": ["Django"]},
            42
        ]"#;
        let jobs = decode_catalog(body).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, 2);
    }

    #[test]
    fn test_load_catalog_failure_yields_empty() {
        let source = StaticSource(Err("connection refused".to_string()));
        assert!(load_catalog(&source).is_empty());

        let source = StaticSource(Ok("{}".to_string()));
        assert!(load_catalog(&source).is_empty());
    }

    #[test]
    fn test_resolve_source() {
        assert_eq!(resolve_source("https://example.com/data.json").describe(), "https://example.com/data.json");
        assert_eq!(resolve_source("http://localhost:8080/data.json").describe(), "http://localhost:8080/data.json");
        assert_eq!(resolve_source("data/data.json").describe(), "data/data.json");
    }

    #[test]
    fn test_catalog_url() {
        assert_eq!(catalog_url("http://localhost:5173"), "http://localhost:5173/data.json");
        assert_eq!(catalog_url("http://localhost:5173/"), "http://localhost:5173/data.json");
    }

    #[test]
    fn test_file_source() {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let path = std::env::temp_dir().join(format!("jobboard-test-{}.json", nanos));
        fs::write(&path, TWO_JOBS).unwrap();

        let jobs = load_catalog(&FileSource::new(path.clone()));
        fs::remove_file(&path).unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, 1);
    }

    #[test]
    fn test_file_source_missing_file() {
        let source = FileSource::new(PathBuf::from("/nonexistent/jobboard/data.json"));
        let err = source.fetch().unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog file"));
        assert!(load_catalog(&source).is_empty());
    }

    #[test]
    fn test_loader_status_transitions() {
        let mut loader = CatalogLoader::new();
        assert_eq!(loader.status(), &LoadStatus::NotStarted);
        assert!(!loader.poll());

        loader.start(Box::new(StaticSource(Ok(TWO_JOBS.to_string()))));
        assert_eq!(loader.status(), &LoadStatus::Loading);
        assert!(loader.status().jobs().is_empty());
        assert_eq!(loader.wait().len(), 2);
        assert!(loader.status().is_finished());
        assert!(!loader.poll());
    }

    #[test]
    fn test_loader_failure_finishes_empty() {
        let mut loader = CatalogLoader::spawn(Box::new(StaticSource(Err("boom".to_string()))));
        assert!(loader.wait().is_empty());
        assert_eq!(loader.status(), &LoadStatus::Finished(Vec::new()));
    }

    #[test]
    fn test_loader_poll_until_finished() {
        let mut loader = CatalogLoader::spawn(Box::new(StaticSource(Ok("[]".to_string()))));
        while !loader.poll() {
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(loader.status(), &LoadStatus::Finished(Vec::new()));
    }

    #[test]
    #[ignore] // Needs network access
    fn test_http_source() {
        let source = HttpSource::new("https://example.com/data.json".to_string());
        let result = source.fetch();
        assert!(result.is_ok() || result.is_err());
    }
}
