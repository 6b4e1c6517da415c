pub mod manifest;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use manifest::{flatten_payloads, is_falsy, Manifest};

pub const DEFAULT_MANIFEST: &str = "manifest.json";
pub const DEFAULT_CONCURRENCY: usize = 12;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const PROGRESS_TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid location '{location}': {message}")]
    InvalidLocation { location: String, message: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {location}: {source}")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the manifest and every path it lists are resolved from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SiteRoot {
    Http(reqwest::Url),
    Dir(PathBuf),
}

impl SiteRoot {
    /// `http(s)://` values are URLs; anything else is a local directory.
    pub fn parse(value: &str) -> Result<Self, LoadError> {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            let base = if value.ends_with('/') {
                value.to_string()
            } else {
                format!("{value}/")
            };
            let url = reqwest::Url::parse(&base).map_err(|e| LoadError::InvalidLocation {
                location: value.to_string(),
                message: e.to_string(),
            })?;
            return Ok(SiteRoot::Http(url));
        }
        if value.is_empty() {
            return Err(LoadError::InvalidLocation {
                location: value.to_string(),
                message: "site root is empty".to_string(),
            });
        }
        Ok(SiteRoot::Dir(crate::config::expand_tilde(value)))
    }
}

impl fmt::Display for SiteRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteRoot::Http(url) => write!(f, "{url}"),
            SiteRoot::Dir(path) => write!(f, "{}", path.display()),
        }
    }
}

fn relative_path(relative: &str) -> &str {
    let mut rel = relative.trim();
    while let Some(stripped) = rel.strip_prefix("./") {
        rel = stripped;
    }
    rel.trim_start_matches('/')
}

#[derive(Clone, Debug)]
pub struct LoaderOptions {
    pub manifest: String,
    pub concurrency: usize,
    pub timeout_seconds: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            manifest: DEFAULT_MANIFEST.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadOrigin {
    Inline,
    Bundle,
    Files,
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub origin: LoadOrigin,
    /// Documents fetched after the manifest.
    pub requested: usize,
    pub failed: usize,
    pub records: usize,
}

/// Raw records ready for normalization. `raw` is `[]` on total failure.
#[derive(Clone, Debug, PartialEq)]
pub struct Loaded {
    pub raw: Value,
    pub report: LoadReport,
}

impl Loaded {
    fn empty(requested: usize, failed: usize) -> Self {
        Self {
            raw: Value::Array(Vec::new()),
            report: LoadReport {
                origin: LoadOrigin::Empty,
                requested,
                failed,
                records: 0,
            },
        }
    }
}

fn batch_len(raw: &Value) -> usize {
    match raw {
        Value::Array(items) => items.len(),
        Value::Null => 0,
        _ => 1,
    }
}

fn build_client(timeout_seconds: u64) -> Result<reqwest::Client, LoadError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::CACHE_CONTROL,
        reqwest::header::HeaderValue::from_static("no-store"),
    );
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "incident-browser/",
            env!("CARGO_PKG_VERSION")
        )),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
        .build()
        .map_err(|e| LoadError::HttpClientBuild { source: e })
}

/// Fetches a site's records: manifest, then bundle, then per-record files.
pub struct Loader {
    root: SiteRoot,
    options: LoaderOptions,
    client: reqwest::Client,
    progress: ProgressBar,
}

impl Loader {
    pub fn new(root: SiteRoot, options: LoaderOptions) -> Result<Self, LoadError> {
        let client = build_client(options.timeout_seconds)?;
        Ok(Self {
            root,
            options,
            client,
            progress: ProgressBar::hidden(),
        })
    }

    /// Ticks `progress` once per per-record file.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub async fn fetch_json(&self, relative: &str) -> Result<Value, LoadError> {
        let rel = relative_path(relative);
        match &self.root {
            SiteRoot::Http(base) => {
                let url = base.join(rel).map_err(|e| LoadError::InvalidLocation {
                    location: relative.to_string(),
                    message: e.to_string(),
                })?;
                debug!(url = %url, "fetching");
                let resp = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| LoadError::Request {
                        url: url.to_string(),
                        source: e,
                    })?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                let body = resp.text().await.map_err(|e| LoadError::Request {
                    url: url.to_string(),
                    source: e,
                })?;
                serde_json::from_str(&body).map_err(|e| LoadError::Json {
                    location: url.to_string(),
                    source: e,
                })
            }
            SiteRoot::Dir(dir) => {
                let path = dir.join(rel);
                debug!(path = %path.display(), "reading");
                let body = tokio::fs::read_to_string(&path).await.map_err(|e| LoadError::Read {
                    path: path.display().to_string(),
                    source: e,
                })?;
                serde_json::from_str(&body).map_err(|e| LoadError::Json {
                    location: path.display().to_string(),
                    source: e,
                })
            }
        }
    }

    /// Never fails: every error degrades to fewer (possibly zero) records.
    pub async fn load(&self) -> Loaded {
        let manifest = match self.fetch_json(&self.options.manifest).await {
            Ok(value) => Manifest::from_value(value),
            Err(e) => {
                error!(root = %self.root, error = %e, "failed to read manifest");
                return Loaded::empty(0, 0);
            }
        };

        let (bundle, files) = match manifest {
            Manifest::Inline(items) => {
                let records = items.len();
                info!(records, "manifest carries records inline");
                return Loaded {
                    raw: Value::Array(items),
                    report: LoadReport {
                        origin: LoadOrigin::Inline,
                        requested: 0,
                        failed: 0,
                        records,
                    },
                };
            }
            Manifest::Index { bundle, files } => (bundle, files),
        };

        let mut requested = 0;
        let mut failed = 0;
        if let Some(bundle) = bundle {
            requested += 1;
            match self.fetch_json(&bundle).await {
                Ok(raw) => {
                    let records = batch_len(&raw);
                    info!(bundle = %bundle, records, "bundle loaded");
                    return Loaded {
                        raw,
                        report: LoadReport {
                            origin: LoadOrigin::Bundle,
                            requested,
                            failed,
                            records,
                        },
                    };
                }
                Err(e) => {
                    failed += 1;
                    warn!(bundle = %bundle, error = %e, "bundle unavailable, falling back to files");
                }
            }
        }

        if files.is_empty() {
            info!("manifest lists no record files");
            return Loaded::empty(requested, failed);
        }

        let (records, file_failures) = self.load_files(&files).await;
        Loaded {
            report: LoadReport {
                origin: LoadOrigin::Files,
                requested: requested + files.len(),
                failed: failed + file_failures,
                records: records.len(),
            },
            raw: Value::Array(records),
        }
    }

    /// Fetches `files` with bounded concurrency, keeping manifest order.
    async fn load_files(&self, files: &[String]) -> (Vec<Value>, usize) {
        let limit = self.options.concurrency.max(1);
        debug!(files = files.len(), limit, "fetching record files");
        self.progress.set_length(files.len() as u64);
        self.progress.enable_steady_tick(PROGRESS_TICK);

        let results: Vec<Option<Value>> = stream::iter(files.iter())
            .map(|file| async move {
                let result = self.fetch_json(file).await;
                self.progress.inc(1);
                match result {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(file = %file, error = %e, "dropping record file");
                        None
                    }
                }
            })
            .buffered(limit)
            .collect()
            .await;
        self.progress.finish_and_clear();

        let failures = results.iter().filter(|r| r.is_none()).count();
        let records = flatten_payloads(results.into_iter().flatten());
        info!(records = records.len(), failures, "record files loaded");
        (records, failures)
    }
}
