//! File system backed by local files and an HTTP client

use crate::location::Location;
use crate::sink::OutputSink;
use crate::traits::{FileSystem, InputStream};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use types::FileSystemError;

/// HTTP settings for remote configuration sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSystemOptions {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("confkit/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FileSystemOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

/// File system that reads local paths with tokio and URLs with reqwest
#[derive(Debug, Clone)]
pub struct DefaultFileSystem {
    http_client: Client,
}

impl DefaultFileSystem {
    /// Create a file system with the given HTTP options
    pub fn new(options: &FileSystemOptions) -> Result<Self, FileSystemError> {
        let http_client = client_builder(options)
            .build()
            .map_err(|e| FileSystemError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { http_client })
    }

    async fn open_file(&self, path: &Path) -> Result<InputStream, FileSystemError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FileSystemError::NotFound {
                    name: path.display().to_string(),
                }
            } else {
                FileSystemError::io(path.display(), e)
            }
        })?;

        if metadata.is_dir() {
            return Err(FileSystemError::Directory {
                path: path.display().to_string(),
            });
        }

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| FileSystemError::io(path.display(), e))?;

        debug!(path = %path.display(), "Opened configuration file");
        Ok(Box::new(file))
    }

    async fn open_url(&self, url: &Url) -> Result<InputStream, FileSystemError> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FileSystemError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FileSystemError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FileSystemError::Transport {
            url: url.to_string(),
            message: format!("error reading response body: {}", e),
        })?;

        debug!(url = %url, bytes = body.len(), "Fetched configuration");
        Ok(Box::new(Cursor::new(body.to_vec())))
    }
}

fn client_builder(options: &FileSystemOptions) -> ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(options.timeout_seconds))
        .user_agent(options.user_agent.as_str())
}

impl Default for DefaultFileSystem {
    fn default() -> Self {
        let http_client = client_builder(&FileSystemOptions::default())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to an HTTP client without options");
                Client::new()
            });
        Self { http_client }
    }
}

#[async_trait]
impl FileSystem for DefaultFileSystem {
    fn locate(&self, base_path: Option<&str>, file_name: &str) -> Result<Location, FileSystemError> {
        let path = Path::new(file_name);
        if path.is_absolute() {
            return Ok(Location::File(path.to_path_buf()));
        }

        match base_path {
            None => Ok(match Url::parse(file_name) {
                Ok(url) => Location::from_url(url),
                Err(_) => Location::File(path.to_path_buf()),
            }),
            Some(base) => match Url::parse(base) {
                Ok(base_url) => base_url
                    .join(file_name)
                    .map(Location::from_url)
                    .map_err(|e| FileSystemError::InvalidLocation {
                        location: format!("{} + {}", base, file_name),
                        message: e.to_string(),
                    }),
                Err(_) => Ok(Location::File(Path::new(base).join(file_name))),
            },
        }
    }

    async fn read_location(&self, location: &Location) -> Result<InputStream, FileSystemError> {
        match location {
            Location::File(path) => self.open_file(path).await,
            Location::Url(url) => self.open_url(url).await,
        }
    }

    async fn output_stream(&self, location: &Location) -> Result<OutputSink, FileSystemError> {
        match location {
            Location::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| FileSystemError::io(parent.display(), e))?;
                }
                let file = tokio::fs::File::create(path)
                    .await
                    .map_err(|e| FileSystemError::io(path.display(), e))?;

                info!(path = %path.display(), "Saving configuration to file");
                Ok(OutputSink::file(path.clone(), file))
            }
            Location::Url(url) => match url.scheme() {
                "http" | "https" => {
                    info!(url = %url, "Saving configuration to URL");
                    Ok(OutputSink::http(self.http_client.clone(), url.clone()))
                }
                scheme => Err(FileSystemError::InvalidLocation {
                    location: url.to_string(),
                    message: format!("cannot save to {} URLs", scheme),
                }),
            },
        }
    }

    async fn locate_from_url(&self, base_path: Option<&str>, file_name: &str) -> Option<Url> {
        let Some(base) = base_path else {
            return Url::parse(file_name).ok();
        };

        let url = match Url::parse(base).and_then(|b| b.join(file_name)) {
            Ok(url) => url,
            Err(e) => {
                debug!(base = base, file = file_name, error = %e, "Could not build URL");
                return None;
            }
        };

        match self.read_location(&Location::from_url(url.clone())).await {
            Ok(_) => Some(url),
            Err(e) => {
                debug!(base = base, file = file_name, error = %e, "Could not locate file");
                None
            }
        }
    }
}
