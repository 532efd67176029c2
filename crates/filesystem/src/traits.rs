//! File system abstraction used to load and save configurations

use crate::location::{url_base_path, url_file_name, Location};
use crate::sink::OutputSink;
use async_trait::async_trait;
use reqwest::Url;
use tokio::io::AsyncRead;
use types::FileSystemError;

/// Readable byte stream of a configuration source
pub type InputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Trait for resolving and opening configuration sources
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Resolve a file name against an optional base path or URL
    fn locate(&self, base_path: Option<&str>, file_name: &str) -> Result<Location, FileSystemError>;

    /// Open a resolved location for reading
    async fn read_location(&self, location: &Location) -> Result<InputStream, FileSystemError>;

    /// Open a location for writing
    async fn output_stream(&self, location: &Location) -> Result<OutputSink, FileSystemError>;

    /// Resolve a URL and check that it can be read
    async fn locate_from_url(&self, base_path: Option<&str>, file_name: &str) -> Option<Url>;

    /// Resolve and open a source for reading
    async fn input_stream(
        &self,
        base_path: Option<&str>,
        file_name: &str,
    ) -> Result<InputStream, FileSystemError> {
        let location = self.locate(base_path, file_name)?;
        self.read_location(&location).await
    }

    /// Path of a location: absolute file path or URL path
    fn path(&self, location: &Location) -> Option<String> {
        match location {
            Location::File(path) => std::path::absolute(path)
                .ok()
                .map(|p| p.display().to_string()),
            Location::Url(url) => Some(url.path().to_string()),
        }
    }

    /// The directory part of a path or URL, ending with `/`
    fn base_path(&self, path: &str) -> Option<String> {
        let url = self.locate(None, path).ok()?.to_url().ok()?;
        Some(url_base_path(&url))
    }

    /// The file part of a path or URL
    fn file_name(&self, path: &str) -> Option<String> {
        let url = self.locate(None, path).ok()?.to_url().ok()?;
        url_file_name(&url)
    }
}
