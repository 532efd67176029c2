//! Writable targets for saving configurations

use crate::location::Location;
use reqwest::{Client, Url};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use types::FileSystemError;

/// Writable sink for a configuration location.
///
/// Bytes written to a remote sink are buffered and only sent when the sink
/// is finished; a failed upload is reported by [`OutputSink::finish`].
#[derive(Debug)]
pub struct OutputSink {
    target: SinkTarget,
}

#[derive(Debug)]
enum SinkTarget {
    File {
        path: PathBuf,
        file: tokio::fs::File,
    },
    Http {
        client: Client,
        url: Url,
        buffer: Vec<u8>,
    },
}

impl OutputSink {
    pub(crate) fn file(path: PathBuf, file: tokio::fs::File) -> Self {
        Self {
            target: SinkTarget::File { path, file },
        }
    }

    pub(crate) fn http(client: Client, url: Url) -> Self {
        Self {
            target: SinkTarget::Http {
                client,
                url,
                buffer: Vec::new(),
            },
        }
    }

    /// Where this sink writes to
    pub fn location(&self) -> Location {
        match &self.target {
            SinkTarget::File { path, .. } => Location::File(path.clone()),
            SinkTarget::Http { url, .. } => Location::Url(url.clone()),
        }
    }

    /// Write all bytes to the sink
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), FileSystemError> {
        match &mut self.target {
            SinkTarget::File { path, file } => file
                .write_all(bytes)
                .await
                .map_err(|e| FileSystemError::io(path.display(), e)),
            SinkTarget::Http { buffer, .. } => {
                buffer.extend_from_slice(bytes);
                Ok(())
            }
        }
    }

    /// Commit the written bytes.
    ///
    /// Files are flushed; remote targets receive a `PUT` and any non-success
    /// status is returned as [`FileSystemError::Http`].
    pub async fn finish(self) -> Result<(), FileSystemError> {
        match self.target {
            SinkTarget::File { path, mut file } => {
                file.flush()
                    .await
                    .map_err(|e| FileSystemError::io(path.display(), e))?;
                tracing::debug!(path = %path.display(), "Configuration file written");
                Ok(())
            }
            SinkTarget::Http {
                client,
                url,
                buffer,
            } => {
                let size = buffer.len();
                let response = client
                    .put(url.clone())
                    .body(buffer)
                    .send()
                    .await
                    .map_err(|e| FileSystemError::Transport {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;

                let status = response.status();
                if status.is_client_error() || status.is_server_error() {
                    tracing::warn!(url = %url, status = status.as_u16(), "Upload rejected");
                    return Err(FileSystemError::Http {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }

                tracing::info!(url = %url, bytes = size, "Configuration uploaded");
                Ok(())
            }
        }
    }
}
