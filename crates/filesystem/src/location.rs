//! Resolved configuration locations

use reqwest::Url;
use std::fmt;
use std::path::PathBuf;
use types::FileSystemError;

/// Where a configuration source lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Local file path
    File(PathBuf),
    /// Remote resource (http or https)
    Url(Url),
}

impl Location {
    /// Build a location from a URL, mapping `file:` URLs to paths
    pub fn from_url(url: Url) -> Self {
        if url.scheme() == "file" {
            if let Ok(path) = url.to_file_path() {
                return Location::File(path);
            }
        }
        Location::Url(url)
    }

    /// Whether the location is on the local file system
    pub fn is_file(&self) -> bool {
        matches!(self, Location::File(_))
    }

    /// Express the location as an absolute URL
    pub fn to_url(&self) -> Result<Url, FileSystemError> {
        match self {
            Location::Url(url) => Ok(url.clone()),
            Location::File(path) => {
                let absolute = std::path::absolute(path)
                    .map_err(|e| FileSystemError::io(path.display(), e))?;
                Url::from_file_path(&absolute).map_err(|_| FileSystemError::InvalidLocation {
                    location: absolute.display().to_string(),
                    message: "path cannot be expressed as a file URL".to_string(),
                })
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Url(url) => write!(f, "{}", url),
        }
    }
}

/// The URL up to and including its last `/`
pub fn url_base_path(url: &Url) -> String {
    let s = url.as_str();
    if s.ends_with('/') || url.path().is_empty() {
        return s.to_string();
    }
    match s.rfind('/') {
        Some(idx) => s[..=idx].to_string(),
        None => s.to_string(),
    }
}

/// The last path segment of a URL, `None` for directory URLs
pub fn url_file_name(url: &Url) -> Option<String> {
    let path = url.path();
    if path.is_empty() || path.ends_with('/') {
        return None;
    }
    Some(match path.rfind('/') {
        Some(idx) => path[idx + 1..].to_string(),
        None => path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_becomes_path() {
        let url = Url::parse("file:///etc/app/config.properties").unwrap();
        assert_eq!(
            Location::from_url(url),
            Location::File(PathBuf::from("/etc/app/config.properties"))
        );

        let url = Url::parse("https://example.com/app.properties").unwrap();
        assert!(!Location::from_url(url).is_file());
    }

    #[test]
    fn test_relative_file_to_url() {
        let url = Location::File(PathBuf::from("conf/app.properties")).to_url().unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/conf/app.properties"));
    }

    #[test]
    fn test_url_base_path_and_file_name() {
        let url = Url::parse("http://host/conf/app.properties").unwrap();
        assert_eq!(url_base_path(&url), "http://host/conf/");
        assert_eq!(url_file_name(&url).as_deref(), Some("app.properties"));

        let dir = Url::parse("http://host/conf/").unwrap();
        assert_eq!(url_base_path(&dir), "http://host/conf/");
        assert_eq!(url_file_name(&dir), None);
    }
}
