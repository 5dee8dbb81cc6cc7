//! Fetching of externally stored values (`type:< url`).

use std::io;
use std::path::PathBuf;

use url::Url;

/// Source of the bytes behind a `:<` URL value.
pub trait UrlResolver: Send + Sync {
    /// Return the raw content named by `url`.
    fn fetch(&self, url: &str) -> io::Result<Vec<u8>>;
}

/// Reads `file://` URLs from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResolver;

/// Rejects every URL. Useful when input must not touch the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

/// Translate a `file://` URL into a local path.
///
/// `Url::to_file_path` drops the separator in front of a drive letter on
/// Windows, so `file:///C:/x` becomes `C:\x` there and `/C:/x` elsewhere.
pub fn file_url_to_path(url: &str) -> io::Result<PathBuf> {
    let parsed = Url::parse(url)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}: {}", url, e)))?;
    if parsed.scheme() != "file" {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("unsupported URL scheme {:?}", parsed.scheme()),
        ));
    }
    parsed.to_file_path().map_err(|()| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a local file", url),
        )
    })
}

impl UrlResolver for FileResolver {
    fn fetch(&self, url: &str) -> io::Result<Vec<u8>> {
        let path = file_url_to_path(url)?;
        tracing::debug!(path = %path.display(), "reading external value");
        std::fs::read(path)
    }
}

impl UrlResolver for NoResolver {
    fn fetch(&self, url: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("external values are disabled ({})", url),
        ))
    }
}

impl<F> UrlResolver for F
where
    F: Fn(&str) -> io::Result<Vec<u8>> + Send + Sync,
{
    fn fetch(&self, url: &str) -> io::Result<Vec<u8>> {
        self(url)
    }
}
