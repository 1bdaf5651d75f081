//! Local filesystem seam used by file uploads

use std::io;
use std::path::Path;

use async_trait::async_trait;
use sel_core::UploadReader;

/// What an upload needs to know about a local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// Base name, used as the object name
    pub name: String,
    pub size: u64,
}

/// Opens and stats local files
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn open(&self, path: &Path) -> io::Result<UploadReader>;

    async fn stat(&self, path: &Path) -> io::Result<FileStat>;
}

/// [`FileSystem`] over `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn open(&self, path: &Path) -> io::Result<UploadReader> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::new(file))
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                )
            })?;

        Ok(FileStat {
            name,
            size: metadata.len(),
        })
    }
}
