use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Filesystem capability scoped to a single root directory.
///
/// Every path handed to these methods is relative to the root. Implementations must refuse
/// anything that would resolve outside of it.
#[async_trait]
pub trait LocalFileStore: Send + Sync {
    async fn write(&self, relative: &Path, bytes: &[u8]) -> io::Result<()>;
    async fn delete(&self, relative: &Path) -> io::Result<()>;
    async fn exists(&self, relative: &Path) -> bool;
    fn root(&self) -> &Path;
}

#[derive(Debug, Clone)]
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative: &Path) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        let mut depth = 0usize;
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path escapes storage root: {}", relative.display()),
                    ));
                }
            }
        }
        if depth == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty storage path",
            ));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl LocalFileStore for DiskFileStore {
    async fn write(&self, relative: &Path, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await
    }

    async fn delete(&self, relative: &Path) -> io::Result<()> {
        let path = self.resolve(relative)?;
        tokio::fs::remove_file(path).await
    }

    async fn exists(&self, relative: &Path) -> bool {
        match self.resolve(relative) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
