//! Download directory management
//!
//! [`FileStore`] wraps the directory the download tool writes into. It lists
//! regular files recursively, resolves user-supplied file names without letting
//! them escape the directory, and deletes single files or the whole tree.
//!
//! The directory is shared with running downloads and is not locked, so a file
//! seen by [`FileStore::list`] may be gone by the time it is fetched or deleted.
//! Callers should treat [`Error::NotFound`] from those operations as expected.

use crate::error::{Error, Result};
use crate::types::{ClearReport, FileRecord};
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

mod resolve;

use resolve::basename;

/// A resolved file opened for streaming
#[derive(Debug)]
pub struct StoredFile {
    /// Open handle positioned at the start of the file
    pub file: fs::File,
    /// Resolved file name
    pub name: String,
    /// Size in bytes at open time
    pub size: u64,
}

/// Adapter over the managed download directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl FileStore {
    /// Open the store at `root`, creating the directory if needed
    ///
    /// The root is canonicalized so every [`FileRecord::path`] is absolute.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| Error::storage(&root, e))?;
        let root = fs::canonicalize(&root)
            .await
            .map_err(|e| Error::storage(&root, e))?;

        debug!(root = %root.display(), "file store ready");

        Ok(Self {
            root,
            public_base_url: None,
        })
    }

    /// Prefix retrieval URLs with an absolute base, e.g. `https://panel.example.net`
    pub fn with_public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    /// The managed directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Link under which `name` is served
    pub fn retrieval_url(&self, name: &str) -> String {
        let encoded = urlencoding::encode(name);
        match &self.public_base_url {
            Some(base) => format!("{base}/download/{encoded}"),
            None => format!("/download/{encoded}"),
        }
    }

    /// List every regular file under the root, sorted by name then path
    ///
    /// An unreadable root is an error. Unreadable subdirectories are logged
    /// and skipped, so the listing may be partial below the top level.
    pub async fn list(&self) -> Result<Vec<FileRecord>> {
        let mut files = Vec::new();

        let entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| Error::storage(&self.root, e))?;
        self.collect_files(entries, &mut files).await;

        files.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        Ok(files)
    }

    /// Walk one directory level, recursing into subdirectories
    fn collect_files<'a>(
        &'a self,
        mut entries: fs::ReadDir,
        files: &'a mut Vec<FileRecord>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "failed to read directory entry, skipping rest of directory");
                        break;
                    }
                };
                let path = entry.path();

                // DirEntry::file_type does not follow symlinks
                let file_type = match entry.file_type().await {
                    Ok(ft) => ft,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to stat entry, skipping");
                        continue;
                    }
                };

                if file_type.is_file() {
                    let size = match entry.metadata().await {
                        Ok(meta) => meta.len(),
                        Err(e) => {
                            // Removed between read_dir and stat
                            debug!(path = %path.display(), error = %e, "file vanished during listing");
                            continue;
                        }
                    };
                    let name = entry.file_name().to_string_lossy().into_owned();
                    files.push(FileRecord {
                        url: self.retrieval_url(&name),
                        name,
                        path,
                        size,
                    });
                } else if file_type.is_dir() {
                    match fs::read_dir(&path).await {
                        Ok(sub) => self.collect_files(sub, files).await,
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "failed to read subdirectory, skipping");
                        }
                    }
                }
            }
        })
    }

    /// Resolve a user-supplied file name to a regular file under the root
    ///
    /// Directory components are stripped first, so the lookup can never leave
    /// the root. If `root/<name>` is not a regular file, the tree is searched
    /// for the first file (by path order) with exactly that name.
    pub async fn resolve_safe(&self, user_filename: &str) -> Result<PathBuf> {
        let Some(name) = basename(user_filename) else {
            return Err(Error::NotFound(format!("file {user_filename:?}")));
        };

        let direct = self.root.join(name);
        let found = match fs::symlink_metadata(&direct).await {
            Ok(meta) if meta.is_file() => Some(direct),
            _ => self
                .list()
                .await?
                .into_iter()
                .find(|record| record.name == name)
                .map(|record| record.path),
        };

        match found {
            Some(path) if path.starts_with(&self.root) => Ok(path),
            Some(path) => {
                warn!(path = %path.display(), "resolved path outside download directory");
                Err(Error::NotFound(format!("file {name:?}")))
            }
            None => Err(Error::NotFound(format!("file {name:?}"))),
        }
    }

    /// Resolve and open a file for streaming
    pub async fn open(&self, user_filename: &str) -> Result<StoredFile> {
        let path = self.resolve_safe(user_filename).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file = fs::File::open(&path)
            .await
            .map_err(|e| not_found_or_storage(&path, &name, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| Error::storage(&path, e))?
            .len();

        Ok(StoredFile { file, name, size })
    }

    /// Resolve and remove a single file
    pub async fn delete(&self, user_filename: &str) -> Result<()> {
        let path = self.resolve_safe(user_filename).await?;

        fs::remove_file(&path).await.map_err(|e| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            not_found_or_storage(&path, &name, e)
        })?;

        info!(path = %path.display(), "deleted file");
        Ok(())
    }

    /// Remove every file and subdirectory directly under the root
    ///
    /// Keeps going after a failed removal. If anything could not be removed the
    /// result is [`Error::ClearIncomplete`] listing both outcomes.
    pub async fn clear(&self) -> Result<ClearReport> {
        self.clear_with(remove_entry).await
    }

    async fn clear_with(&self, remove: RemoveEntry) -> Result<ClearReport> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| Error::storage(&self.root, e))?;

        let mut removed = Vec::new();
        let mut failed = Vec::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    failed.push((self.root.display().to_string(), e.to_string()));
                    break;
                }
            };
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            let result = match entry.file_type().await {
                Ok(ft) => remove(&path, ft.is_dir()).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => removed.push(name),
                // Raced with another delete
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => removed.push(name),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove entry");
                    failed.push((name, e.to_string()));
                }
            }
        }

        removed.sort();
        failed.sort();

        if failed.is_empty() {
            info!(removed = removed.len(), "download directory cleared");
            Ok(ClearReport { removed })
        } else {
            Err(Error::ClearIncomplete { removed, failed })
        }
    }
}

/// Removes one entry found directly under the root; the flag marks directories
type RemoveEntry = for<'a> fn(&'a Path, bool) -> BoxFuture<'a, std::io::Result<()>>;

fn remove_entry(path: &Path, is_dir: bool) -> BoxFuture<'_, std::io::Result<()>> {
    Box::pin(async move {
        if is_dir {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        }
    })
}

fn not_found_or_storage(path: &Path, name: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(format!("file {name:?}"))
    } else {
        Error::storage(path, err)
    }
}
