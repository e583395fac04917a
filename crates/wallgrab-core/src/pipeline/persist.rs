//! Writing accepted images under `<root>/<category>/<filename>`.
//!
//! Files are deduplicated on content hash. Within a run, every hash has one
//! slot that the first writer fills; later tasks with the same bytes reuse it.
//! Across runs, a category directory already holding `*_<hash>.<ext>` counts
//! as already present. A file only appears under its final name once it has
//! been fully written and synced.

use std::collections::{HashMap, HashSet};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::error::PersistError;
use crate::types::{Category, PersistedFile};

/// Prefix for files still being written.
const PARTIAL_PREFIX: &str = ".partial-";

/// Places files in category directories, creating each directory once.
pub struct Persister {
    root: PathBuf,
    created: Mutex<HashSet<Category>>,
    contents: Mutex<HashMap<String, Arc<OnceCell<PersistedFile>>>>,
}

impl Persister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self {
            root,
            created: Mutex::new(HashSet::new()),
            contents: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the category directory if this run has not done so yet.
    ///
    /// Concurrent callers serialize on the lock; `create_dir_all` also treats
    /// an existing directory as success.
    async fn ensure_dir(&self, category: Category) -> Result<PathBuf, PersistError> {
        let dir = self.root.join(category.as_str());
        let mut created = self.created.lock().await;
        if !created.contains(&category) {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| PersistError {
                    path: dir.clone(),
                    source,
                })?;
            tracing::debug!("Created category directory {:?}", dir);
            created.insert(category);
        }
        Ok(dir)
    }

    /// Save `bytes` as `filename` in the category directory, unless content
    /// with the same `hash` is already on disk.
    ///
    /// Tasks racing on one hash wait for the first writer. If that write
    /// fails, the next waiter writes instead, so an `already_present` result
    /// always points at a complete file.
    pub async fn persist(
        &self,
        category: Category,
        filename: &str,
        hash: &str,
        bytes: Vec<u8>,
    ) -> Result<PersistedFile, PersistError> {
        let slot = {
            let mut contents = self.contents.lock().await;
            contents.entry(hash.to_string()).or_default().clone()
        };

        let mut initialized_here = false;
        let flag = &mut initialized_here;
        let file = slot
            .get_or_try_init(|| async move {
                *flag = true;
                self.store(category, filename, hash, bytes).await
            })
            .await?;

        if initialized_here {
            Ok(file.clone())
        } else {
            tracing::debug!("Same content already saved this run: {:?}", file.path);
            Ok(PersistedFile {
                already_present: true,
                ..file.clone()
            })
        }
    }

    async fn store(
        &self,
        category: Category,
        filename: &str,
        hash: &str,
        bytes: Vec<u8>,
    ) -> Result<PersistedFile, PersistError> {
        let dir = self.ensure_dir(category).await?;
        let size = bytes.len() as u64;
        let persisted = |path: PathBuf, already_present| PersistedFile {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| filename.to_string()),
            path,
            category,
            size,
            already_present,
        };

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if let Some(existing) = find_existing(&dir, &format!("_{hash}.{ext}")).await? {
            tracing::debug!("Already present: {:?}", existing);
            return Ok(persisted(existing, true));
        }

        let path = dir.join(filename);
        let target = path.clone();
        let published = tokio::task::spawn_blocking(move || write_then_publish(&dir, &target, &bytes))
            .await
            .map_err(|e| PersistError {
                path: path.clone(),
                source: std::io::Error::other(e),
            })?;

        match published {
            Ok(()) => Ok(persisted(path, false)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("Already present: {:?}", path);
                Ok(persisted(path, true))
            }
            Err(source) => Err(PersistError { path, source }),
        }
    }
}

/// First entry of `dir` whose name ends with `suffix`.
async fn find_existing(dir: &Path, suffix: &str) -> Result<Option<PathBuf>, PersistError> {
    let err = |source: std::io::Error| PersistError {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(err)?;
    while let Some(entry) = entries.next_entry().await.map_err(err)? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.ends_with(suffix) && !name.starts_with(PARTIAL_PREFIX) {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Write into a temporary file in `dir`, then link it to `path` without
/// replacing anything there. The temporary file is removed on every error.
fn write_then_publish(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut partial = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .tempfile_in(dir)?;
    partial.write_all(bytes)?;
    partial.as_file().sync_all()?;
    partial.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}
