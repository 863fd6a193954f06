use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context;
use async_trait::async_trait;
use walkdir::{DirEntry, WalkDir};

use super::{frontmatter, Metadata, Record, RecordSource, VaultError};
use crate::{
    config::VaultConfig,
    storage::{BackendLocal, StorageManager},
};

/// A vault on the local filesystem.
///
/// The directory is scanned once on [`LocalVault::open`]: records and their
/// metadata are kept in memory. Note bodies are read lazily and cached.
///
/// Records are limited to the configured extensions; `files` and `folders`
/// hold every visible path for suggestions and listings.
pub struct LocalVault {
    store: BackendLocal,
    records: Vec<Record>,
    files: Vec<String>,
    folders: Vec<String>,
    metadata: HashMap<String, Metadata>,
    content_cache: RwLock<HashMap<String, String>>,
}

impl LocalVault {
    pub fn open(root: impl AsRef<Path>, config: &VaultConfig) -> Result<Self, VaultError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(VaultError::NotADirectory(root.to_path_buf()));
        }

        let extensions: Vec<String> = config
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        let mut records = Vec::new();
        let mut files = Vec::new();
        let mut folders = Vec::new();
        let mut metadata = HashMap::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            let Some(path) = relative_path(root, entry.path()) else {
                continue;
            };
            if path.is_empty() || is_ignored(&path, &config.ignore) {
                continue;
            }

            if entry.file_type().is_dir() {
                folders.push(path);
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            files.push(path.clone());

            let name = entry.file_name().to_string_lossy().to_string();
            let extension = entry
                .path()
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();

            if !extensions.is_empty() && !extensions.contains(&extension.to_lowercase()) {
                continue;
            }

            let fs_meta = entry.metadata()?;
            let modified_at = fs_meta.modified().map(epoch_millis).unwrap_or(0);
            let created_at = fs_meta.created().map(epoch_millis).unwrap_or(modified_at);

            if extension.eq_ignore_ascii_case("md") {
                match std::fs::read_to_string(entry.path()) {
                    Ok(text) => {
                        metadata.insert(path.clone(), frontmatter::parse_metadata(&text));
                    }
                    Err(err) => log::warn!("could not index {path}: {err}"),
                }
            }

            records.push(Record {
                path,
                name,
                extension,
                created_at,
                modified_at,
            });
        }

        records.sort_by(|a, b| a.path.cmp(&b.path));
        files.sort();
        folders.sort();

        log::info!(
            "vault {} opened: {} records, {} with metadata, {} files in {} folders",
            root.display(),
            records.len(),
            metadata.len(),
            files.len(),
            folders.len()
        );

        Ok(Self {
            store: BackendLocal::new(root)?,
            records,
            files,
            folders,
            metadata,
            content_cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, path: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.path == path)
    }

    /// Whether `path` exists on disk, including files created after the scan.
    pub fn exists(&self, path: &str) -> bool {
        self.store.exists(path)
    }

    /// Records directly or transitively inside `folder`.
    pub fn files_in_folder(&self, folder: &str) -> Vec<Record> {
        let prefix = format!("{}/", folder.trim_end_matches('/'));
        self.records
            .iter()
            .filter(|r| r.path.starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Every visible folder, sorted.
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    /// Paths of any file (not only notes) containing `query`
    /// (case-insensitive), best matches first: the earlier the query appears
    /// in the path, the better. An empty query matches everything.
    pub fn suggest(&self, query: &str, folder_prefix: Option<&str>, limit: usize) -> Vec<String> {
        let q = query.to_lowercase();

        let mut candidates: Vec<(usize, &String)> = self
            .files
            .iter()
            .filter(|path| folder_prefix.map_or(true, |prefix| path.starts_with(prefix)))
            .filter_map(|path| path.to_lowercase().find(&q).map(|idx| (idx, path)))
            .collect();

        candidates.sort_by_key(|(idx, _)| *idx);

        candidates
            .into_iter()
            .take(limit)
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// Return `target` if it exists, otherwise create it from `template`
    /// (an empty note when no template is given).
    pub async fn open_or_create(
        &self,
        target: &str,
        template: Option<&str>,
    ) -> Result<String, VaultError> {
        self.store
            .resolve(target)
            .map_err(|_| VaultError::OutsideVault(target.to_string()))?;

        if self.store.exists(target) {
            return Ok(target.to_string());
        }

        let content = match template {
            Some(template) => {
                let template_path = self
                    .store
                    .resolve(template)
                    .map_err(|_| VaultError::OutsideVault(template.to_string()))?;
                match tokio::fs::read(&template_path).await {
                    Ok(bytes) => bytes,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        return Err(VaultError::TemplateNotFound(template.to_string()))
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            None => Vec::new(),
        };

        self.store.write(target, &content)?;
        log::info!("created note {target}");

        Ok(target.to_string())
    }

    fn absolute(&self, record: &Record) -> PathBuf {
        self.store.base_dir.join(&record.path)
    }
}

#[async_trait]
impl RecordSource for LocalVault {
    async fn list_all(&self) -> Vec<Record> {
        self.records.clone()
    }

    fn metadata(&self, record: &Record) -> Option<Metadata> {
        self.metadata.get(&record.path).cloned()
    }

    async fn read_content(&self, record: &Record) -> anyhow::Result<String> {
        {
            let cache = self.content_cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(text) = cache.get(&record.path) {
                return Ok(text.clone());
            }
        }

        let text = tokio::fs::read_to_string(self.absolute(record))
            .await
            .with_context(|| format!("reading {}", record.path))?;

        self.content_cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.path.clone(), text.clone());

        Ok(text)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_ignored(path: &str, ignore: &[String]) -> bool {
    ignore.iter().any(|folder| {
        let folder = folder.trim_matches('/');
        !folder.is_empty() && (path == folder || path.starts_with(&format!("{folder}/")))
    })
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

fn epoch_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
