use std::path::{Component, Path, PathBuf};

pub trait StorageManager: Send + Sync {
    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()>;
    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>>;
    fn exists(&self, ident: &str) -> bool;
}

/// Files under a base directory. Idents are `/`-separated relative paths.
#[derive(Clone, Debug)]
pub struct BackendLocal {
    pub base_dir: PathBuf,
}

impl BackendLocal {
    pub fn new(storage_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)?;
        Ok(BackendLocal { base_dir: path })
    }

    /// Resolve an ident to a path below the base dir. Absolute idents and
    /// `..` components are rejected.
    pub fn resolve(&self, ident: &str) -> std::io::Result<PathBuf> {
        let rel = Path::new(ident);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || ident.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid storage path {ident:?}"),
            ));
        }
        Ok(self.base_dir.join(rel))
    }
}

impl StorageManager for BackendLocal {
    fn exists(&self, ident: &str) -> bool {
        self.resolve(ident)
            .map(|path| std::fs::metadata(path).is_ok())
            .unwrap_or(false)
    }

    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.resolve(ident)?)
    }

    /// Write through a temp file in the same directory, then rename over the
    /// target, so readers never observe a half-written file.
    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()> {
        let path = self.resolve(ident)?;
        let parent = path.parent().unwrap_or(&self.base_dir);
        std::fs::create_dir_all(parent)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp_path = parent.join(format!(".{file_name}.{}.tmp", std::process::id()));

        let res = std::fs::write(&temp_path, data).and_then(|_| std::fs::rename(&temp_path, &path));
        if res.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        res
    }
}
