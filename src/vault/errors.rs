use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum VaultError {
    #[error("vault root {0:?} does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("path escapes the vault root: {0}")]
    OutsideVault(String),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),
}
