use crate::{query::QueryError, vault::VaultError, widgets::WidgetError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("widget {0:?} not found")]
    WidgetNotFound(String),

    #[error(transparent)]
    Widget(#[from] WidgetError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}
