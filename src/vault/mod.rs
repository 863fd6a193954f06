pub mod errors;
pub mod frontmatter;
pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use errors::VaultError;
pub use local::LocalVault;

/// A single note (or any file) in the vault, as seen by the query engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    /// `/`-separated path relative to the vault root. Unique per vault.
    pub path: String,
    /// File name including the extension.
    pub name: String,
    /// Extension without the leading dot, empty when absent.
    pub extension: String,

    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Modification time in epoch milliseconds.
    pub modified_at: i64,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Record {}

/// Front-matter `tags` field, which notes write either as a scalar or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontmatterTags {
    One(String),
    Many(Vec<String>),
}

/// An inline `#tag` found in the note body. `tag` keeps its leading `#`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
    pub tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter_tags: Option<FrontmatterTags>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

impl Metadata {
    /// Every tag attached to the note, lower-cased. Front-matter tags come
    /// first, inline tags after.
    pub fn collect_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        match &self.frontmatter_tags {
            Some(FrontmatterTags::One(tag)) => tags.push(tag.to_lowercase()),
            Some(FrontmatterTags::Many(list)) => {
                tags.extend(list.iter().map(|t| t.to_lowercase()))
            }
            None => {}
        }
        tags.extend(self.tags.iter().map(|t| t.tag.to_lowercase()));
        tags
    }
}

/// Provider of candidate records and their per-record data.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Default candidate set for a query.
    async fn list_all(&self) -> Vec<Record>;

    fn metadata(&self, record: &Record) -> Option<Metadata>;

    async fn read_content(&self, record: &Record) -> anyhow::Result<String>;
}
