use serde::{Deserialize, Serialize};

use crate::{
    query::{QueryEngine, QueryError},
    vault::RecordSource,
};

#[derive(thiserror::Error, Debug)]
pub enum WidgetError {
    #[error("widget {0:?} has no query")]
    NoQuery(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconPosition {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

/// User defined widget stored in the config.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomWidget {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_position: Option<IconPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Filter query; the widget lists the matching notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<WidgetSize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WidgetResult {
    pub title: String,
    pub query: String,
    pub count: usize,
    pub paths: Vec<String>,
}

pub async fn run_widget(
    widget: &CustomWidget,
    engine: &QueryEngine,
    source: &dyn RecordSource,
) -> Result<WidgetResult, WidgetError> {
    let query = widget
        .query
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| WidgetError::NoQuery(widget.title.clone()))?;

    let records = engine.execute(query, source, None).await?;
    let paths: Vec<String> = records.into_iter().map(|r| r.path).collect();

    Ok(WidgetResult {
        title: widget.title.clone(),
        query: query.to_string(),
        count: paths.len(),
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::memory::{frontmatter_tags, record, MemoryVault};

    #[test]
    fn test_widget_from_yaml() {
        let yaml = r#"
title: Inbox
icon: inbox
icon_position: right
size: full
query: "path:Inbox AND NOT tag:done"
"#;
        let widget: CustomWidget = serde_yml::from_str(yaml).unwrap();
        assert_eq!(widget.title, "Inbox");
        assert_eq!(widget.icon_position, Some(IconPosition::Right));
        assert_eq!(widget.size, Some(WidgetSize::Full));
        assert_eq!(widget.query.as_deref(), Some("path:Inbox AND NOT tag:done"));
        assert!(widget.content.is_none());

        let err = serde_yml::from_str::<CustomWidget>("title: x\nsize: huge\n");
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_run_widget() {
        let vault = MemoryVault::new()
            .with(record("Inbox/a.md"), Some(frontmatter_tags(&["done"])), None)
            .note("Inbox/b.md")
            .note("Other/c.md");
        let widget = CustomWidget {
            title: "Inbox".into(),
            query: Some("path:Inbox AND NOT tag:done".into()),
            ..Default::default()
        };

        let result = run_widget(&widget, &QueryEngine::new(), &vault).await.unwrap();
        assert_eq!(result.paths, vec!["Inbox/b.md"]);
        assert_eq!(result.count, 1);
    }

    #[tokio::test]
    async fn test_run_widget_without_query() {
        let vault = MemoryVault::new().note("a.md");
        let widget = CustomWidget {
            title: "Notes".into(),
            query: Some("  ".into()),
            ..Default::default()
        };

        let err = run_widget(&widget, &QueryEngine::new(), &vault).await.unwrap_err();
        assert!(matches!(err, WidgetError::NoQuery(title) if title == "Notes"));
    }
}
