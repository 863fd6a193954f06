//! Front-matter and inline tag extraction for Markdown notes.
//!
//! Front-matter is the YAML block delimited by `---` lines at the very start
//! of the file. Only the `tags` key is read from it. Inline tags are `#word`
//! tokens in the body, outside fenced code blocks.

use regex::Regex;
use serde_yml::Value;
use std::sync::LazyLock;

use super::{FrontmatterTags, Metadata, TagRef};

static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(#[\p{L}\p{N}_/\-]+)").expect("inline tag regex is valid")
});

/// Build the metadata for a note from its raw text.
pub fn parse_metadata(content: &str) -> Metadata {
    let (yaml, body) = split_frontmatter(content);

    let frontmatter_tags = yaml.and_then(|yaml| match serde_yml::from_str::<Value>(yaml) {
        Ok(value) => frontmatter_tags(&value),
        Err(err) => {
            log::warn!("malformed front-matter ignored: {err}");
            None
        }
    });

    Metadata {
        frontmatter_tags,
        tags: extract_inline_tags(body),
    }
}

/// Split content into `(front-matter yaml, body)`.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    // no closing fence: not front-matter
    (None, content)
}

fn frontmatter_tags(value: &Value) -> Option<FrontmatterTags> {
    let tags = value.get("tags")?;
    match tags {
        Value::Sequence(items) => Some(FrontmatterTags::Many(
            items.iter().filter_map(scalar_to_string).collect(),
        )),
        Value::Null => None,
        other => scalar_to_string(other).map(FrontmatterTags::One),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Collect `#tags` from the body. Purely numeric tags (`#123`) are not tags.
pub fn extract_inline_tags(body: &str) -> Vec<TagRef> {
    let mut tags = Vec::new();
    let mut in_fence = false;

    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        for cap in INLINE_TAG_RE.captures_iter(line) {
            let tag = &cap[1];
            if tag[1..].chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            tags.push(TagRef {
                tag: tag.to_string(),
            });
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_frontmatter() {
        let (yaml, body) = split_frontmatter("---\ntags: [a]\n---\nhello\n");
        assert_eq!(yaml, Some("tags: [a]\n"));
        assert_eq!(body, "hello\n");

        let (yaml, body) = split_frontmatter("no front matter\n---\n");
        assert!(yaml.is_none());
        assert_eq!(body, "no front matter\n---\n");

        // unterminated block is plain content
        let (yaml, _) = split_frontmatter("---\ntags: a\n");
        assert!(yaml.is_none());
    }

    #[test]
    fn test_frontmatter_tags_list_and_scalar() {
        let meta = parse_metadata("---\ntags:\n  - Work\n  - 2024\n---\n");
        assert_eq!(
            meta.frontmatter_tags,
            Some(FrontmatterTags::Many(vec!["Work".into(), "2024".into()]))
        );

        let meta = parse_metadata("---\ntags: journal\n---\n");
        assert_eq!(
            meta.frontmatter_tags,
            Some(FrontmatterTags::One("journal".into()))
        );

        let meta = parse_metadata("---\ntitle: x\n---\n");
        assert!(meta.frontmatter_tags.is_none());
    }

    #[test]
    fn test_malformed_frontmatter_is_ignored() {
        let meta = parse_metadata("---\ntags: [unclosed\n---\nbody #ok\n");
        assert!(meta.frontmatter_tags.is_none());
        assert_eq!(meta.tags, vec![TagRef { tag: "#ok".into() }]);
    }

    #[test]
    fn test_inline_tags() {
        let body = "Some #project/alpha text #123 and#not a tag\n```\n#code\n```\n#Done";
        let tags: Vec<String> = extract_inline_tags(body)
            .into_iter()
            .map(|t| t.tag)
            .collect();
        assert_eq!(tags, vec!["#project/alpha", "#Done"]);
    }
}
