use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};

use super::errors::QueryError;
use crate::vault::{Record, RecordSource};

/// A compiled test for one operand, run against one record at a time.
#[async_trait]
pub trait Predicate: Send + Sync + Debug {
    async fn test(&self, record: &Record, source: &dyn RecordSource) -> bool;
}

pub type BoxedPredicate = Box<dyn Predicate>;

/// Builds a predicate from the value part of a `key:value` operand.
pub type PredicateCtor = fn(&str) -> Result<BoxedPredicate, QueryError>;

/// Maps filter keys (`name`, `tag`, ...) to predicate constructors.
/// Operands whose key is not registered are plain keyword searches.
#[derive(Clone)]
pub struct PredicateRegistry {
    ctors: HashMap<String, PredicateCtor>,
    /// Keys also accepted as `key>value` / `key<value` without a colon.
    comparable: HashSet<String>,
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PredicateRegistry {
    pub fn empty() -> Self {
        Self {
            ctors: HashMap::new(),
            comparable: HashSet::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("name", name_predicate);
        registry.register("path", path_predicate);
        registry.register("ext", ext_predicate);
        registry.register("tag", tag_predicate);
        registry.register("content", content_predicate);
        registry.register_comparable("created", created_predicate);
        registry.register_comparable("modified", modified_predicate);
        registry.register("regex", regex_predicate);
        registry
    }

    /// Register `ctor` for `key` (case-insensitive). Returns the constructor
    /// it replaced, if any.
    pub fn register(&mut self, key: &str, ctor: PredicateCtor) -> Option<PredicateCtor> {
        self.ctors.insert(key.to_lowercase(), ctor)
    }

    /// Like [`register`](Self::register), and `key>value` / `key<value`
    /// reach the constructor with the comparison marker kept in the value.
    pub fn register_comparable(&mut self, key: &str, ctor: PredicateCtor) -> Option<PredicateCtor> {
        self.comparable.insert(key.to_lowercase());
        self.register(key, ctor)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ctors.contains_key(&key.to_lowercase())
    }

    /// Compile one operand token.
    ///
    /// The token is split at its first `:`. A colon at index 0 or no colon at
    /// all makes a bare keyword. A comparison on a comparable key
    /// (`created>2023-01-01`) is recognized first when its `>`/`<` comes
    /// before any colon. The value loses one pair of surrounding double
    /// quotes before it reaches the constructor.
    pub fn build(&self, token: &str) -> Result<BoxedPredicate, QueryError> {
        let colon = token.find(':');

        // `created>2023-01-01T10:00`: the comparison comes before any colon
        let cmp_first = token
            .find(['>', '<'])
            .is_some_and(|cmp| colon.map_or(true, |colon| cmp < colon));
        if cmp_first {
            if let Some((ctor, value)) = self.comparison(token) {
                return ctor(value);
            }
        }

        match colon {
            Some(idx) if idx > 0 => {
                let key = token[..idx].to_lowercase();
                let value = strip_quotes(&token[idx + 1..]);
                match self.ctors.get(&key) {
                    Some(ctor) => ctor(value),
                    None => Ok(Box::new(Keyword::new(value))),
                }
            }
            _ => Ok(Box::new(Keyword::new(token))),
        }
    }

    fn comparison<'a>(&self, token: &'a str) -> Option<(PredicateCtor, &'a str)> {
        let idx = token.find(['>', '<'])?;
        if idx == 0 {
            return None;
        }
        let key = token[..idx].to_lowercase();
        if !self.comparable.contains(&key) {
            return None;
        }
        let ctor = self.ctors.get(&key)?;
        Some((*ctor, strip_quotes(&token[idx..])))
    }
}

fn strip_quotes(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') {
        if value.len() >= 2 {
            &value[1..value.len() - 1]
        } else {
            ""
        }
    } else {
        value
    }
}

/// Bare word: name or path contains it, ignoring case.
#[derive(Debug)]
pub struct Keyword {
    needle: String,
}

impl Keyword {
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_lowercase(),
        }
    }
}

#[async_trait]
impl Predicate for Keyword {
    async fn test(&self, record: &Record, _source: &dyn RecordSource) -> bool {
        record.name.to_lowercase().contains(&self.needle)
            || record.path.to_lowercase().contains(&self.needle)
    }
}

#[derive(Debug)]
struct NameContains {
    needle: String,
}

#[async_trait]
impl Predicate for NameContains {
    async fn test(&self, record: &Record, _source: &dyn RecordSource) -> bool {
        record.name.to_lowercase().contains(&self.needle)
    }
}

fn name_predicate(value: &str) -> Result<BoxedPredicate, QueryError> {
    Ok(Box::new(NameContains {
        needle: value.to_lowercase(),
    }))
}

#[derive(Debug)]
enum PathMatch {
    /// Case-sensitive prefix (`path:^Projects/`).
    Prefix(String),
    /// Case-insensitive substring.
    Contains(String),
}

#[async_trait]
impl Predicate for PathMatch {
    async fn test(&self, record: &Record, _source: &dyn RecordSource) -> bool {
        match self {
            PathMatch::Prefix(prefix) => record.path.starts_with(prefix.as_str()),
            PathMatch::Contains(needle) => record.path.to_lowercase().contains(needle.as_str()),
        }
    }
}

fn path_predicate(value: &str) -> Result<BoxedPredicate, QueryError> {
    Ok(Box::new(match value.strip_prefix('^') {
        Some(prefix) => PathMatch::Prefix(prefix.to_string()),
        None => PathMatch::Contains(value.to_lowercase()),
    }))
}

#[derive(Debug)]
struct ExtensionIs {
    ext: String,
}

#[async_trait]
impl Predicate for ExtensionIs {
    async fn test(&self, record: &Record, _source: &dyn RecordSource) -> bool {
        record.extension.to_lowercase() == self.ext
    }
}

fn ext_predicate(value: &str) -> Result<BoxedPredicate, QueryError> {
    let ext = value.strip_prefix('.').unwrap_or(value);
    Ok(Box::new(ExtensionIs {
        ext: ext.to_lowercase(),
    }))
}

#[derive(Debug)]
struct HasTag {
    needle: String,
}

#[async_trait]
impl Predicate for HasTag {
    async fn test(&self, record: &Record, source: &dyn RecordSource) -> bool {
        let Some(metadata) = source.metadata(record) else {
            return false;
        };
        metadata
            .collect_tags()
            .iter()
            .any(|tag| tag.contains(&self.needle))
    }
}

fn tag_predicate(value: &str) -> Result<BoxedPredicate, QueryError> {
    Ok(Box::new(HasTag {
        needle: value.to_lowercase(),
    }))
}

#[derive(Debug)]
struct ContentContains {
    needle: String,
}

#[async_trait]
impl Predicate for ContentContains {
    async fn test(&self, record: &Record, source: &dyn RecordSource) -> bool {
        match source.read_content(record).await {
            Ok(text) => text.to_lowercase().contains(&self.needle),
            Err(err) => {
                log::debug!("content of {} unreadable, treated as no match: {err:#}", record.path);
                false
            }
        }
    }
}

fn content_predicate(value: &str) -> Result<BoxedPredicate, QueryError> {
    Ok(Box::new(ContentContains {
        needle: value.to_lowercase(),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Created,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    After,
    Before,
}

#[derive(Debug)]
struct DateCompare {
    field: DateField,
    cmp: Comparison,
    threshold: f64,
}

#[async_trait]
impl Predicate for DateCompare {
    async fn test(&self, record: &Record, _source: &dyn RecordSource) -> bool {
        let ts = match self.field {
            DateField::Created => record.created_at,
            DateField::Modified => record.modified_at,
        };
        let ts = ts as f64;
        match self.cmp {
            Comparison::After => ts > self.threshold,
            Comparison::Before => ts < self.threshold,
        }
    }
}

fn date_predicate(field: DateField, value: &str) -> BoxedPredicate {
    let (cmp, rest) = if let Some(rest) = value.strip_prefix('>') {
        (Comparison::After, rest)
    } else if let Some(rest) = value.strip_prefix('<') {
        (Comparison::Before, rest)
    } else {
        (Comparison::After, value)
    };

    Box::new(DateCompare {
        field,
        cmp,
        threshold: parse_threshold(rest),
    })
}

fn created_predicate(value: &str) -> Result<BoxedPredicate, QueryError> {
    Ok(date_predicate(DateField::Created, value))
}

fn modified_predicate(value: &str) -> Result<BoxedPredicate, QueryError> {
    Ok(date_predicate(DateField::Modified, value))
}

/// Threshold in epoch milliseconds: a date if it parses as one, else a raw
/// number, else zero. A date landing exactly on the epoch counts as unparsed.
pub fn parse_threshold(value: &str) -> f64 {
    if let Some(ms) = parse_date_millis(value).filter(|ms| *ms != 0) {
        return ms as f64;
    }
    match value.trim().parse::<f64>() {
        Ok(n) if !n.is_nan() => n,
        _ => 0.0,
    }
}

/// Dates without an offset are read as UTC.
pub fn parse_date_millis(value: &str) -> Option<i64> {
    let v = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return Some(dt.timestamp_millis());
    }

    const DATE_TIME_FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in DATE_TIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(v, fmt) {
            return Some(ndt.and_utc().timestamp_millis());
        }
    }

    let date = if let Ok(date) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        Some(date)
    } else if is_digits(v, &[4, 2]) {
        let (year, month) = v.split_once('-')?;
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
    } else if is_digits(v, &[4]) {
        NaiveDate::from_ymd_opt(v.parse().ok()?, 1, 1)
    } else {
        None
    }?;

    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// `v` is `-`-separated groups of ASCII digits with exactly these lengths.
fn is_digits(v: &str, lengths: &[usize]) -> bool {
    let parts: Vec<&str> = v.split('-').collect();
    parts.len() == lengths.len()
        && parts
            .iter()
            .zip(lengths)
            .all(|(p, len)| p.len() == *len && p.chars().all(|c| c.is_ascii_digit()))
}

#[derive(Debug)]
struct RegexMatch {
    re: Regex,
}

#[async_trait]
impl Predicate for RegexMatch {
    async fn test(&self, record: &Record, _source: &dyn RecordSource) -> bool {
        self.re.is_match(&record.path) || self.re.is_match(&record.name)
    }
}

/// `/pattern/flags` uses the given flags; anything else is a
/// case-insensitive pattern.
fn regex_predicate(value: &str) -> Result<BoxedPredicate, QueryError> {
    let re = match value.rfind('/') {
        Some(last) if value.starts_with('/') && last > 0 => {
            build_regex(&value[1..last], &value[last + 1..])?
        }
        _ => build_regex(value, "i")?,
    };
    Ok(Box::new(RegexMatch { re }))
}

pub fn build_regex(pattern: &str, flags: &str) -> Result<Regex, QueryError> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            // unicode is the default; global/sticky/indices mean nothing
            // for a yes/no match
            'u' | 'v' | 'g' | 'y' | 'd' => {}
            other => {
                return Err(QueryError::InvalidRegexFlag {
                    pattern: pattern.to_string(),
                    flag: other,
                })
            }
        }
    }
    builder.build().map_err(|source| QueryError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}
