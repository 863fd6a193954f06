#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported regex flag {flag:?} for pattern {pattern:?}")]
    InvalidRegexFlag { pattern: String, flag: char },
}
