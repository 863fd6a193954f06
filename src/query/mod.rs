mod errors;
mod eval;
mod lexer;
mod parser;
mod predicate;

use futures_util::future::join_all;

use crate::vault::{Record, RecordSource};

pub use errors::QueryError;
pub use eval::{compile, eval_postfix, Program};
pub use lexer::tokenize;
pub use parser::{to_postfix, Operator, ParseOptions, Token};
pub use predicate::{BoxedPredicate, Keyword, Predicate, PredicateCtor, PredicateRegistry};

/// Filters records with the boolean query language:
///
/// ```text
/// expr     := term (operator term)*
/// term     := "(" expr ")" | "NOT" term | operand
/// operator := "AND" | "OR"
/// operand  := [key ":"] value
/// ```
///
/// Every input is accepted. Malformed queries degrade instead of failing;
/// the only error is an invalid `regex:` operand.
#[derive(Clone, Default)]
pub struct QueryEngine {
    registry: PredicateRegistry,
    options: ParseOptions,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            registry: PredicateRegistry::builtin(),
            options,
        }
    }

    pub fn registry_mut(&mut self) -> &mut PredicateRegistry {
        &mut self.registry
    }

    /// Tokenize, convert to postfix and compile the operands.
    pub fn compile(&self, query: &str) -> Result<Program, QueryError> {
        let tokens = tokenize(query);
        let postfix = to_postfix(tokens, &self.options);
        let program = compile(postfix, &self.registry)?;
        log::debug!("compiled query {query:?} into {} steps", program.len());
        Ok(program)
    }

    /// Records among `candidates` (or `source.list_all()` when `None`) that
    /// match `query`, in their original order.
    ///
    /// The query is compiled once; records are evaluated concurrently and
    /// the call returns after all of them are done.
    #[tracing::instrument(level = "debug", skip(self, source, candidates))]
    pub async fn execute(
        &self,
        query: &str,
        source: &dyn RecordSource,
        candidates: Option<Vec<Record>>,
    ) -> Result<Vec<Record>, QueryError> {
        let program = self.compile(query)?;
        if program.is_empty() {
            log::debug!("query {query:?} is empty, nothing matches");
            return Ok(vec![]);
        }

        let candidates = match candidates {
            Some(candidates) => candidates,
            None => source.list_all().await,
        };
        let total = candidates.len();

        let verdicts = join_all(
            candidates
                .iter()
                .map(|record| eval_postfix(&program, record, source)),
        )
        .await;

        let matched: Vec<Record> = candidates
            .into_iter()
            .zip(verdicts)
            .filter_map(|(record, ok)| ok.then_some(record))
            .collect();

        log::debug!("query {query:?} matched {}/{total}", matched.len());

        Ok(matched)
    }
}

/// Convenience: compile `query` with the built-in keys and test one record.
pub async fn matches(
    query: &str,
    record: &Record,
    source: &dyn RecordSource,
) -> Result<bool, QueryError> {
    let program = QueryEngine::new().compile(query)?;
    Ok(eval_postfix(&program, record, source).await)
}
