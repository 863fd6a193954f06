use super::{
    errors::QueryError,
    parser::{Operator, Token},
    predicate::{BoxedPredicate, PredicateRegistry},
};
use crate::vault::{Record, RecordSource};

#[derive(Debug)]
pub enum Instr {
    Operator(Operator),
    Test(BoxedPredicate),
}

/// A postfix sequence with every operand compiled to its predicate.
#[derive(Debug, Default)]
pub struct Program {
    instrs: Vec<Instr>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }
}

/// Compile postfix tokens once per query. Parentheses never reach this
/// point; any that do are skipped.
pub fn compile(postfix: Vec<Token>, registry: &PredicateRegistry) -> Result<Program, QueryError> {
    let mut instrs = Vec::with_capacity(postfix.len());
    for token in postfix {
        match token {
            Token::Operator(op) => instrs.push(Instr::Operator(op)),
            Token::Operand(raw) => instrs.push(Instr::Test(registry.build(&raw)?)),
            Token::LParen | Token::RParen => {}
        }
    }
    Ok(Program { instrs })
}

/// Run the program against one record with a boolean stack.
///
/// Missing operands count as `false`. The result is the top of the stack;
/// anything below it is ignored. An empty program is `false`.
pub async fn eval_postfix(program: &Program, record: &Record, source: &dyn RecordSource) -> bool {
    let mut stack: Vec<bool> = Vec::with_capacity(program.instrs.len());

    for instr in &program.instrs {
        match instr {
            Instr::Operator(Operator::And) => {
                let b = stack.pop().unwrap_or(false);
                let a = stack.pop().unwrap_or(false);
                stack.push(a && b);
            }
            Instr::Operator(Operator::Or) => {
                let b = stack.pop().unwrap_or(false);
                let a = stack.pop().unwrap_or(false);
                stack.push(a || b);
            }
            Instr::Operator(Operator::Not) => {
                let a = stack.pop().unwrap_or(false);
                stack.push(!a);
            }
            Instr::Test(predicate) => {
                stack.push(predicate.test(record, source).await);
            }
        }
    }

    stack.last().copied().unwrap_or(false)
}
