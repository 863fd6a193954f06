use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Not,
    And,
    Or,
}

impl Operator {
    /// Case-insensitive keyword lookup.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("not") {
            Some(Operator::Not)
        } else if raw.eq_ignore_ascii_case("and") {
            Some(Operator::And)
        } else if raw.eq_ignore_ascii_case("or") {
            Some(Operator::Or)
        } else {
            None
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Not => 3,
            Operator::And => 2,
            Operator::Or => 1,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Not)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Not => "NOT",
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Operator(Operator),
    Operand(String),
}

impl Token {
    pub fn classify(raw: String) -> Self {
        match raw.as_str() {
            "(" => Token::LParen,
            ")" => Token::RParen,
            other => match Operator::parse(other) {
                Some(op) => Token::Operator(op),
                None => Token::Operand(raw),
            },
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Operator(op) => write!(f, "{}", op.as_str()),
            Token::Operand(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Insert `AND` between an operand (or `)`) and a following operand,
    /// `(` or `NOT`.
    pub implicit_and: bool,
}

/// Shunting-yard conversion of raw tokens into postfix order.
///
/// Never fails: a `)` without its `(` just drains the operator stack, and a
/// `(` left open at the end is dropped. The output holds only operators and
/// operands.
pub fn to_postfix(tokens: Vec<String>, options: &ParseOptions) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Token> = Vec::new();
    // last token closed an operand: an operand itself or `)`
    let mut after_operand = false;

    for raw in tokens {
        let token = Token::classify(raw);

        let starts_operand = matches!(
            token,
            Token::Operand(_) | Token::LParen | Token::Operator(Operator::Not)
        );
        if options.implicit_and && after_operand && starts_operand {
            push_operator(Operator::And, &mut ops, &mut out);
        }

        match token {
            Token::LParen => {
                ops.push(Token::LParen);
                after_operand = false;
            }
            Token::RParen => {
                while let Some(top) = ops.pop() {
                    if top == Token::LParen {
                        break;
                    }
                    out.push(top);
                }
                after_operand = true;
            }
            Token::Operator(op) => {
                push_operator(op, &mut ops, &mut out);
                after_operand = false;
            }
            operand @ Token::Operand(_) => {
                out.push(operand);
                after_operand = true;
            }
        }
    }

    while let Some(top) = ops.pop() {
        if top != Token::LParen {
            out.push(top);
        }
    }

    out
}

/// Pop stacked operators that bind at least as tightly, then push `op`.
/// `NOT` is right-associative: a pending `NOT` is not popped by another.
fn push_operator(op: Operator, ops: &mut Vec<Token>, out: &mut Vec<Token>) {
    while let Some(Token::Operator(top)) = ops.last() {
        let top = *top;
        let pops = if op.is_unary() {
            top.precedence() > op.precedence()
        } else {
            top.precedence() >= op.precedence()
        };
        if !pops {
            break;
        }
        ops.pop();
        out.push(Token::Operator(top));
    }
    ops.push(Token::Operator(op));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::lexer::tokenize;

    fn postfix(query: &str) -> String {
        postfix_with(query, ParseOptions::default())
    }

    fn postfix_with(query: &str, options: ParseOptions) -> String {
        to_postfix(tokenize(query), &options)
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_precedence() {
        assert_eq!(postfix("a OR b AND c"), "a b c AND OR");
        assert_eq!(postfix("a AND b OR c"), "a b AND c OR");
        assert_eq!(postfix("NOT a AND b"), "a NOT b AND");
        assert_eq!(postfix("a AND NOT b"), "a b NOT AND");
    }

    #[test]
    fn test_left_associative_binary() {
        assert_eq!(postfix("a OR b OR c"), "a b OR c OR");
        assert_eq!(postfix("a AND b AND c"), "a b AND c AND");
    }

    #[test]
    fn test_double_not() {
        assert_eq!(postfix("NOT NOT a"), "a NOT NOT");
    }

    #[test]
    fn test_parens_group() {
        assert_eq!(postfix("(a OR b) AND c"), "a b OR c AND");
        assert_eq!(postfix("NOT (a OR b)"), "a b OR NOT");
    }

    #[test]
    fn test_operators_case_insensitive_operands_preserved() {
        assert_eq!(postfix("Tag:Work and not Name:X"), "Tag:Work Name:X NOT AND");
    }

    #[test]
    fn test_quoted_keyword_is_operator() {
        assert_eq!(postfix("a \"or\" b"), "a b OR");
    }

    #[test]
    fn test_adjacent_operands_are_not_joined_by_default() {
        assert_eq!(postfix("tag:work path:inbox"), "tag:work path:inbox");
    }

    #[test]
    fn test_implicit_and_option() {
        let opts = ParseOptions { implicit_and: true };
        assert_eq!(postfix_with("tag:work path:inbox", opts), "tag:work path:inbox AND");
        assert_eq!(postfix_with("a (b OR c)", opts), "a b c OR AND");
        assert_eq!(postfix_with("a NOT b", opts), "a b NOT AND");
        assert_eq!(postfix_with("(a) b OR c", opts), "a b AND c OR");
        // explicit operators are left alone
        assert_eq!(postfix_with("a OR b", opts), "a b OR");
    }

    #[test]
    fn test_unbalanced_parens_are_tolerated() {
        assert_eq!(postfix("a) OR b"), "a b OR");
        assert_eq!(postfix("(a OR b"), "a b OR");
        assert_eq!(postfix(")))"), "");
    }

    #[test]
    fn test_empty() {
        assert!(to_postfix(vec![], &ParseOptions::default()).is_empty());
    }
}
