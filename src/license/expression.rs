use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static FALLBACK_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i) OR | AND | WITH |[()]").expect("valid separator pattern"));

/// A parsed license expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseExpr {
    /// A single license token; consecutive words are joined with one space.
    License(String),
    And(Box<LicenseExpr>, Box<LicenseExpr>),
    Or(Box<LicenseExpr>, Box<LicenseExpr>),
}

/// Why an expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnexpectedEnd,
    UnexpectedToken(String),
    UnbalancedParen,
}

#[derive(Debug, PartialEq, Clone)]
enum Token {
    Word(String),
    And,
    Or,
    LParen,
    RParen,
}

/// Tokenize an expression. Parentheses are always standalone symbols;
/// `AND`/`OR` are recognised in any case.
fn tokenize(expr: &str) -> Vec<Token> {
    expr.replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(|word| match word {
            "(" => Token::LParen,
            ")" => Token::RParen,
            w if w.eq_ignore_ascii_case("AND") => Token::And,
            w if w.eq_ignore_ascii_case("OR") => Token::Or,
            w => Token::Word(w.to_string()),
        })
        .collect()
}

/// Recursive descent parser over a token slice.
///
/// ```text
/// expr     := and_expr ( "OR" and_expr )*
/// and_expr := primary ( "AND" primary )*
/// primary  := "(" expr ")" | word+
/// ```
struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&'a Token> {
        let tokens = self.tokens;
        let t = tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn parse_or(&mut self) -> Result<LicenseExpr, ParseError> {
        let mut result = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.consume();
            let rhs = self.parse_and()?;
            result = LicenseExpr::Or(Box::new(result), Box::new(rhs));
        }
        Ok(result)
    }

    fn parse_and(&mut self) -> Result<LicenseExpr, ParseError> {
        let mut result = self.parse_primary()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.consume();
            let rhs = self.parse_primary()?;
            result = LicenseExpr::And(Box::new(result), Box::new(rhs));
        }
        Ok(result)
    }

    fn parse_primary(&mut self) -> Result<LicenseExpr, ParseError> {
        match self.consume() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(ParseError::UnbalancedParen),
                }
            }
            Some(Token::Word(first)) => {
                let tokens = self.tokens;
                let mut words = vec![first.as_str()];
                while let Some(Token::Word(next)) = tokens.get(self.pos) {
                    words.push(next.as_str());
                    self.pos += 1;
                }
                Ok(LicenseExpr::License(words.join(" ")))
            }
            Some(Token::And) => Err(ParseError::UnexpectedToken("AND".to_string())),
            Some(Token::Or) => Err(ParseError::UnexpectedToken("OR".to_string())),
            Some(Token::RParen) => Err(ParseError::UnexpectedToken(")".to_string())),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

impl LicenseExpr {
    /// Parse a full expression; leftover tokens are an error.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(input);
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut parser = ExprParser {
            tokens: &tokens,
            pos: 0,
        };
        let expr = parser.parse_or()?;
        match parser.peek() {
            None => Ok(expr),
            Some(Token::RParen) => Err(ParseError::UnbalancedParen),
            Some(other) => Err(ParseError::UnexpectedToken(format!("{:?}", other))),
        }
    }

    /// Every leaf token, left to right, de-duplicated case-insensitively while
    /// keeping the first-seen spelling.
    pub fn licenses(&self) -> Vec<String> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        dedup_case_insensitive(leaves)
    }

    fn collect_leaves<'e>(&'e self, out: &mut Vec<&'e str>) {
        match self {
            LicenseExpr::License(id) => out.push(id),
            LicenseExpr::And(a, b) | LicenseExpr::Or(a, b) => {
                a.collect_leaves(out);
                b.collect_leaves(out);
            }
        }
    }

    /// Evaluate the expression with `is_allowed` deciding each leaf.
    ///
    /// Returns the match reported by the deciding leaf. `AND` short-circuits on
    /// the first disallowed operand and reports the left match when both
    /// sides pass; `OR` returns on the first allowed operand.
    pub fn evaluate<T, F>(&self, is_allowed: &F) -> Option<T>
    where
        F: Fn(&str) -> Option<T>,
    {
        match self {
            LicenseExpr::License(id) => is_allowed(id),
            LicenseExpr::And(a, b) => {
                let left = a.evaluate(is_allowed)?;
                b.evaluate(is_allowed)?;
                Some(left)
            }
            LicenseExpr::Or(a, b) => a.evaluate(is_allowed).or_else(|| b.evaluate(is_allowed)),
        }
    }
}

/// Permissive split used when an expression does not parse: cut on the
/// ` OR `, ` AND `, ` WITH ` separators and on any parenthesis.
pub fn fallback_tokens(raw: &str) -> Vec<String> {
    let fragments = FALLBACK_SEPARATORS
        .split(raw)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    dedup_case_insensitive(fragments)
}

fn dedup_case_insensitive(items: Vec<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_uppercase()))
        .map(str::to_string)
        .collect()
}
