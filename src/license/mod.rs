//! License expression parsing and allow-list auditing.
//!
//! - [`expression`] — recursive-descent parser and evaluator for `AND` / `OR`
//!   expressions, plus the permissive fallback tokenizer.
//! - [`audit`] — allow-list normalization and classification of license
//!   entries into allowed / violation.

pub mod audit;
pub mod expression;
