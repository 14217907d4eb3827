//! CSS Parsing
//!
//! Hand-rolled tokenizer and rule parser tailored to the static analyzers:
//! positions for lint reporting, raw token order for formatting rules, and a
//! small rule/declaration tree for the semantic rules.

pub mod ast;
pub mod lexer;

pub use ast::{Declaration, Rule, Stylesheet, parse};
pub use lexer::{Pos, Token, TokenKind, tokenize};
