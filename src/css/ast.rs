//! CSS rule tree
//!
//! Builds a minimal stylesheet structure from the token stream: rules with
//! selector text, positions, declarations, and nested rules (at-rule blocks
//! are parsed with the same grammar). No cascade or value semantics, just
//! what the analyzers need.

use anyhow::{Result, bail};

use crate::css::lexer::{Pos, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

/// One rule: a prelude (selector list or at-rule head) and its block.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Prelude text with whitespace collapsed, e.g. `h1, h2` or `@media print`
    pub selector: String,
    pub selector_pos: Pos,
    pub brace_pos: Pos,
    pub close_pos: Pos,
    pub declarations: Vec<Declaration>,
    /// Nested rules (inside `@media`, `@supports`, ...)
    pub rules: Vec<Rule>,
    /// Pseudo-class/pseudo-element selectors in the prelude; zero for
    /// at-rules.
    pub pseudo_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    /// Value text with whitespace collapsed, e.g. `"Mulish", sans-serif`
    pub value: String,
    pub pos: Pos,
}

/// Parse a token stream into a stylesheet. Unbalanced braces are an error.
pub fn parse(tokens: &[Token]) -> Result<Stylesheet> {
    let mut index = 0;
    let (rules, _) = parse_block_items(tokens, &mut index, false)?;
    if let Some(token) = tokens.get(index) {
        bail!(
            "unexpected '}}' at line {}, column {}",
            token.pos.line,
            token.pos.column
        );
    }
    Ok(Stylesheet { rules })
}

/// Parse the items of one block (or the top level): nested rules and
/// declarations. Stops at the closing brace without consuming it.
fn parse_block_items(
    tokens: &[Token],
    index: &mut usize,
    inside_block: bool,
) -> Result<(Vec<Rule>, Vec<Declaration>)> {
    let mut rules = Vec::new();
    let mut declarations = Vec::new();
    let mut prelude_start: Option<usize> = None;

    loop {
        let Some(token) = tokens.get(*index) else {
            if inside_block {
                bail!("unexpected end of stylesheet inside a block");
            }
            break;
        };

        match token.kind {
            TokenKind::Whitespace | TokenKind::Comment => {
                *index += 1;
            }

            TokenKind::CloseBrace => break,

            TokenKind::OpenBrace => {
                let Some(start) = prelude_start.take() else {
                    bail!(
                        "unexpected '{{' at line {}, column {}",
                        token.pos.line,
                        token.pos.column
                    );
                };
                let prelude = &tokens[start..*index];
                let brace_pos = token.pos;
                *index += 1;

                let (nested, block_declarations) = parse_block_items(tokens, index, true)?;
                let close_pos = match tokens.get(*index) {
                    Some(close) if close.kind == TokenKind::CloseBrace => close.pos,
                    _ => bail!(
                        "unclosed block starting at line {}, column {}",
                        brace_pos.line,
                        brace_pos.column
                    ),
                };
                *index += 1;

                rules.push(make_rule(
                    prelude,
                    brace_pos,
                    close_pos,
                    nested,
                    block_declarations,
                ));
            }

            TokenKind::Semicolon => {
                if let Some(start) = prelude_start.take() {
                    if let Some(declaration) = make_declaration(&tokens[start..*index]) {
                        declarations.push(declaration);
                    }
                }
                *index += 1;
            }

            _ => {
                if prelude_start.is_none() {
                    prelude_start = Some(*index);
                }
                *index += 1;
            }
        }
    }

    // Final declaration without a trailing semicolon.
    if let Some(start) = prelude_start {
        if let Some(declaration) = make_declaration(&tokens[start..*index]) {
            declarations.push(declaration);
        }
    }

    Ok((rules, declarations))
}

fn make_rule(
    prelude: &[Token],
    brace_pos: Pos,
    close_pos: Pos,
    rules: Vec<Rule>,
    declarations: Vec<Declaration>,
) -> Rule {
    let selector = collapse_text(prelude);
    let selector_pos = prelude.first().map(|t| t.pos).unwrap_or(brace_pos);
    let is_at_rule = prelude
        .iter()
        .find(|t| t.kind != TokenKind::Whitespace && t.kind != TokenKind::Comment)
        .is_some_and(|t| t.kind == TokenKind::AtKeyword);
    let pseudo_count = if is_at_rule {
        0
    } else {
        count_pseudos(prelude)
    };

    Rule {
        selector,
        selector_pos,
        brace_pos,
        close_pos,
        declarations,
        rules,
        pseudo_count,
    }
}

fn make_declaration(tokens: &[Token]) -> Option<Declaration> {
    let colon = tokens.iter().position(|t| t.kind == TokenKind::Colon)?;
    let property = collapse_text(&tokens[..colon]);
    let value = collapse_text(&tokens[colon + 1..]);
    if property.is_empty() {
        return None;
    }
    let pos = tokens.first().map(|t| t.pos)?;
    Some(Declaration {
        property,
        value,
        pos,
    })
}

/// Join token texts, collapsing whitespace runs to single spaces and
/// dropping comments.
fn collapse_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token.kind {
            TokenKind::Comment => {}
            TokenKind::Whitespace => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            _ => out.push_str(&token.text),
        }
    }
    out.trim().to_string()
}

/// Count pseudo-class and pseudo-element selectors in a prelude. `:hover`
/// and `::before` each count once; pseudos nested in `:not(...)` count too.
fn count_pseudos(prelude: &[Token]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < prelude.len() {
        if prelude[i].kind == TokenKind::Colon {
            let mut j = i + 1;
            if prelude.get(j).is_some_and(|t| t.kind == TokenKind::Colon) {
                j += 1;
            }
            if prelude.get(j).is_some_and(|t| t.kind == TokenKind::Ident) {
                count += 1;
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::lexer::tokenize;

    fn parse_source(source: &str) -> Stylesheet {
        parse(&tokenize(source)).expect("valid stylesheet")
    }

    #[test]
    fn test_parse_simple_rule() {
        let sheet = parse_source("h1 {\n  color: red;\n  margin: 0;\n}");
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.selector, "h1");
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].property, "color");
        assert_eq!(rule.declarations[0].value, "red");
    }

    #[test]
    fn test_selector_list_is_collapsed() {
        let sheet = parse_source("h1 ,\n   h2 { color: red; }");
        assert_eq!(sheet.rules[0].selector, "h1 , h2");
    }

    #[test]
    fn test_last_declaration_without_semicolon() {
        let sheet = parse_source("a { color: red }");
        assert_eq!(sheet.rules[0].declarations.len(), 1);
    }

    #[test]
    fn test_nested_media_rules() {
        let sheet = parse_source("@media print {\n  a { color: black; }\n}");
        assert_eq!(sheet.rules.len(), 1);
        let media = &sheet.rules[0];
        assert_eq!(media.selector, "@media print");
        assert_eq!(media.rules.len(), 1);
        assert_eq!(media.rules[0].selector, "a");
    }

    #[test]
    fn test_font_face_declarations() {
        let sheet =
            parse_source("@font-face {\n  font-family: \"Mulish\";\n  src: url(m.woff2);\n}");
        let rule = &sheet.rules[0];
        assert_eq!(rule.declarations[0].property, "font-family");
        assert_eq!(rule.declarations[0].value, "\"Mulish\"");
    }

    #[test]
    fn test_pseudo_count() {
        let sheet = parse_source("a:hover { color: red; }\nb::before { content: \"\"; }");
        assert_eq!(sheet.rules[0].pseudo_count, 1);
        assert_eq!(sheet.rules[1].pseudo_count, 1);
    }

    #[test]
    fn test_media_query_colon_is_not_a_pseudo() {
        let sheet = parse_source("@media (min-width: 600px) { a { color: red; } }");
        assert_eq!(sheet.rules[0].pseudo_count, 0);
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(parse(&tokenize("a { color: red;")).is_err());
        assert!(parse(&tokenize("a { color: red; } }")).is_err());
    }
}
