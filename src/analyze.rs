//! Static CSS analysis
//!
//! Three analyzers over raw stylesheet text, no browser involved: the fixed
//! style-lint rule set, the alternative-fonts check, and the pseudo-selector
//! counter.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

use crate::css::{self, Pos, Rule, Stylesheet, Token, TokenKind};
use crate::report::{ErrorKind, Finding, LintRule};

/// Minimum number of pseudo-class/pseudo-element selectors the assignment
/// requires.
const MIN_PSEUDO_SELECTORS: usize = 3;

static DISALLOWED_PROPERTY: OnceLock<Regex> = OnceLock::new();

fn disallowed_property() -> &'static Regex {
    DISALLOWED_PROPERTY.get_or_init(|| Regex::new("^overflow").unwrap())
}

/// One lint violation before it is turned into a finding.
#[derive(Debug)]
struct Violation {
    pos: Pos,
    rule: LintRule,
    text: String,
}

/// Lint every `.css` file under `root` with the fixed rule set.
pub fn lint_css_files(root: &Path) -> Result<Vec<Finding>> {
    let mut paths = Vec::new();
    collect_css_files(root, &mut paths)?;
    paths.sort();

    let mut findings = Vec::new();
    for path in paths {
        let source = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("linting {}", path.display());
        findings.extend(lint_source(&file_name, &source)?);
    }
    Ok(findings)
}

fn collect_css_files(path: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(path).with_context(|| format!("listing {}", path.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", path.display()))?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            collect_css_files(&entry_path, out)?;
        } else if entry_path.extension().is_some_and(|ext| ext == "css") {
            out.push(entry_path);
        }
    }
    Ok(())
}

/// Lint one stylesheet. Violations are ordered by position.
pub fn lint_source(file_name: &str, source: &str) -> Result<Vec<Finding>> {
    let tokens = css::tokenize(source);
    let sheet = css::parse(&tokens)
        .with_context(|| format!("parsing stylesheet {file_name}"))?;

    let mut violations = Vec::new();
    check_duplicate_selectors(&sheet.rules, &mut violations);
    for_each_rule(&sheet.rules, &mut |rule| {
        check_empty_block(rule, &mut violations);
        check_block_properties(rule, &mut violations);
    });
    check_formatting(&tokens, &mut violations);

    violations.sort_by_key(|v| (v.pos.line, v.pos.column));
    Ok(violations
        .into_iter()
        .map(|v| {
            Finding::new(ErrorKind::Stylelint(v.rule))
                .with("fileName", file_name)
                .with("line", v.pos.line.to_string())
                .with("column", v.pos.column.to_string())
                .with("text", v.text)
        })
        .collect())
}

fn for_each_rule(rules: &[Rule], visit: &mut impl FnMut(&Rule)) {
    for rule in rules {
        visit(rule);
        for_each_rule(&rule.rules, visit);
    }
}

/// `no-duplicate-selectors`: the same normalized selector list must not open
/// two blocks in the same scope.
fn check_duplicate_selectors(rules: &[Rule], violations: &mut Vec<Violation>) {
    let mut seen: HashSet<&str> = HashSet::new();
    for rule in rules {
        if rule.selector.starts_with('@') {
            check_duplicate_selectors(&rule.rules, violations);
            continue;
        }
        if !seen.insert(rule.selector.as_str()) {
            violations.push(Violation {
                pos: rule.selector_pos,
                rule: LintRule::NoDuplicateSelectors,
                text: format!(
                    "Unexpected duplicate selector \"{}\" (no-duplicate-selectors)",
                    rule.selector
                ),
            });
        }
        check_duplicate_selectors(&rule.rules, violations);
    }
}

/// `block-no-empty`
fn check_empty_block(rule: &Rule, violations: &mut Vec<Violation>) {
    if rule.declarations.is_empty() && rule.rules.is_empty() {
        violations.push(Violation {
            pos: rule.brace_pos,
            rule: LintRule::BlockNoEmpty,
            text: "Unexpected empty block (block-no-empty)".to_string(),
        });
    }
}

/// `declaration-block-no-duplicate-properties` and
/// `property-disallowed-list` over one block's declarations.
fn check_block_properties(rule: &Rule, violations: &mut Vec<Violation>) {
    let mut seen: HashSet<String> = HashSet::new();
    for declaration in &rule.declarations {
        let property = declaration.property.to_ascii_lowercase();
        if !seen.insert(property.clone()) {
            violations.push(Violation {
                pos: declaration.pos,
                rule: LintRule::DeclarationBlockNoDuplicateProperties,
                text: format!(
                    "Unexpected duplicate \"{property}\" (declaration-block-no-duplicate-properties)"
                ),
            });
        }
        if disallowed_property().is_match(&property) {
            violations.push(Violation {
                pos: declaration.pos,
                rule: LintRule::PropertyDisallowedList,
                text: format!("Unexpected property \"{property}\" (property-disallowed-list)"),
            });
        }
    }
}

/// Formatting rules over the raw token stream: brace placement and
/// declaration termination.
fn check_formatting(tokens: &[Token], violations: &mut Vec<Violation>) {
    let mut open_lines: Vec<usize> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenBrace => {
                let prev = i.checked_sub(1).and_then(|j| tokens.get(j));
                let single_space_before = prev
                    .is_some_and(|t| t.kind == TokenKind::Whitespace && t.text == " ");
                if !single_space_before {
                    violations.push(Violation {
                        pos: token.pos,
                        rule: LintRule::BlockOpeningBraceSpaceBefore,
                        text: "Expected single space before \"{\" (block-opening-brace-space-before)"
                            .to_string(),
                    });
                }
                if !newline_at(tokens.get(i + 1)) {
                    violations.push(Violation {
                        pos: token.pos,
                        rule: LintRule::BlockOpeningBraceNewlineAfter,
                        text: "Expected newline after \"{\" (block-opening-brace-newline-after)"
                            .to_string(),
                    });
                }
                open_lines.push(token.pos.line);
            }

            TokenKind::CloseBrace => {
                if let Some(open_line) = open_lines.pop() {
                    let multi_line = open_line != token.pos.line;
                    let prev = i.checked_sub(1).and_then(|j| tokens.get(j));
                    if multi_line && !newline_at(prev) {
                        violations.push(Violation {
                            pos: token.pos,
                            rule: LintRule::BlockClosingBraceNewlineBefore,
                            text:
                                "Expected newline before \"}\" (block-closing-brace-newline-before)"
                                    .to_string(),
                        });
                    }
                }
            }

            TokenKind::Semicolon if !open_lines.is_empty() => {
                // The rule covers non-final semicolons only; the line of a
                // block-final one is handled by the closing-brace rule.
                if !closes_block(&tokens[i + 1..])
                    && tokens.get(i + 1).is_some()
                    && !newline_at(tokens.get(i + 1))
                {
                    violations.push(Violation {
                        pos: token.pos,
                        rule: LintRule::DeclarationBlockSemicolonNewlineAfter,
                        text:
                            "Expected newline after \";\" (declaration-block-semicolon-newline-after)"
                                .to_string(),
                    });
                }
            }

            _ => {}
        }
    }
}

fn newline_at(token: Option<&Token>) -> bool {
    token.is_some_and(|t| t.kind == TokenKind::Whitespace && t.text.contains('\n'))
}

/// Whether the next non-whitespace, non-comment token closes the block.
fn closes_block(rest: &[Token]) -> bool {
    rest.iter()
        .find(|t| t.kind != TokenKind::Whitespace && t.kind != TokenKind::Comment)
        .is_some_and(|t| t.kind == TokenKind::CloseBrace)
}

/// Check that every `font-family` declaration names at least one allowed
/// fallback font. At most one finding is produced regardless of how many
/// declarations violate.
pub fn check_alternative_fonts(css_path: &Path, allowed: &[&str]) -> Result<Vec<Finding>> {
    let source = fs::read_to_string(css_path)
        .with_context(|| format!("reading {}", css_path.display()))?;
    alternative_fonts(&source, allowed)
}

/// Source-level form of [`check_alternative_fonts`].
pub fn alternative_fonts(source: &str, allowed: &[&str]) -> Result<Vec<Finding>> {
    let sheet = parse_source(source)?;
    let mut values = Vec::new();
    collect_font_family_values(&sheet.rules, &mut values);

    let has_violation = values
        .iter()
        .any(|value| !allowed.iter().any(|font| value.contains(font)));
    if has_violation {
        return Ok(vec![
            Finding::new(ErrorKind::AlternativeFonts).with("fonts", allowed.join(", ")),
        ]);
    }
    Ok(Vec::new())
}

fn collect_font_family_values(rules: &[Rule], out: &mut Vec<String>) {
    for rule in rules {
        for declaration in &rule.declarations {
            if declaration.property.eq_ignore_ascii_case("font-family") {
                out.push(declaration.value.clone());
            }
        }
        collect_font_family_values(&rule.rules, out);
    }
}

/// Check that the stylesheet uses at least [`MIN_PSEUDO_SELECTORS`]
/// pseudo-class or pseudo-element selectors.
pub fn check_pseudo_elements(css_path: &Path) -> Result<Vec<Finding>> {
    let source = fs::read_to_string(css_path)
        .with_context(|| format!("reading {}", css_path.display()))?;
    pseudo_elements(&source)
}

/// Source-level form of [`check_pseudo_elements`].
pub fn pseudo_elements(source: &str) -> Result<Vec<Finding>> {
    let sheet = parse_source(source)?;
    let mut count = 0;
    for_each_rule(&sheet.rules, &mut |rule| {
        count += rule.pseudo_count;
    });

    if count < MIN_PSEUDO_SELECTORS {
        return Ok(vec![Finding::new(ErrorKind::CountPseudoElements)]);
    }
    Ok(Vec::new())
}

fn parse_source(source: &str) -> Result<Stylesheet> {
    css::parse(&css::tokenize(source))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn rules_in(source: &str) -> Vec<LintRule> {
        lint_source("style.css", source)
            .unwrap()
            .into_iter()
            .map(|finding| match finding.kind {
                ErrorKind::Stylelint(rule) => rule,
                other => panic!("unexpected finding kind: {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_clean_stylesheet_passes() {
        let source = "a {\n  color: red;\n}\n\nb {\n  margin: 0;\n}\n";
        assert!(rules_in(source).is_empty());
    }

    #[test]
    fn test_duplicate_selectors() {
        let source = "a {\n  color: red;\n}\n\na {\n  margin: 0;\n}\n";
        assert_eq!(rules_in(source), vec![LintRule::NoDuplicateSelectors]);
    }

    #[test]
    fn test_empty_block() {
        let source = "a {\n}\n";
        assert_eq!(rules_in(source), vec![LintRule::BlockNoEmpty]);
    }

    #[test]
    fn test_duplicate_properties() {
        let source = "a {\n  color: red;\n  color: blue;\n}\n";
        assert_eq!(
            rules_in(source),
            vec![LintRule::DeclarationBlockNoDuplicateProperties]
        );
    }

    #[test]
    fn test_overflow_properties_are_disallowed() {
        let source = "a {\n  overflow-x: hidden;\n}\n";
        assert_eq!(rules_in(source), vec![LintRule::PropertyDisallowedList]);
        let source = "a {\n  overflow: hidden;\n}\n";
        assert_eq!(rules_in(source), vec![LintRule::PropertyDisallowedList]);
    }

    #[test]
    fn test_missing_space_before_brace() {
        let source = "a{\n  color: red;\n}\n";
        assert_eq!(rules_in(source), vec![LintRule::BlockOpeningBraceSpaceBefore]);
    }

    #[test]
    fn test_missing_newline_after_brace() {
        let source = "a { color: red;\n}\n";
        assert_eq!(
            rules_in(source),
            vec![LintRule::BlockOpeningBraceNewlineAfter]
        );
    }

    #[test]
    fn test_missing_newline_after_semicolon() {
        let source = "a {\n  color: red; margin: 0;\n}\n";
        assert_eq!(
            rules_in(source),
            vec![LintRule::DeclarationBlockSemicolonNewlineAfter]
        );
    }

    #[test]
    fn test_closing_brace_on_declaration_line() {
        let source = "a {\n  color: red; }\n";
        let rules = rules_in(source);
        assert!(rules.contains(&LintRule::BlockClosingBraceNewlineBefore));
        // Only the closing brace is at fault; the block-final semicolon is
        // exempt from the newline-after rule.
        assert!(!rules.contains(&LintRule::DeclarationBlockSemicolonNewlineAfter));
    }

    #[test]
    fn test_single_line_block_needs_no_closing_newline() {
        // Single-line blocks are exempt from the closing-brace rule
        // (always-multi-line), though the opening-brace rules still fire.
        let source = "a { color: red }\n";
        let rules = rules_in(source);
        assert!(!rules.contains(&LintRule::BlockClosingBraceNewlineBefore));
    }

    #[test]
    fn test_violation_carries_file_and_position() {
        let findings = lint_source("style.css", "a {\n  color: red;\n  color: blue;\n}\n").unwrap();
        assert_eq!(findings.len(), 1);
        let values: HashMap<&str, &str> = findings[0]
            .values
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        assert_eq!(values["fileName"], "style.css");
        assert_eq!(values["line"], "3");
        assert_eq!(values["column"], "3");
        assert!(values["text"].contains("declaration-block-no-duplicate-properties"));
    }

    #[test]
    fn test_alternative_fonts_pass() {
        let source = "body {\n  font-family: \"Mulish\", sans-serif;\n}\n";
        assert!(alternative_fonts(source, &["Mulish"]).unwrap().is_empty());
    }

    #[test]
    fn test_alternative_fonts_violation_is_single() {
        let source = "body {\n  font-family: \"Arial\";\n}\nh1 {\n  font-family: \"Times\";\n}\n";
        let findings = alternative_fonts(source, &["Mulish"]).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, ErrorKind::AlternativeFonts);
        assert_eq!(findings[0].values, vec![("fonts", "Mulish".to_string())]);
    }

    #[test]
    fn test_fonts_inside_font_face_count() {
        let source = "@font-face {\n  font-family: \"Arial\";\n}\n";
        assert_eq!(alternative_fonts(source, &["Mulish"]).unwrap().len(), 1);
    }

    #[test]
    fn test_two_pseudo_selectors_flagged() {
        let source = "a:hover {\n  color: red;\n}\nb::before {\n  content: \"\";\n}\n";
        let findings = pseudo_elements(source).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, ErrorKind::CountPseudoElements);
    }

    #[test]
    fn test_three_pseudo_selectors_pass() {
        let source = "a:hover {\n  color: red;\n}\nb::before {\n  content: \"\";\n}\nc:focus {\n  color: blue;\n}\n";
        assert!(pseudo_elements(source).unwrap().is_empty());
    }
}
