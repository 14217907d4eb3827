//! Integration tests for the static analyzers over real files on disk.

use std::fs;

use page_grader::analyze;
use page_grader::report::{ErrorKind, LintRule};

#[test]
fn lints_every_css_file_under_the_project() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("styles")).unwrap();
    fs::create_dir(root.path().join("fonts")).unwrap();
    fs::write(
        root.path().join("styles").join("style.css"),
        "a {\n  overflow: hidden;\n}\n",
    )
    .unwrap();
    fs::write(
        root.path().join("fonts").join("font.css"),
        "b {\n  color: red;\n  color: blue;\n}\n",
    )
    .unwrap();
    // Non-CSS files are ignored.
    fs::write(root.path().join("index.html"), "<!DOCTYPE html>").unwrap();

    let findings = analyze::lint_css_files(root.path()).unwrap();
    assert_eq!(findings.len(), 2);

    let kinds: Vec<ErrorKind> = findings.iter().map(|f| f.kind).collect();
    assert!(kinds.contains(&ErrorKind::Stylelint(LintRule::PropertyDisallowedList)));
    assert!(kinds.contains(&ErrorKind::Stylelint(
        LintRule::DeclarationBlockNoDuplicateProperties
    )));

    let file_names: Vec<&str> = findings
        .iter()
        .map(|f| {
            f.values
                .iter()
                .find(|(key, _)| *key == "fileName")
                .map(|(_, value)| value.as_str())
                .unwrap()
        })
        .collect();
    assert!(file_names.contains(&"style.css"));
    assert!(file_names.contains(&"font.css"));
}

#[test]
fn malformed_css_is_an_operational_failure() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("broken.css"), "a {\n  color: red;\n").unwrap();
    assert!(analyze::lint_css_files(root.path()).is_err());
}

#[test]
fn font_and_pseudo_checks_read_the_given_file() {
    let root = tempfile::tempdir().unwrap();
    let css = root.path().join("style.css");
    fs::write(
        &css,
        "body {\n  font-family: \"Mulish\", sans-serif;\n}\n\
         a:hover {\n  color: red;\n}\n\
         a:focus {\n  color: red;\n}\n\
         a::before {\n  content: \"\";\n}\n",
    )
    .unwrap();

    assert!(
        analyze::check_alternative_fonts(&css, &["Mulish"])
            .unwrap()
            .is_empty()
    );
    assert!(analyze::check_pseudo_elements(&css).unwrap().is_empty());

    let findings = analyze::check_alternative_fonts(&css, &["Roboto"]).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, ErrorKind::AlternativeFonts);
}
