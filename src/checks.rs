//! Rendered-page checks
//!
//! Each check queries the shared page handle read-only and yields zero or
//! more findings. An empty result means the check passed.

use anyhow::Result;

use crate::page::Page;
use crate::report::{ErrorKind, Finding};

/// The framework-generated placeholder title students must replace.
const DEFAULT_TITLE: &str = "Document";

/// A named existence probe.
#[derive(Debug, Clone, Copy)]
pub struct SelectorProbe {
    pub name: &'static str,
    pub selector: &'static str,
}

/// The stylesheet `<link>` tags must appear in the DOM in exactly the given
/// file order. Checked with one combined general-sibling selector.
pub async fn check_order_stylesheet_links(page: &Page, files: &[&str]) -> Result<Vec<Finding>> {
    let selector = files
        .iter()
        .map(|file| format!("link[href*=\"{file}\"]"))
        .collect::<Vec<_>>()
        .join(" ~ ");
    if page.exists(&selector).await? {
        Ok(Vec::new())
    } else {
        Ok(vec![Finding::new(ErrorKind::OrderStylesheetLinks)])
    }
}

/// Compare `<body>`'s direct element children against the expected tag
/// names, both ways. Order is not checked.
pub async fn check_body_elements(page: &Page, expected: &[&str]) -> Result<Vec<Finding>> {
    let found = page.body_child_tags().await?;
    let (missing, extra) = diff_names(expected, &found);

    let mut findings = Vec::new();
    if !missing.is_empty() {
        findings.push(Finding::new(ErrorKind::BodyTagsMissing).with("names", missing.join(", ")));
    }
    if !extra.is_empty() {
        findings.push(Finding::new(ErrorKind::BodyTagsExtra).with("names", extra.join(", ")));
    }
    Ok(findings)
}

fn diff_names(expected: &[&str], found: &[String]) -> (Vec<String>, Vec<String>) {
    let missing = expected
        .iter()
        .filter(|name| !found.iter().any(|f| f == *name))
        .map(|name| name.to_string())
        .collect();
    let extra = found
        .iter()
        .filter(|name| !expected.contains(&name.as_str()))
        .cloned()
        .collect();
    (missing, extra)
}

/// The `html` element's `lang` attribute must contain the given substring.
pub async fn check_lang(page: &Page, lang: &str) -> Result<Vec<Finding>> {
    let selector = format!("html[lang*=\"{lang}\"]");
    if page.exists(&selector).await? {
        Ok(Vec::new())
    } else {
        Ok(vec![
            Finding::new(ErrorKind::LangAttrMissing).with("lang", lang),
        ])
    }
}

/// The page title must not be the editor-generated default.
pub async fn check_title_emmet(page: &Page) -> Result<Vec<Finding>> {
    if page.title().await? == DEFAULT_TITLE {
        Ok(vec![Finding::new(ErrorKind::TitleEmmet)])
    } else {
        Ok(Vec::new())
    }
}

/// Probe each named selector; absent entries are reported as one finding of
/// the given kind with their names joined.
pub async fn check_elements_by_selectors(
    page: &Page,
    probes: &[SelectorProbe],
    kind: ErrorKind,
) -> Result<Vec<Finding>> {
    let mut results = Vec::with_capacity(probes.len());
    for probe in probes {
        results.push((probe.name, page.exists(probe.selector).await?));
    }
    let missing = missing_names(&results);
    if missing.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![Finding::new(kind).with("names", missing.join(", "))])
    }
}

fn missing_names<'a>(results: &[(&'a str, bool)]) -> Vec<&'a str> {
    results
        .iter()
        .filter(|(_, found)| !found)
        .map(|(name, _)| *name)
        .collect()
}

/// Compare computed style values on the first element matching `selector`
/// against the expected values. A finding is emitted only when the computed
/// mismatch list is non-empty.
pub async fn check_properties_by_element(
    page: &Page,
    selector: &str,
    expected: &[(&str, &str)],
) -> Result<Vec<Finding>> {
    let names: Vec<&str> = expected.iter().map(|(name, _)| *name).collect();
    let actual = page.computed_styles(selector, &names).await?;
    let mismatched = mismatched_properties(expected, &actual);

    if mismatched.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![
            Finding::new(ErrorKind::ElementProperties)
                .with("name", selector)
                .with("properties", mismatched.join("; ")),
        ])
    }
}

fn mismatched_properties(expected: &[(&str, &str)], actual: &[(String, String)]) -> Vec<String> {
    expected
        .iter()
        .filter(|(name, value)| {
            !actual
                .iter()
                .any(|(actual_name, actual_value)| actual_name == name && actual_value == value)
        })
        .map(|(name, value)| format!("{name}: {value}"))
        .collect()
}

/// Check the first `<video>` element's attribute names against a required
/// and an excluded list.
pub async fn check_video_attributes(
    page: &Page,
    required: &[&str],
    excluded: &[&str],
) -> Result<Vec<Finding>> {
    let attributes = page.attribute_names("video").await?;

    let missing: Vec<&str> = required
        .iter()
        .filter(|name| !attributes.iter().any(|a| a == *name))
        .copied()
        .collect();
    let extra: Vec<&str> = excluded
        .iter()
        .filter(|name| attributes.iter().any(|a| a == *name))
        .copied()
        .collect();

    let mut findings = Vec::new();
    if !missing.is_empty() {
        findings.push(
            Finding::new(ErrorKind::VideoAttributesMissing).with("names", missing.join(", ")),
        );
    }
    if !extra.is_empty() {
        findings
            .push(Finding::new(ErrorKind::VideoAttributesExtra).with("names", extra.join(", ")));
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_names_both_ways() {
        let found = vec!["video".to_string(), "script".to_string()];
        let (missing, extra) = diff_names(&["video", "h1"], &found);
        assert_eq!(missing, vec!["h1"]);
        assert_eq!(extra, vec!["script"]);
    }

    #[test]
    fn test_diff_names_exact_match() {
        let found = vec!["video".to_string(), "h1".to_string()];
        let (missing, extra) = diff_names(&["video", "h1"], &found);
        assert!(missing.is_empty());
        assert!(extra.is_empty());
    }

    #[test]
    fn test_missing_names_single_entry_joins_trivially() {
        // Two of three probes match; only the third is reported.
        let results = [("description", true), ("og:url", true), ("og:image", false)];
        assert_eq!(missing_names(&results), vec!["og:image"]);
    }

    #[test]
    fn test_no_mismatches_means_no_finding() {
        // Regression guard: an all-matching expectation must produce an
        // empty mismatch list, not a finding.
        let expected = [("margin", "0px"), ("width", "800px")];
        let actual = vec![
            ("margin".to_string(), "0px".to_string()),
            ("width".to_string(), "800px".to_string()),
        ];
        assert!(mismatched_properties(&expected, &actual).is_empty());
    }

    #[test]
    fn test_mismatched_properties_are_formatted() {
        let expected = [("margin", "0px"), ("width", "800px")];
        let actual = vec![
            ("margin".to_string(), "8px".to_string()),
            ("width".to_string(), "800px".to_string()),
        ];
        assert_eq!(mismatched_properties(&expected, &actual), vec!["margin: 0px"]);
    }
}
