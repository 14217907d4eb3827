//! Project tree inspection.
//!
//! Compares the fixed expected directory shape against the student's actual
//! submission tree. Only omissions are reported; extra entries are ignored.
//! A non-empty result gates the whole run, because the remaining checks
//! assume the expected files exist.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::report::{ErrorKind, Finding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// A directory-tree node. Nodes compare by name and kind only; file content
/// is never inspected here.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
}

/// Build an expected file node.
pub fn file(name: &str) -> TreeNode {
    TreeNode {
        name: name.to_string(),
        kind: NodeKind::File,
        children: Vec::new(),
    }
}

/// Build an expected directory node.
pub fn dir(name: &str, children: Vec<TreeNode>) -> TreeNode {
    TreeNode {
        name: name.to_string(),
        kind: NodeKind::Directory,
        children,
    }
}

/// Scan a filesystem path into a tree of names and kinds.
pub fn scan(path: &Path) -> Result<TreeNode> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let metadata =
        fs::metadata(path).with_context(|| format!("reading {}", path.display()))?;

    if !metadata.is_dir() {
        return Ok(TreeNode {
            name,
            kind: NodeKind::File,
            children: Vec::new(),
        });
    }

    let mut children = Vec::new();
    let entries =
        fs::read_dir(path).with_context(|| format!("listing {}", path.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", path.display()))?;
        children.push(scan(&entry.path())?);
    }

    Ok(TreeNode {
        name,
        kind: NodeKind::Directory,
        children,
    })
}

/// Report every expected node missing from the actual tree.
///
/// Matched directories are recursed into; files are leaves. The root nodes
/// themselves are not compared, only their children.
pub fn compare_trees(expected: &TreeNode, actual: &TreeNode) -> Vec<Finding> {
    compare_children(&expected.children, &actual.children)
}

fn compare_children(expected: &[TreeNode], actual: &[TreeNode]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for item in expected {
        let found = actual
            .iter()
            .find(|node| node.name == item.name && node.kind == item.kind);
        match found {
            None => {
                let kind = match item.kind {
                    NodeKind::File => ErrorKind::StructureFile,
                    NodeKind::Directory => ErrorKind::StructureDirectory,
                };
                findings.push(Finding::new(kind).with("name", item.name.clone()));
            }
            Some(node) if item.kind == NodeKind::Directory => {
                findings.extend(compare_children(&item.children, &node.children));
            }
            Some(_) => {}
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> TreeNode {
        dir(
            "project",
            vec![
                file("index.html"),
                dir("styles", vec![file("style.css")]),
                dir("video", vec![]),
            ],
        )
    }

    #[test]
    fn test_identical_trees_produce_no_findings() {
        let tree = sample_tree();
        assert!(compare_trees(&tree, &tree).is_empty());
    }

    #[test]
    fn test_missing_file_is_reported_once() {
        let expected = sample_tree();
        let mut actual = sample_tree();
        actual.children[1].children.clear(); // drop styles/style.css

        let findings = compare_trees(&expected, &actual);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, ErrorKind::StructureFile);
        assert_eq!(findings[0].values, vec![("name", "style.css".to_string())]);
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let expected = sample_tree();
        let mut actual = sample_tree();
        actual.children.retain(|node| node.name != "video");

        let findings = compare_trees(&expected, &actual);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, ErrorKind::StructureDirectory);
    }

    #[test]
    fn test_extra_entries_are_ignored() {
        let expected = sample_tree();
        let mut actual = sample_tree();
        actual.children.push(file("notes.txt"));
        assert!(compare_trees(&expected, &actual).is_empty());
    }

    #[test]
    fn test_file_directory_kind_mismatch_is_missing() {
        let expected = sample_tree();
        let mut actual = sample_tree();
        // Same name, wrong kind.
        actual.children[0] = dir("index.html", vec![]);

        let findings = compare_trees(&expected, &actual);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, ErrorKind::StructureFile);
    }

    #[test]
    fn test_scan_reads_names_and_kinds() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("styles")).unwrap();
        std::fs::write(root.path().join("index.html"), "<html></html>").unwrap();
        std::fs::write(root.path().join("styles").join("style.css"), "").unwrap();

        let tree = scan(root.path()).unwrap();
        assert_eq!(tree.kind, NodeKind::Directory);
        assert!(
            tree.children
                .iter()
                .any(|node| node.name == "index.html" && node.kind == NodeKind::File)
        );
        let styles = tree
            .children
            .iter()
            .find(|node| node.name == "styles")
            .unwrap();
        assert_eq!(styles.children.len(), 1);
    }
}
