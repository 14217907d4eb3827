//! page-grader
//!
//! An automated grader for a static web-page assignment. It validates a
//! student project directory against a fixed set of structural, markup,
//! style, and visual-rendering rules and produces a localized list of
//! violations.
//!
//! This library provides:
//! - Project tree inspection with gating
//! - Static CSS analysis (lint rules, fonts, pseudo-selectors)
//! - Rendered-page checks over a headless browser
//! - W3C markup validation and visual regression
//! - Localized report formatting

pub mod analyze;
pub mod checks;
pub mod config;
pub mod css;
pub mod layout;
pub mod page;
pub mod report;
pub mod runner;
pub mod structure;
pub mod w3c;

// Re-exports for clean public API
pub use config::Config;
pub use report::{ErrorKind, Finding, LintRule, Locale, Report};
pub use structure::{TreeNode, compare_trees};
