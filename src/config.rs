//! Configuration for the grader binary.
//!
//! Handles:
//! - Command-line argument parsing
//! - Artifact path defaults

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Command-line arguments for the grader
#[derive(Debug, Parser)]
#[command(name = "page-grader")]
#[command(about = "Grade a static web-page project against the assignment rules")]
#[command(version)]
pub struct Args {
    /// Path to the student's project directory
    pub project_path: PathBuf,

    /// Report language
    #[arg(default_value = "ru")]
    pub language: String,
}

/// Combined runtime configuration. Artifact locations are fixed; only the
/// project path and language come from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_path: PathBuf,
    pub language: String,
    /// Where the violation report is written
    pub result_path: PathBuf,
    /// Canonical layout image the rendered page is compared against
    pub reference_image: PathBuf,
    /// Where the captured page screenshot is written
    pub screenshot: PathBuf,
    /// Where the visual diff image is written
    pub diff_image: PathBuf,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        Ok(Config {
            project_path: args.project_path,
            language: args.language,
            result_path: PathBuf::from("result.txt"),
            reference_image: PathBuf::from("layout-canonical.png"),
            screenshot: PathBuf::from("layout.png"),
            diff_image: PathBuf::from("layout-diff.png"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["page-grader", "project"]);
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.project_path, PathBuf::from("project"));
        assert_eq!(config.language, "ru");
        assert_eq!(config.result_path, PathBuf::from("result.txt"));
        assert_eq!(
            config.reference_image,
            PathBuf::from("layout-canonical.png")
        );
    }

    #[test]
    fn test_language_positional() {
        let args = Args::parse_from(["page-grader", "project", "en"]);
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.language, "en");
    }

    #[test]
    fn test_extra_flags_are_rejected() {
        assert!(Args::try_parse_from(["page-grader", "project", "--verbose"]).is_err());
    }
}
