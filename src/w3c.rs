//! W3C markup validator client
//!
//! Forwards raw HTML to the Nu validator and maps its error messages into
//! findings. Network or decode failures propagate as hard errors and abort
//! the check batch.

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::report::{ErrorKind, Finding};

const VALIDATOR_URL: &str = "https://validator.w3.org/nu/?out=json";

// The validator rejects requests with a default client user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (platform; rv:geckoversion) Gecko/geckotrail Firefox/firefoxversion";

#[derive(Debug, Deserialize)]
struct ValidatorResponse {
    messages: Vec<ValidatorMessage>,
}

#[derive(Debug, Deserialize)]
struct ValidatorMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "lastLine", default)]
    last_line: u64,
    message: String,
}

/// Validate one HTML file against the W3C Nu checker.
pub async fn check_w3c(client: &reqwest::Client, html_path: &Path) -> Result<Vec<Finding>> {
    let html = tokio::fs::read_to_string(html_path)
        .await
        .with_context(|| format!("reading {}", html_path.display()))?;
    let file_name = html_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let response = client
        .post(VALIDATOR_URL)
        .header(reqwest::header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .body(html)
        .send()
        .await
        .context("sending markup to the W3C validator")?
        .error_for_status()
        .context("W3C validator rejected the request")?;
    let response: ValidatorResponse = response
        .json()
        .await
        .context("decoding the W3C validator response")?;
    debug!(
        "W3C validator returned {} message(s) for {file_name}",
        response.messages.len()
    );

    Ok(error_findings(&file_name, response.messages))
}

/// Keep `type == "error"` messages and map them into findings.
fn error_findings(file_name: &str, messages: Vec<ValidatorMessage>) -> Vec<Finding> {
    messages
        .into_iter()
        .filter(|message| message.kind == "error")
        .map(|message| {
            Finding::new(ErrorKind::W3c)
                .with("fileName", file_name)
                .with("line", message.last_line.to_string())
                .with("message", message.message)
        })
        .collect()
}
