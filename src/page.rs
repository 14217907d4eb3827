//! Rendered page handle
//!
//! Owns one headless browser with one loaded page and exposes a narrow set
//! of read-only queries: existence probes, computed styles, attribute lists,
//! text, hover, and screenshots. No arbitrary script injection; every query
//! is a fixed expression returning a JSON-marshalable value.
//!
//! Browser calls block on the CDP connection, so they run on the blocking
//! pool.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use headless_chrome::protocol::cdp::Page::{CaptureScreenshotFormatOption, Viewport};
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use log::debug;
use serde::de::DeserializeOwned;
use tokio::task;

/// Fixed delay after navigation to let dynamic rendering settle.
const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Viewport used for rendering. Screenshots cover the full document even
/// when it is taller than this.
const WINDOW_SIZE: (u32, u32) = (800, 600);

/// A loaded page. Dropping it closes the browser.
pub struct Page {
    tab: Arc<Tab>,
    // Keeps the browser process alive for the page's lifetime.
    _browser: Browser,
}

impl Page {
    /// Launch a headless browser and load `html_path` as a `file://` URL.
    pub async fn open(html_path: &Path) -> Result<Self> {
        let url = file_url(html_path)?;
        debug!("loading {url}");

        let page = task::spawn_blocking(move || -> Result<Page> {
            let launch_options = LaunchOptionsBuilder::default()
                .headless(true)
                .window_size(Some(WINDOW_SIZE))
                .args(vec![
                    OsStr::new("--force-device-scale-factor=1"),
                    OsStr::new("--allow-file-access-from-files"),
                    OsStr::new("--disable-gpu"),
                    OsStr::new("--hide-scrollbars"),
                    OsStr::new("--no-sandbox"),
                ])
                .build()
                .map_err(|e| anyhow!("building browser launch options: {e}"))?;
            let browser = Browser::new(launch_options).context("launching headless browser")?;
            let tab = browser.new_tab().context("opening browser tab")?;
            tab.navigate_to(&url)?;
            tab.wait_until_navigated()?;
            Ok(Page {
                tab,
                _browser: browser,
            })
        })
        .await??;

        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(page)
    }

    /// Whether any element matches the selector.
    pub async fn exists(&self, selector: &str) -> Result<bool> {
        let expression = format!("!!document.querySelector({})", js_string(selector));
        Ok(self.evaluate(expression).await?.as_bool().unwrap_or(false))
    }

    /// The page title.
    pub async fn title(&self) -> Result<String> {
        let value = self.evaluate("document.title".to_string()).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Tag names of `<body>`'s direct element children, lower-cased. Text
    /// nodes are excluded by construction (`children` holds elements only).
    pub async fn body_child_tags(&self) -> Result<Vec<String>> {
        let expression = "JSON.stringify(Array.from(document.body.children)\
             .map((el) => el.tagName.toLowerCase()))"
            .to_string();
        self.evaluate_json(expression).await
    }

    /// Computed values for exactly the requested properties on the first
    /// element matching the selector. Fails if nothing matches.
    pub async fn computed_styles(
        &self,
        selector: &str,
        properties: &[&str],
    ) -> Result<Vec<(String, String)>> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return null; \
             const cs = window.getComputedStyle(el); \
             return JSON.stringify({props}.map((p) => [p, cs.getPropertyValue(p)])); }})()",
            sel = js_string(selector),
            props = serde_json::to_string(properties)?,
        );
        let value = self.evaluate(expression).await?;
        if value.is_null() {
            bail!("no element matches selector '{selector}'");
        }
        decode_json(&value)
    }

    /// Attribute names of the first element matching the selector. Fails if
    /// nothing matches.
    pub async fn attribute_names(&self, selector: &str) -> Result<Vec<String>> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return null; \
             return JSON.stringify(Array.from(el.attributes).map((a) => a.name)); }})()",
            sel = js_string(selector),
        );
        let value = self.evaluate(expression).await?;
        if value.is_null() {
            bail!("no element matches selector '{selector}'");
        }
        decode_json(&value)
    }

    /// Move the mouse over the first element matching the selector.
    pub async fn hover(&self, selector: &str) -> Result<()> {
        let tab = self.tab.clone();
        let selector = selector.to_string();
        task::spawn_blocking(move || -> Result<()> {
            tab.find_element(&selector)
                .with_context(|| format!("finding element '{selector}'"))?
                .move_mouse_over()?;
            Ok(())
        })
        .await?
    }

    /// Capture a PNG screenshot of the whole document. Content below the
    /// viewport is included via a capture clip sized to the document.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let (width, height) = self.document_size().await?;
        let clip = full_page_clip(width, height);
        let tab = self.tab.clone();
        task::spawn_blocking(move || {
            tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, Some(clip), true)
        })
        .await?
    }

    /// Rendered document size in CSS pixels.
    async fn document_size(&self) -> Result<(f64, f64)> {
        let expression = "JSON.stringify([document.documentElement.scrollWidth, \
             document.documentElement.scrollHeight])"
            .to_string();
        self.evaluate_json(expression).await
    }

    async fn evaluate(&self, expression: String) -> Result<serde_json::Value> {
        let tab = self.tab.clone();
        task::spawn_blocking(move || -> Result<serde_json::Value> {
            let object = tab.evaluate(&expression, false)?;
            Ok(object.value.unwrap_or(serde_json::Value::Null))
        })
        .await?
    }

    /// Evaluate an expression that returns `JSON.stringify`-ed data and
    /// decode it.
    async fn evaluate_json<T: DeserializeOwned>(&self, expression: String) -> Result<T> {
        let value = self.evaluate(expression).await?;
        decode_json(&value)
    }
}

fn decode_json<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T> {
    let text = value
        .as_str()
        .ok_or_else(|| anyhow!("page query returned a non-string result"))?;
    serde_json::from_str(text).context("decoding page query result")
}

/// Capture clip covering the whole document, anchored at the origin.
fn full_page_clip(width: f64, height: f64) -> Viewport {
    Viewport {
        x: 0.0,
        y: 0.0,
        width,
        height,
        scale: 1.0,
    }
}

/// Quote a string as a JavaScript string literal.
fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

fn file_url(path: &Path) -> Result<String> {
    let absolute = path
        .canonicalize()
        .with_context(|| format!("resolving {}", path.display()))?;
    Ok(format!("file://{}", absolute.display()))
}
