//! Visual regression check
//!
//! Captures a screenshot of the rendered page and diffs it pixel-by-pixel
//! against the canonical layout image, tolerating anti-aliasing noise. A
//! diff artifact with differing pixels marked is written regardless of the
//! outcome.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use log::info;

use crate::page::Page;
use crate::report::{ErrorKind, Finding};

/// Per-channel difference tolerated as anti-aliasing noise.
const ANTIALIAS_TOLERANCE: u8 = 16;

/// Mismatch percentage above which (strictly) the layout counts as
/// different.
const MISMATCH_THRESHOLD: f64 = 10.0;

/// Marker color for differing pixels in the diff artifact.
const MARKER: [u8; 3] = [255, 0, 255];
const MARKER_OPACITY: f32 = 0.7;

/// Artifact locations for the visual check.
#[derive(Debug, Clone, Copy)]
pub struct LayoutPaths<'a> {
    pub reference: &'a Path,
    pub screenshot: &'a Path,
    pub diff: &'a Path,
}

/// Hover the primary heading for a deterministic visual state, screenshot
/// the page, and compare against the canonical layout.
pub async fn check_layout(page: &Page, paths: &LayoutPaths<'_>) -> Result<Vec<Finding>> {
    page.hover("h1").await?;
    let png = page.screenshot().await?;
    fs::write(paths.screenshot, &png)
        .with_context(|| format!("writing {}", paths.screenshot.display()))?;

    let actual = image::load_from_memory(&png)
        .context("decoding the page screenshot")?
        .to_rgba8();
    let reference = image::open(paths.reference)
        .with_context(|| format!("reading canonical layout {}", paths.reference.display()))?
        .to_rgba8();

    let comparison = compare(&reference, &actual);
    comparison
        .diff
        .save(paths.diff)
        .with_context(|| format!("writing {}", paths.diff.display()))?;
    info!(
        "layout mismatch: {:.2}% (diff written to {})",
        comparison.mismatch_percentage,
        paths.diff.display()
    );

    if exceeds_threshold(comparison.mismatch_percentage) {
        Ok(vec![Finding::new(ErrorKind::LayoutDifferent)])
    } else {
        Ok(Vec::new())
    }
}

fn exceeds_threshold(mismatch_percentage: f64) -> bool {
    mismatch_percentage > MISMATCH_THRESHOLD
}

struct Comparison {
    mismatch_percentage: f64,
    diff: RgbaImage,
}

/// Per-pixel comparison over the union of both sizes. Pixels outside the
/// common region count as differing. The diff image is the screenshot with
/// differing pixels blended toward the marker color.
fn compare(reference: &RgbaImage, actual: &RgbaImage) -> Comparison {
    let width = reference.width().max(actual.width());
    let height = reference.height().max(actual.height());
    let mut diff = RgbaImage::new(width, height);
    let mut differing: u64 = 0;

    for y in 0..height {
        for x in 0..width {
            let actual_pixel = pixel_at(actual, x, y);
            let reference_pixel = pixel_at(reference, x, y);
            let differs = match (actual_pixel, reference_pixel) {
                (Some(a), Some(r)) => !within_tolerance(a, r),
                _ => true,
            };
            let base = actual_pixel.unwrap_or([0, 0, 0, 255]);
            let out = if differs { blend_marker(base) } else { base };
            diff.put_pixel(x, y, Rgba(out));
            if differs {
                differing += 1;
            }
        }
    }

    let total = u64::from(width) * u64::from(height);
    let mismatch_percentage = if total == 0 {
        0.0
    } else {
        differing as f64 * 100.0 / total as f64
    };
    Comparison {
        mismatch_percentage,
        diff,
    }
}

fn pixel_at(image: &RgbaImage, x: u32, y: u32) -> Option<[u8; 4]> {
    if x < image.width() && y < image.height() {
        Some(image.get_pixel(x, y).0)
    } else {
        None
    }
}

fn within_tolerance(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(&ca, &cb)| ca.abs_diff(cb) <= ANTIALIAS_TOLERANCE)
}

fn blend_marker(base: [u8; 4]) -> [u8; 4] {
    let mut out = base;
    for channel in 0..3 {
        let marked = f32::from(MARKER[channel]) * MARKER_OPACITY
            + f32::from(base[channel]) * (1.0 - MARKER_OPACITY);
        out[channel] = marked.round() as u8;
    }
    out[3] = 255;
    out
}
