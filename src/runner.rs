//! Check orchestration
//!
//! The fixed, assignment-specific list of checks. The structure check runs
//! first and gates everything else; the remaining checks run as one
//! concurrent, all-or-nothing batch sharing a single page handle, and their
//! findings are flattened in declaration order.

use anyhow::Result;
use log::{debug, info};

use crate::analyze;
use crate::checks::{self, SelectorProbe};
use crate::config::Config;
use crate::layout::{self, LayoutPaths};
use crate::page::Page;
use crate::report::{ErrorKind, Finding, Report};
use crate::structure::{self, TreeNode, dir, file};
use crate::w3c;

const META_TAGS: [SelectorProbe; 6] = [
    SelectorProbe {
        name: "description",
        selector: "meta[name=\"description\"][content]:not([content=\"\"])",
    },
    SelectorProbe {
        name: "og:url",
        selector: "meta[property=\"og:url\"][content]:not([content=\"\"])",
    },
    SelectorProbe {
        name: "og:title",
        selector: "meta[property=\"og:title\"][content]:not([content=\"\"])",
    },
    SelectorProbe {
        name: "og:description",
        selector: "meta[property=\"og:description\"][content]:not([content=\"\"])",
    },
    SelectorProbe {
        name: "og:image",
        selector: "meta[property=\"og:image\"][content]:not([content=\"\"])",
    },
    SelectorProbe {
        name: "twitter:card",
        selector: "meta[property=\"twitter:card\"][content]:not([content=\"\"])",
    },
];

const FAVICONS: [SelectorProbe; 2] = [
    SelectorProbe {
        name: "ico",
        selector: "link[rel=\"icon\"][href$=\".ico\"]",
    },
    SelectorProbe {
        name: "svg",
        selector: "link[rel=\"icon\"][href$=\".svg\"]",
    },
];

const MOBILE_FAVICONS: [SelectorProbe; 1] = [SelectorProbe {
    name: "apple-touch-icon",
    selector: "link[rel=\"apple-touch-icon\"]",
}];

const STYLESHEET_ORDER: [&str; 2] = ["font.css", "style.css"];
const ALLOWED_FONTS: [&str; 1] = ["Mulish"];
const BODY_ELEMENTS: [&str; 2] = ["video", "h1"];
const BODY_PROPERTIES: [(&str, &str); 2] = [("margin", "0px"), ("width", "800px")];
const VIDEO_REQUIRED: [&str; 4] = ["muted", "autoplay", "poster", "loop"];
const VIDEO_EXCLUDED: [&str; 1] = ["controls"];

/// The fixed directory shape every submission must have.
fn expected_tree() -> TreeNode {
    dir(
        "project",
        vec![
            file("index.html"),
            dir("styles", vec![file("style.css")]),
            dir("fonts", vec![file("font.css")]),
            dir("video", vec![]),
            dir("images", vec![]),
        ],
    )
}

/// Run every check against the project and collect the findings.
pub async fn run(config: &Config) -> Result<Report> {
    let actual = structure::scan(&config.project_path)?;
    let structure_findings = structure::compare_trees(&expected_tree(), &actual);
    if !structure_findings.is_empty() {
        debug!("structure check failed; skipping the remaining checks");
        return Ok(Report::new(structure_findings));
    }

    let index_html = config.project_path.join("index.html");
    let style_css = config.project_path.join("styles").join("style.css");
    let layout_paths = LayoutPaths {
        reference: &config.reference_image,
        screenshot: &config.screenshot,
        diff: &config.diff_image,
    };

    let page = Page::open(&index_html).await?;
    let client = reqwest::Client::new();

    // All-or-nothing join; the page is dropped (browser closed) whether the
    // batch succeeds or fails.
    let batch = tokio::try_join!(
        w3c::check_w3c(&client, &index_html),
        async { analyze::lint_css_files(&config.project_path) },
        checks::check_order_stylesheet_links(&page, &STYLESHEET_ORDER),
        async { analyze::check_alternative_fonts(&style_css, &ALLOWED_FONTS) },
        checks::check_body_elements(&page, &BODY_ELEMENTS),
        checks::check_lang(&page, &config.language),
        checks::check_title_emmet(&page),
        checks::check_elements_by_selectors(&page, &META_TAGS, ErrorKind::MetaTagsMissing),
        checks::check_elements_by_selectors(&page, &FAVICONS, ErrorKind::FaviconsMissing),
        checks::check_elements_by_selectors(
            &page,
            &MOBILE_FAVICONS,
            ErrorKind::MobileFaviconMissing,
        ),
        checks::check_properties_by_element(&page, "body", &BODY_PROPERTIES),
        checks::check_video_attributes(&page, &VIDEO_REQUIRED, &VIDEO_EXCLUDED),
        async { analyze::check_pseudo_elements(&style_css) },
        layout::check_layout(&page, &layout_paths),
    );
    drop(page);

    let (
        w3c_findings,
        lint,
        link_order,
        fonts,
        body_elements,
        lang,
        title,
        meta_tags,
        favicons,
        mobile_favicon,
        body_properties,
        video_attributes,
        pseudo,
        layout_diff,
    ) = batch?;

    let mut findings: Vec<Finding> = Vec::new();
    for part in [
        w3c_findings,
        lint,
        link_order,
        fonts,
        body_elements,
        lang,
        title,
        meta_tags,
        favicons,
        mobile_favicon,
        body_properties,
        video_attributes,
        pseudo,
        layout_diff,
    ] {
        findings.extend(part);
    }
    info!("checks finished with {} finding(s)", findings.len());
    Ok(Report::new(findings))
}
