//! CLI output formatting for the build stages.
//!
//! # Information-First Display
//!
//! Output lists **content, not files**. Each post leads with its positional
//! index and title; slugs, dates, and output paths follow as indented
//! context lines. The result reads as an inventory of the blog.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Settings
//!     Fixture Blog
//!     A blog about fixtures.
//!
//! Posts
//! 001 Third Post
//!     Slug: third-post
//!     Date: 2024-06-20T09:00:00Z
//!     By Grace Hopper
//!     A short excerpt...
//!
//! Fetched 3 posts (live)
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//!
//! Posts
//! 001 Third Post → posts/third-post/index.html
//!
//! Generated 1 index, 3 post pages (live)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::generate::GenerateReport;
use crate::load::SiteProps;
use crate::rich_text;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn mode_label(draft_mode: bool) -> &'static str {
    if draft_mode { "draft" } else { "live" }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Fetch output
// ============================================================================

/// Format the content inventory loaded by the fetch stage.
pub fn format_fetch_output(props: &SiteProps) -> Vec<String> {
    let mut lines = Vec::new();
    let settings = &props.index.settings;

    lines.push("Settings".to_string());
    lines.push(format!("{}{}", indent(1), settings.title));
    let description = rich_text::plain_text(&settings.description);
    let description = description.lines().next().unwrap_or_default().trim();
    if !description.is_empty() {
        lines.push(format!("{}{}", indent(1), truncate(description, 60)));
    }

    lines.push(String::new());
    lines.push("Posts".to_string());
    if props.index.posts.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, post) in props.index.posts.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), post.title));
        lines.push(format!("{}Slug: {}", indent(1), post.slug));
        if let Some(ref date) = post.date {
            lines.push(format!("{}Date: {}", indent(1), date));
        }
        if let Some(ref author) = post.author {
            lines.push(format!("{}By {}", indent(1), author.name));
        }
        let excerpt = post.excerpt.as_deref().unwrap_or_default().trim();
        if !excerpt.is_empty() {
            lines.push(format!("{}{}", indent(1), truncate(excerpt, 60)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Fetched {} ({})",
        plural(props.index.posts.len(), "post", "posts"),
        mode_label(props.index.draft_mode())
    ));
    lines
}

pub fn print_fetch_output(props: &SiteProps) {
    for line in format_fetch_output(props) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate output
// ============================================================================

/// Format the pages written by the generate stage.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = vec![format!("Home → {}", report.index.path.display())];

    if !report.posts.is_empty() {
        lines.push(String::new());
        lines.push("Posts".to_string());
        for (i, page) in report.posts.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                page.title,
                page.path.display()
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated 1 index, {} ({})",
        plural(report.posts.len(), "post page", "post pages"),
        mode_label(report.draft_mode)
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}
