//! HTML site generation.
//!
//! Second stage of the build. Takes the loaded [`SiteProps`] and writes the
//! final static blog.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                  # Live or preview index, via PageSelector
//! └── posts/
//!     ├── hello-world/
//!     │   └── index.html
//!     └── second-post/
//!         └── index.html
//! ```
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time and prefixed with color
//! custom properties generated from `config.toml`.

use crate::config::{self, SiteConfig};
use crate::load::SiteProps;
use crate::page::{PageSelector, PageShell, render_post_page};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsafe post slug: {0:?}")]
    UnsafeSlug(String),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// A written page, relative to the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub title: String,
    pub path: PathBuf,
}

/// What [`generate`] wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub index: GeneratedPage,
    pub posts: Vec<GeneratedPage>,
    pub draft_mode: bool,
}

/// Build the page shell from config.
pub fn page_shell(config: &SiteConfig) -> PageShell {
    let color_css = config::generate_color_css(&config.colors);
    PageShell {
        css: format!("{}\n\n{}", color_css, CSS_STATIC),
        lang: config.site.lang.clone(),
        posts_path: config.site.posts_path.clone(),
    }
}

/// Read `props.json` written by the fetch stage.
pub fn read_props(path: &Path) -> Result<SiteProps, GenerateError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the site into `output_dir`.
pub fn generate(
    props: &SiteProps,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let shell = page_shell(config);
    let draft_mode = props.index.draft_mode();

    fs::create_dir_all(output_dir)?;

    let index_html = PageSelector::for_shell(&shell).select(&props.index);
    fs::write(output_dir.join("index.html"), index_html.into_string())?;
    tracing::debug!(draft = draft_mode, "wrote index.html");
    let index = GeneratedPage {
        title: props.index.settings.title.clone(),
        path: PathBuf::from("index.html"),
    };

    // Render in parallel, write in order.
    let rendered = props
        .post_pages
        .par_iter()
        .map(|page| -> Result<_, GenerateError> {
            check_slug(&page.post.slug)?;
            let html = render_post_page(&shell, page, &props.index.settings, draft_mode);
            Ok((page, html))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut posts = Vec::with_capacity(rendered.len());
    for (page, html) in rendered {
        let rel_dir = Path::new(&config.site.posts_path).join(&page.post.slug);
        fs::create_dir_all(output_dir.join(&rel_dir))?;
        let rel_path = rel_dir.join("index.html");
        fs::write(output_dir.join(&rel_path), html.into_string())?;
        tracing::debug!(path = %rel_path.display(), "wrote post page");
        posts.push(GeneratedPage {
            title: page.post.title.clone(),
            path: rel_path,
        });
    }

    tracing::info!(
        pages = posts.len() + 1,
        output = %output_dir.display(),
        "site generated"
    );
    Ok(GenerateReport {
        index,
        posts,
        draft_mode,
    })
}

/// Slugs become directory names, so they must be a single plain segment.
fn check_slug(slug: &str) -> Result<(), GenerateError> {
    let unsafe_slug = slug.is_empty()
        || slug == "."
        || slug == ".."
        || slug.contains(['/', '\\'])
        || slug.chars().any(char::is_control);
    if unsafe_slug {
        return Err(GenerateError::UnsafeSlug(slug.to_string()));
    }
    Ok(())
}
