//! Page rendering.
//!
//! The index page has two renderers behind one [`IndexRenderer`] trait:
//! [`LiveIndexPage`] for published builds and [`PreviewIndexPage`] for draft
//! builds. [`PageSelector`] picks between them from the loaded
//! [`PageRenderContext`]; nothing else in the context influences the choice.
//!
//! ## Page Anatomy
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ draft banner (preview only)              │
//! ├──────────────────────────────────────────┤
//! │ header: h1 site title │ description      │   index: level 1
//! │ hero post: cover, title, date, excerpt   │
//! │ More Stories: grid of the remaining posts│
//! └──────────────────────────────────────────┘
//! ```
//!
//! Post pages use the level-2 header (site title linking home) above the
//! post title, cover, byline, body and a short "More Stories" list.

use crate::header::{HeadingLevel, render_header};
use crate::load::PageRenderContext;
use crate::rich_text;
use crate::types::{Author, Image, Post, PostAndMore, Settings};
use chrono::{DateTime, NaiveDate};
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Everything pages share that does not come from content.
#[derive(Debug, Clone)]
pub struct PageShell {
    pub css: String,
    pub lang: String,
    /// First path segment of post URLs.
    pub posts_path: String,
}

impl PageShell {
    pub fn post_url(&self, slug: &str) -> String {
        format!("/{}/{}/", self.posts_path, slug)
    }
}

/// Renders the index page from posts and settings.
pub trait IndexRenderer {
    fn render(&self, posts: &[Post], settings: &Settings) -> Markup;
}

/// Index page for published content.
pub struct LiveIndexPage<'a> {
    shell: &'a PageShell,
}

impl<'a> LiveIndexPage<'a> {
    pub fn new(shell: &'a PageShell) -> Self {
        Self { shell }
    }
}

impl IndexRenderer for LiveIndexPage<'_> {
    fn render(&self, posts: &[Post], settings: &Settings) -> Markup {
        index_page(self.shell, posts, settings, false)
    }
}

/// Index page for draft builds: same layout, marked as a preview.
pub struct PreviewIndexPage<'a> {
    shell: &'a PageShell,
}

impl<'a> PreviewIndexPage<'a> {
    pub fn new(shell: &'a PageShell) -> Self {
        Self { shell }
    }
}

impl IndexRenderer for PreviewIndexPage<'_> {
    fn render(&self, posts: &[Post], settings: &Settings) -> Markup {
        index_page(self.shell, posts, settings, true)
    }
}

/// Chooses the preview renderer in draft mode and the live one otherwise.
pub struct PageSelector<L, P> {
    live: L,
    preview: P,
}

impl<L: IndexRenderer, P: IndexRenderer> PageSelector<L, P> {
    pub fn new(live: L, preview: P) -> Self {
        Self { live, preview }
    }

    pub fn select(&self, ctx: &PageRenderContext) -> Markup {
        if ctx.draft_mode() {
            self.preview.render(&ctx.posts, &ctx.settings)
        } else {
            self.live.render(&ctx.posts, &ctx.settings)
        }
    }
}

impl<'a> PageSelector<LiveIndexPage<'a>, PreviewIndexPage<'a>> {
    /// The stock live/preview pair.
    pub fn for_shell(shell: &'a PageShell) -> Self {
        Self::new(LiveIndexPage::new(shell), PreviewIndexPage::new(shell))
    }
}

// ============================================================================
// Layout
// ============================================================================

fn base_document(
    shell: &PageShell,
    title: &str,
    description: Option<&str>,
    draft_mode: bool,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(shell.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(description) = description.filter(|d| !d.is_empty()) {
                    meta name="description" content=(description);
                }
                @if draft_mode {
                    meta name="robots" content="noindex";
                }
                style { (PreEscaped(&shell.css)) }
            }
            body data-draft-mode=[draft_mode.then_some("true")] {
                div.min-h-screen {
                    @if draft_mode {
                        (draft_banner())
                    }
                    main { (content) }
                }
            }
        }
    }
}

fn draft_banner() -> Markup {
    html! {
        div.draft-banner."border-b" {
            div.container."mx-auto"."px-5" {
                div."py-2"."text-center"."text-sm" {
                    "Previewing drafts. This page includes unpublished content."
                }
            }
        }
    }
}

fn container(content: Markup) -> Markup {
    html! {
        div.container."mx-auto"."px-5" { (content) }
    }
}

// ============================================================================
// Components
// ============================================================================

/// Display form of a post date: `January 10, 2024`.
///
/// Accepts RFC 3339 datetimes and plain `YYYY-MM-DD` dates.
pub fn format_date(raw: &str) -> Option<String> {
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some(date.format("%B %-d, %Y").to_string())
}

fn post_date(raw: Option<&str>) -> Markup {
    html! {
        @if let Some(raw) = raw {
            @match format_date(raw) {
                Some(display) => {
                    time datetime=(raw) { (display) }
                },
                None => {
                    time { (raw) }
                },
            }
        }
    }
}

fn cover_image(title: &str, image: Option<&Image>, link: Option<&str>) -> Markup {
    let picture = html! {
        @match image {
            Some(image) => {
                img."h-auto"."w-full" src=(image.url)
                    alt=(image.alt.as_deref().unwrap_or(title)) loading="lazy";
            },
            None => {
                div.cover-placeholder { (title) }
            },
        }
    };
    html! {
        div."sm:mx-0".cover-image {
            @match link {
                Some(href) => {
                    a href=(href) aria-label=(title) { (picture) }
                },
                None => { (picture) },
            }
        }
    }
}

fn avatar(author: Option<&Author>) -> Markup {
    html! {
        @if let Some(author) = author {
            div.flex."items-center".avatar {
                @if let Some(picture) = &author.picture {
                    img."mr-4"."h-12"."w-12"."rounded-full" src=(picture.url) alt=(author.name);
                }
                div."text-xl"."font-bold" { (author.name) }
            }
        }
    }
}

fn hero_post(shell: &PageShell, post: &Post) -> Markup {
    let url = shell.post_url(&post.slug);
    html! {
        section.hero-post {
            div."mb-8"."md:mb-16" {
                (cover_image(&post.title, post.cover_image.as_ref(), Some(url.as_str())))
            }
            div."mb-20"."md:mb-28"."md:grid"."md:grid-cols-2"."md:gap-x-16"."lg:gap-x-8" {
                div {
                    h3."mb-4"."text-4xl"."leading-tight"."lg:text-6xl"."text-balance" {
                        a."hover:underline" href=(url) { (post.title) }
                    }
                    div."mb-4"."text-lg"."md:mb-0" {
                        (post_date(post.date.as_deref()))
                    }
                }
                div {
                    @if let Some(excerpt) = &post.excerpt {
                        p."mb-4"."text-lg"."leading-relaxed"."text-pretty" { (excerpt) }
                    }
                    (avatar(post.author.as_ref()))
                }
            }
        }
    }
}

fn post_preview(shell: &PageShell, post: &Post) -> Markup {
    let url = shell.post_url(&post.slug);
    html! {
        div.post-preview {
            div."mb-5" {
                (cover_image(&post.title, post.cover_image.as_ref(), Some(url.as_str())))
            }
            h3."mb-3"."text-3xl"."leading-snug"."text-balance" {
                a."hover:underline" href=(url) { (post.title) }
            }
            div."mb-4"."text-lg" {
                (post_date(post.date.as_deref()))
            }
            @if let Some(excerpt) = &post.excerpt {
                p."mb-4"."text-lg"."leading-relaxed"."text-pretty" { (excerpt) }
            }
            (avatar(post.author.as_ref()))
        }
    }
}

fn more_stories(shell: &PageShell, posts: &[Post]) -> Markup {
    html! {
        @if !posts.is_empty() {
            section.more-stories {
                h2."mb-8"."text-6xl"."font-bold"."leading-tight"."tracking-tighter"."md:text-7xl" {
                    "More Stories"
                }
                div."mb-32"."grid"."grid-cols-1"."gap-y-20"."md:grid-cols-2"."md:gap-x-16"."md:gap-y-32"."lg:gap-x-32" {
                    @for post in posts {
                        (post_preview(shell, post))
                    }
                }
            }
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

fn index_page(shell: &PageShell, posts: &[Post], settings: &Settings, draft_mode: bool) -> Markup {
    let description = rich_text::plain_text(&settings.description);
    let content = container(html! {
        (render_header(&settings.title, Some(settings.description.as_slice()), HeadingLevel::Primary))
        @if let Some((hero, rest)) = posts.split_first() {
            (hero_post(shell, hero))
            (more_stories(shell, rest))
        }
    });
    base_document(shell, &settings.title, Some(&description), draft_mode, content)
}

/// Render one post page.
pub fn render_post_page(
    shell: &PageShell,
    page: &PostAndMore,
    settings: &Settings,
    draft_mode: bool,
) -> Markup {
    let post = &page.post;
    let title = format!("{} | {}", post.title, settings.title);
    let content = container(html! {
        (render_header(&settings.title, None, HeadingLevel::Secondary))
        article {
            h1."mb-12"."text-center"."text-6xl"."font-bold"."leading-tight"."tracking-tighter"."md:text-left"."md:text-7xl"."md:leading-none"."lg:text-8xl"."text-balance" {
                (post.title)
            }
            div."hidden"."md:mb-12"."md:block" {
                (avatar(post.author.as_ref()))
            }
            div."mb-8"."sm:mx-0"."md:mb-16" {
                (cover_image(&post.title, post.cover_image.as_ref(), None))
            }
            div."mx-auto"."max-w-2xl" {
                div."mb-6"."text-lg" {
                    (post_date(post.date.as_deref()))
                }
                div."mx-auto"."max-w-2xl".portable-text {
                    (rich_text::render(&post.content))
                }
            }
        }
        @if !page.more_posts.is_empty() {
            hr."mb-24"."mt-28"."border-accent-2";
            (more_stories(shell, &page.more_posts))
        }
    });
    base_document(shell, &title, post.excerpt.as_deref(), draft_mode, content)
}
