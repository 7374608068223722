//! Page data loading.
//!
//! Runs once per build, before any rendering. Settings and posts are fetched
//! concurrently and the result is frozen into a [`PageRenderContext`], which
//! the renderers only read.
//!
//! Draft mode is threaded explicitly as a [`DraftMode`] value: it decides
//! which client is used (authenticated or public) and travels with the
//! context to pick the preview renderer.

use crate::content::{ClientFactory, ContentError, ContentSource};
use crate::types::{Post, PostAndMore, Settings};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Content client error: {0}")]
    Client(#[source] ContentError),
    #[error("Failed to fetch settings: {0}")]
    Settings(#[source] ContentError),
    #[error("Failed to fetch posts: {0}")]
    Posts(#[source] ContentError),
    #[error("Post not found: {0}")]
    PostNotFound(String),
    #[error("Draft mode requires a read token in ${0}")]
    MissingToken(String),
}

/// Whether unpublished content is fetched and rendered.
///
/// The read token exists only while draft mode is on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftMode {
    token: Option<String>,
}

impl DraftMode {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Enable draft mode. An empty token is rejected.
    pub fn with_token(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.is_empty()).then_some(Self { token: Some(token) })
    }

    /// Resolve draft mode for a build. When `enabled`, the token is read
    /// from the environment variable `token_env`.
    pub fn from_env(enabled: bool, token_env: &str) -> Result<Self, LoadError> {
        if !enabled {
            return Ok(Self::disabled());
        }
        std::env::var(token_env)
            .ok()
            .and_then(Self::with_token)
            .ok_or_else(|| LoadError::MissingToken(token_env.to_string()))
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// The read token, or an empty string outside draft mode.
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    fn client(&self, factory: &dyn ClientFactory) -> Result<Box<dyn ContentSource>, LoadError> {
        factory
            .client(self.token.as_deref())
            .map_err(LoadError::Client)
    }
}

/// Everything the index page needs. Built once per load, immutable after.
///
/// Serialized into `props.json` as `{posts, settings, draftMode}`. The token
/// stays in memory and is never written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRenderContext {
    pub posts: Vec<Post>,
    pub settings: Settings,
    draft_mode: bool,
    #[serde(skip)]
    token: String,
}

impl PageRenderContext {
    pub fn new(posts: Vec<Post>, settings: Settings, draft: &DraftMode) -> Self {
        Self {
            posts,
            settings,
            draft_mode: draft.is_enabled(),
            token: draft.token().to_string(),
        }
    }

    pub fn draft_mode(&self) -> bool {
        self.draft_mode
    }

    /// Empty unless draft mode is on (and always empty after a reload from disk).
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// The index context plus one entry per post page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProps {
    pub index: PageRenderContext,
    pub post_pages: Vec<PostAndMore>,
}

/// Load the index page data.
///
/// Settings and posts are fetched concurrently; both must complete. A
/// posts fetch with no result yields an empty list. A failed settings fetch
/// fails the load.
pub fn load_index(
    factory: &dyn ClientFactory,
    draft: &DraftMode,
) -> Result<PageRenderContext, LoadError> {
    let client = draft.client(factory)?;
    index_from(client.as_ref(), draft)
}

fn index_from(client: &dyn ContentSource, draft: &DraftMode) -> Result<PageRenderContext, LoadError> {
    let (settings, posts) = rayon::join(|| client.settings(), || client.all_posts());
    let settings = settings.map_err(LoadError::Settings)?;
    let posts = posts.map_err(LoadError::Posts)?.unwrap_or_default();
    tracing::info!(
        posts = posts.len(),
        draft = draft.is_enabled(),
        "loaded index content"
    );
    Ok(PageRenderContext::new(posts, settings, draft))
}

/// Load the index plus every post page, `more` stories per post.
///
/// Post pages are fetched in parallel. A slug listed by the backend whose
/// post cannot be fetched fails the load.
pub fn load_site(
    factory: &dyn ClientFactory,
    draft: &DraftMode,
    more: usize,
) -> Result<SiteProps, LoadError> {
    let client = draft.client(factory)?;
    let client = client.as_ref();

    let (index, slugs) = rayon::join(|| index_from(client, draft), || client.all_post_slugs());
    let index = index?;
    let slugs = slugs.map_err(LoadError::Posts)?;

    let mut post_pages = slugs
        .par_iter()
        .map(|slug| {
            client
                .post_and_more_stories(slug, more)
                .map_err(LoadError::Posts)?
                .ok_or_else(|| LoadError::PostNotFound(slug.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    // Same order as the index.
    post_pages.sort_by_key(|page| {
        index
            .posts
            .iter()
            .position(|p| p.slug == page.post.slug)
            .unwrap_or(usize::MAX)
    });
    tracing::info!(pages = post_pages.len(), "loaded post pages");

    Ok(SiteProps { index, post_pages })
}
