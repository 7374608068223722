//! Content sources.
//!
//! Posts and settings come from a headless content backend. Two backends
//! implement [`ContentSource`]:
//!
//! - [`ApiClient`]: the HTTP query API. Queries are sent as URL parameters
//!   and answered with `{ "result": ... }`.
//! - [`ExportDir`]: a local directory holding the same projections as JSON
//!   files, used for offline builds and tests.
//!
//! ## Export Directory Layout
//!
//! ```text
//! export/
//! ├── settings.json        # Settings document (optional)
//! ├── posts/               # Published posts, one file each
//! │   ├── hello-world.json
//! │   └── second-post.json
//! └── drafts/              # Unpublished edits, read only in draft mode
//!     └── hello-world.json # Replaces the published post with the same slug
//! ```
//!
//! ## Authentication
//!
//! A [`ClientFactory`] hands out a client with or without a read token. With
//! a token the API client bypasses the CDN and asks for the draft
//! perspective; the export directory starts reading `drafts/`.

use crate::config::ApiConfig;
use crate::types::{Post, PostAndMore, Settings};
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid API URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("Content API not configured: {0} is empty")]
    NotConfigured(&'static str),
    #[error("Invalid document {0}: {1}")]
    InvalidDocument(PathBuf, serde_json::Error),
}

/// Read access to blog content.
pub trait ContentSource: Send + Sync {
    /// The settings document, or defaults when the backend has none.
    fn settings(&self) -> Result<Settings, ContentError>;

    /// All posts, newest first. `None` when the backend returned no result.
    fn all_posts(&self) -> Result<Option<Vec<Post>>, ContentError>;

    /// A post by slug plus the newest other posts (at most `more`).
    fn post_and_more_stories(
        &self,
        slug: &str,
        more: usize,
    ) -> Result<Option<PostAndMore>, ContentError>;

    /// Slugs of every post.
    fn all_post_slugs(&self) -> Result<Vec<String>, ContentError>;
}

/// Hands out clients, authenticated when a token is given.
pub trait ClientFactory: Send + Sync {
    fn client(&self, token: Option<&str>) -> Result<Box<dyn ContentSource>, ContentError>;
}

// ============================================================================
// Queries
// ============================================================================

const POST_FIELDS: &str = r#"
  _id,
  "title": coalesce(title, "Untitled"),
  "slug": slug.current,
  excerpt,
  "coverImage": coverImage{"url": asset->url, alt},
  "date": coalesce(date, _updatedAt),
  "author": author->{"name": coalesce(name, "Anonymous"), "picture": picture{"url": asset->url, alt}},
"#;

const SETTINGS_QUERY: &str =
    r#"*[_type == "settings"][0]{title, description, "ogImage": ogImage{title}}"#;

fn index_query() -> String {
    format!(
        r#"*[_type == "post" && defined(slug.current)] | order(date desc, _updatedAt desc) {{{POST_FIELDS}}}"#
    )
}

fn post_and_more_stories_query() -> String {
    format!(
        r#"{{
  "post": *[_type == "post" && slug.current == $slug] | order(_updatedAt desc) [0] {{
    content,
    {POST_FIELDS}
  }},
  "morePosts": *[_type == "post" && defined(slug.current) && slug.current != $slug] | order(date desc, _updatedAt desc) [0...$more] {{
    content,
    {POST_FIELDS}
  }}
}}"#
    )
}

const POST_SLUGS_QUERY: &str = r#"*[_type == "post" && defined(slug.current)][].slug.current"#;

// ============================================================================
// HTTP API
// ============================================================================

#[derive(Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPostAndMore {
    post: Option<Post>,
    #[serde(default)]
    more_posts: Option<Vec<Post>>,
}

/// Blocking client for the HTTP query API.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    endpoint: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, token: Option<&str>) -> Result<Self, ContentError> {
        if config.project_id.is_empty() {
            return Err(ContentError::NotConfigured("api.project_id"));
        }
        let token = token.filter(|t| !t.is_empty()).map(str::to_string);
        let endpoint = query_endpoint(config, token.is_some())?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Full request URL for a query. Parameters are JSON-encoded as `$name`.
    pub fn query_url(&self, query: &str, params: &[(&str, serde_json::Value)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
            if self.token.is_some() {
                pairs.append_pair("perspective", "previewDrafts");
            }
        }
        url
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, serde_json::Value)],
    ) -> Result<Option<T>, ContentError> {
        let url = self.query_url(query, params);
        tracing::debug!(
            host = url.host_str().unwrap_or_default(),
            authenticated = self.is_authenticated(),
            "querying content API"
        );
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let body = request.send()?.error_for_status()?.text()?;
        let response: QueryResponse<T> = serde_json::from_str(&body)?;
        Ok(response.result)
    }
}

/// `https://<project>.<api|apicdn>.<host>/v<version>/data/query/<dataset>`
fn query_endpoint(config: &ApiConfig, authenticated: bool) -> Result<Url, ContentError> {
    let subdomain = if config.use_cdn && !authenticated {
        "apicdn"
    } else {
        "api"
    };
    let raw = format!(
        "https://{}.{}.{}/v{}/data/query/{}",
        config.project_id, subdomain, config.host, config.api_version, config.dataset
    );
    Url::parse(&raw).map_err(|e| ContentError::InvalidUrl(raw, e.to_string()))
}

impl ContentSource for ApiClient {
    fn settings(&self) -> Result<Settings, ContentError> {
        Ok(self.fetch(SETTINGS_QUERY, &[])?.unwrap_or_default())
    }

    fn all_posts(&self) -> Result<Option<Vec<Post>>, ContentError> {
        Ok(self.fetch(&index_query(), &[])?.map(routable))
    }

    fn post_and_more_stories(
        &self,
        slug: &str,
        more: usize,
    ) -> Result<Option<PostAndMore>, ContentError> {
        let raw: Option<RawPostAndMore> = self.fetch(
            &post_and_more_stories_query(),
            &[("slug", slug.into()), ("more", more.into())],
        )?;
        Ok(raw.and_then(|raw| {
            raw.post.map(|post| PostAndMore {
                post,
                more_posts: routable(raw.more_posts.unwrap_or_default()),
            })
        }))
    }

    fn all_post_slugs(&self) -> Result<Vec<String>, ContentError> {
        Ok(self.fetch(POST_SLUGS_QUERY, &[])?.unwrap_or_default())
    }
}

/// Builds [`ApiClient`]s from the `[api]` config section.
pub struct ApiFactory {
    config: ApiConfig,
}

impl ApiFactory {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for ApiFactory {
    fn client(&self, token: Option<&str>) -> Result<Box<dyn ContentSource>, ContentError> {
        Ok(Box::new(ApiClient::new(&self.config, token)?))
    }
}

// ============================================================================
// Export directory
// ============================================================================

/// Content read from a local export directory.
pub struct ExportDir {
    root: PathBuf,
    include_drafts: bool,
}

impl ExportDir {
    pub fn new(root: impl Into<PathBuf>, include_drafts: bool) -> Self {
        Self {
            root: root.into(),
            include_drafts,
        }
    }

    /// Published posts keyed by slug, with drafts layered on top.
    fn posts_by_slug(&self) -> Result<Option<BTreeMap<String, Post>>, ContentError> {
        let Some(published) = read_documents::<Post>(&self.root.join("posts"))? else {
            return Ok(None);
        };
        let mut posts: BTreeMap<String, Post> = routable(published)
            .into_iter()
            .map(|p| (p.slug.clone(), p))
            .collect();
        if self.include_drafts {
            let drafts = read_documents::<Post>(&self.root.join("drafts"))?.unwrap_or_default();
            for draft in routable(drafts) {
                posts.insert(draft.slug.clone(), draft);
            }
        }
        Ok(Some(posts))
    }
}

/// Drop posts without a slug; they have no page to link to.
fn routable(posts: Vec<Post>) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| {
            if !post.is_routable() {
                tracing::warn!(id = %post.id, title = %post.title, "skipping post without slug");
            }
            post.is_routable()
        })
        .collect()
}

/// Newest first; undated (or unparseable) posts last; ties by title.
fn compare_posts(a: &Post, b: &Post) -> Ordering {
    match (a.timestamp(), b.timestamp()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.title.cmp(&b.title))
}

/// Parse every `*.json` directly inside `dir`. `None` if `dir` does not exist.
fn read_documents<T: DeserializeOwned>(dir: &Path) -> Result<Option<Vec<T>>, ContentError> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut docs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "json") {
            continue;
        }
        let content = fs::read_to_string(path)?;
        let doc = serde_json::from_str(&content)
            .map_err(|e| ContentError::InvalidDocument(path.to_path_buf(), e))?;
        docs.push(doc);
    }
    Ok(Some(docs))
}

impl ContentSource for ExportDir {
    fn settings(&self) -> Result<Settings, ContentError> {
        let path = self.root.join("settings.json");
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| ContentError::InvalidDocument(path, e))
    }

    fn all_posts(&self) -> Result<Option<Vec<Post>>, ContentError> {
        Ok(self.posts_by_slug()?.map(|posts| {
            let mut posts: Vec<Post> = posts.into_values().collect();
            posts.sort_by(compare_posts);
            posts
        }))
    }

    fn post_and_more_stories(
        &self,
        slug: &str,
        more: usize,
    ) -> Result<Option<PostAndMore>, ContentError> {
        let posts = self.all_posts()?.unwrap_or_default();
        let Some(post) = posts.iter().find(|p| p.slug == slug).cloned() else {
            return Ok(None);
        };
        let more_posts = posts
            .into_iter()
            .filter(|p| p.slug != slug)
            .take(more)
            .collect();
        Ok(Some(PostAndMore { post, more_posts }))
    }

    fn all_post_slugs(&self) -> Result<Vec<String>, ContentError> {
        Ok(self
            .posts_by_slug()?
            .map(|posts| posts.into_keys().collect())
            .unwrap_or_default())
    }
}

/// Opens an [`ExportDir`]; a token switches on the draft overlay.
pub struct ExportFactory {
    root: PathBuf,
}

impl ExportFactory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ClientFactory for ExportFactory {
    fn client(&self, token: Option<&str>) -> Result<Box<dyn ContentSource>, ContentError> {
        let include_drafts = token.is_some_and(|t| !t.is_empty());
        Ok(Box::new(ExportDir::new(&self.root, include_drafts)))
    }
}
