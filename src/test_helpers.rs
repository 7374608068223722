//! Shared test utilities for the simple-blog test suite.
//!
//! Provides content fixtures, sample records, and a stub content backend
//! that records how it was used.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_export();
//! let source = ExportDir::new(tmp.path(), false);
//! let posts = source.all_posts().unwrap().unwrap();
//! assert_eq!(post_slugs(&posts), vec!["third-post", "second-post", "hello-world"]);
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::content::{ClientFactory, ContentError, ContentSource};
use crate::rich_text::paragraph;
use crate::types::{Post, PostAndMore, Settings};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/export/` to a temp directory and return it.
pub fn setup_export() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/export");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Sample records
// =========================================================================

pub fn sample_post(slug: &str, title: &str, date: Option<&str>) -> Post {
    Post {
        id: format!("post-{slug}"),
        title: title.to_string(),
        slug: slug.to_string(),
        excerpt: Some(format!("About {title}")),
        date: date.map(str::to_string),
        cover_image: None,
        author: None,
        content: paragraph(&format!("Body of {title}")),
    }
}

pub fn sample_settings() -> Settings {
    Settings {
        title: "My Blog".to_string(),
        description: paragraph("Hello world"),
        og_image: None,
    }
}

/// Post slugs in order.
pub fn post_slugs(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.slug.as_str()).collect()
}

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(posts: &'a [Post], slug: &str) -> &'a Post {
    posts.iter().find(|p| p.slug == slug).unwrap_or_else(|| {
        panic!("post '{slug}' not found. Available: {:?}", post_slugs(posts))
    })
}

// =========================================================================
// Stub backend
// =========================================================================

#[derive(Default)]
struct StubState {
    settings: Settings,
    posts: Option<Vec<Post>>,
    slugs: Option<Vec<String>>,
    fail_settings: bool,
    tokens: Mutex<Vec<Option<String>>>,
    settings_calls: AtomicUsize,
    posts_calls: AtomicUsize,
}

/// In-memory backend that counts fetches and records the tokens it was
/// asked to authenticate with.
pub struct StubFactory {
    state: Arc<StubState>,
}

impl StubFactory {
    pub fn new(settings: Settings, posts: Option<Vec<Post>>) -> Self {
        Self {
            state: Arc::new(StubState {
                settings,
                posts,
                ..StubState::default()
            }),
        }
    }

    pub fn failing_settings() -> Self {
        Self {
            state: Arc::new(StubState {
                fail_settings: true,
                ..StubState::default()
            }),
        }
    }

    /// Override the slugs reported by `all_post_slugs`.
    pub fn with_slugs(self, slugs: &[&str]) -> Self {
        let mut state = Arc::try_unwrap(self.state)
            .unwrap_or_else(|_| panic!("stub already handed out clients"));
        state.slugs = Some(slugs.iter().map(|s| s.to_string()).collect());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn tokens(&self) -> Vec<Option<String>> {
        self.state.tokens.lock().unwrap().clone()
    }

    pub fn settings_calls(&self) -> usize {
        self.state.settings_calls.load(Ordering::SeqCst)
    }

    pub fn posts_calls(&self) -> usize {
        self.state.posts_calls.load(Ordering::SeqCst)
    }
}

impl ClientFactory for StubFactory {
    fn client(&self, token: Option<&str>) -> Result<Box<dyn ContentSource>, ContentError> {
        self.state
            .tokens
            .lock()
            .unwrap()
            .push(token.map(str::to_string));
        Ok(Box::new(StubClient {
            state: Arc::clone(&self.state),
        }))
    }
}

struct StubClient {
    state: Arc<StubState>,
}

impl ContentSource for StubClient {
    fn settings(&self) -> Result<Settings, ContentError> {
        self.state.settings_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_settings {
            return Err(ContentError::Io(std::io::Error::other("settings unavailable")));
        }
        Ok(self.state.settings.clone())
    }

    fn all_posts(&self) -> Result<Option<Vec<Post>>, ContentError> {
        self.state.posts_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.posts.clone())
    }

    fn post_and_more_stories(
        &self,
        slug: &str,
        more: usize,
    ) -> Result<Option<PostAndMore>, ContentError> {
        let posts = self.state.posts.clone().unwrap_or_default();
        let Some(post) = posts.iter().find(|p| p.slug == slug).cloned() else {
            return Ok(None);
        };
        let more_posts = posts.into_iter().filter(|p| p.slug != slug).take(more).collect();
        Ok(Some(PostAndMore { post, more_posts }))
    }

    fn all_post_slugs(&self) -> Result<Vec<String>, ContentError> {
        Ok(match &self.state.slugs {
            Some(slugs) => slugs.clone(),
            None => self
                .state
                .posts
                .iter()
                .flatten()
                .map(|p| p.slug.clone())
                .collect(),
        })
    }
}

/// A factory whose clients cannot be built.
pub struct FailingFactory;

impl ClientFactory for FailingFactory {
    fn client(&self, _token: Option<&str>) -> Result<Box<dyn ContentSource>, ContentError> {
        Err(ContentError::NotConfigured("api.project_id"))
    }
}
