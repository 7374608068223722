//! # Simple Blog
//!
//! A static blog generator backed by a headless content API. Site settings
//! and posts live in a hosted dataset (or a local JSON export of one); this
//! crate fetches them and renders a plain HTML site: an index page with a
//! hero post and more stories, plus one page per post.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Fetch     API / export  →  props.json   (content → frozen page data)
//! 2. Generate  props.json    →  dist/        (final HTML site)
//! ```
//!
//! `props.json` is human-readable, so a fetch can be inspected before
//! anything is rendered, and generation never touches the network.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Content backends: the HTTP query API and local JSON exports |
//! | [`load`] | Stage 1: concurrent settings + posts fetch into a [`load::PageRenderContext`] |
//! | [`generate`] | Stage 2: writes the index and post pages from `props.json` |
//! | [`page`] | Page templates and the live/preview [`page::PageSelector`] |
//! | [`header`] | The two blog header shapes and heading level validation |
//! | [`rich_text`] | Rich-text block model and its HTML rendering |
//! | [`types`] | Content records shared between stages (`Post`, `Settings`) |
//! | [`config`] | `config.toml` loading, validation, and color CSS generation |
//! | [`output`] | CLI output formatting for both stages |
//!
//! # Design Decisions
//!
//! ## Draft Mode Is a Value
//!
//! Whether drafts are shown is decided once, when the build starts, and
//! carried as a [`load::DraftMode`]. It picks the client (a read token means
//! an authenticated client that sees unpublished documents) and travels with
//! the loaded context so [`page::PageSelector`] can pick the preview
//! renderer. The token itself never leaves memory: it is skipped when the
//! context is serialized and never rendered.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Templates are
//! plain Rust functions, interpolation is escaped by default, and there is
//! no template directory to ship.
//!
//! ## Closed Heading Levels
//!
//! [`header::HeadingLevel`] only has the two levels the header supports, so
//! typed callers cannot ask for a third. Untyped input is validated at the
//! boundary with [`header::HeadingLevel::from_value`].

pub mod config;
pub mod content;
pub mod generate;
pub mod header;
pub mod load;
pub mod output;
pub mod page;
pub mod rich_text;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
