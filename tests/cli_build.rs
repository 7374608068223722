//! End-to-end runs of the `simple-blog` binary against the fixture export.
//!
//! Run with: `cargo test --test cli_build`

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TOKEN_ENV: &str = "CONTENT_READ_TOKEN";

fn fixture_export() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/export")
}

/// A `simple-blog` command rooted in `work`, with no read token in scope.
fn blog(work: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_simple-blog"));
    cmd.env_remove(TOKEN_ENV)
        .env_remove("RUST_LOG")
        .arg("--site")
        .arg(work)
        .arg("--output")
        .arg(work.join("dist"))
        .arg("--temp-dir")
        .arg(work.join("temp"))
        .arg("--export-dir")
        .arg(fixture_export());
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run simple-blog")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn read(path: PathBuf) -> String {
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[test]
fn live_build_renders_published_posts() {
    let work = TempDir::new().unwrap();
    let out = run(blog(work.path()).arg("build"));
    assert!(out.status.success(), "build failed: {}", stderr(&out));

    let index = read(work.path().join("dist/index.html"));
    assert!(index.contains(">Fixture Blog</h1>"));
    assert!(index.contains("Third Post"));
    assert!(index.contains("Hello World"));
    assert!(!index.contains("Hello World (edited)"));
    assert!(!index.contains("Unreleased"));
    assert!(!index.contains(r#"class="draft-banner"#));
    assert!(!index.contains("data-draft-mode"));

    assert!(work.path().join("dist/posts/hello-world/index.html").exists());
    assert!(!work.path().join("dist/posts/unreleased").exists());
    assert!(work.path().join("temp/props.json").exists());

    let printed = stdout(&out);
    assert!(printed.contains("Fetched 3 posts (live)"));
    assert!(printed.contains("Generated 1 index, 3 post pages (live)"));
}

#[test]
fn draft_build_shows_unpublished_content() {
    let work = TempDir::new().unwrap();
    let out = run(blog(work.path()).env(TOKEN_ENV, "preview-secret").args(["build", "--draft"]));
    assert!(out.status.success(), "build failed: {}", stderr(&out));

    let index = read(work.path().join("dist/index.html"));
    assert!(index.contains(r#"class="draft-banner"#));
    assert!(index.contains("Unreleased"));
    assert!(index.contains("Hello World (edited)"));
    assert!(!index.contains("preview-secret"));

    let props = read(work.path().join("temp/props.json"));
    assert!(props.contains(r#""draftMode": true"#));
    assert!(!props.contains("preview-secret"));

    let post = read(work.path().join("dist/posts/unreleased/index.html"));
    assert!(post.contains(r#"class="draft-banner"#));
}

#[test]
fn draft_without_token_fails() {
    let work = TempDir::new().unwrap();
    let out = run(blog(work.path()).args(["build", "--draft"]));
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Draft mode requires a read token in $CONTENT_READ_TOKEN"));
    assert!(!work.path().join("dist/index.html").exists());
}

#[test]
fn fetch_then_generate_matches_build() {
    let staged = TempDir::new().unwrap();
    let out = run(blog(staged.path()).arg("fetch"));
    assert!(out.status.success(), "fetch failed: {}", stderr(&out));
    let out = run(blog(staged.path()).arg("generate"));
    assert!(out.status.success(), "generate failed: {}", stderr(&out));

    let built = TempDir::new().unwrap();
    let out = run(blog(built.path()).arg("build"));
    assert!(out.status.success(), "build failed: {}", stderr(&out));

    assert_eq!(
        read(staged.path().join("dist/index.html")),
        read(built.path().join("dist/index.html"))
    );
}

#[test]
fn config_changes_posts_path() {
    let work = TempDir::new().unwrap();
    std::fs::write(work.path().join("config.toml"), "[site]\nposts_path = \"blog\"\n").unwrap();
    let out = run(blog(work.path()).arg("build"));
    assert!(out.status.success(), "build failed: {}", stderr(&out));

    assert!(work.path().join("dist/blog/second-post/index.html").exists());
    let index = read(work.path().join("dist/index.html"));
    assert!(index.contains(r#"href="/blog/second-post/""#));
}

#[test]
fn invalid_config_is_reported() {
    let work = TempDir::new().unwrap();
    std::fs::write(work.path().join("config.toml"), "[site]\nunknown_key = 1\n").unwrap();
    let out = run(blog(work.path()).arg("build"));
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("Error:"));
}

#[test]
fn header_level_one() {
    let work = TempDir::new().unwrap();
    let out = run(blog(work.path()).args([
        "header",
        "--title",
        "My Blog",
        "--description",
        "Hello world",
        "--level",
        "1",
    ]));
    assert!(out.status.success(), "header failed: {}", stderr(&out));
    let html = stdout(&out);
    assert!(html.contains(">My Blog</h1>"));
    assert!(html.contains("<p>Hello world</p>"));
}

#[test]
fn header_level_two_links_home() {
    let work = TempDir::new().unwrap();
    let out = run(blog(work.path()).args(["header", "--title", "My Blog", "--level", "2"]));
    assert!(out.status.success(), "header failed: {}", stderr(&out));
    assert!(stdout(&out).contains(r#"<a href="/" class="hover:underline">My Blog</a>"#));
}

#[test]
fn header_rejects_other_levels() {
    let work = TempDir::new().unwrap();
    let out = run(blog(work.path()).args(["header", "--title", "X", "--level", "3"]));
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Invalid level: 3, only 1 or 2 are allowed"));

    let out = run(blog(work.path()).args(["header", "--title", "X", "--level", "big"]));
    assert!(!out.status.success());
    assert!(stderr(&out).contains(r#"Invalid level: "big", only 1 or 2 are allowed"#));
}

#[test]
fn gen_config_prints_stock_config() {
    let work = TempDir::new().unwrap();
    let out = run(blog(work.path()).arg("gen-config"));
    assert!(out.status.success());
    let toml = stdout(&out);
    assert!(toml.contains("[api]"));
    assert!(toml.contains("[site]"));
}

#[test]
fn log_level_follows_rust_log() {
    let work = TempDir::new().unwrap();
    let out = run(blog(work.path()).arg("fetch"));
    assert!(out.status.success(), "fetch failed: {}", stderr(&out));
    assert!(stderr(&out).contains("loaded index content"));

    let quiet = TempDir::new().unwrap();
    let out = run(blog(quiet.path()).env("RUST_LOG", "warn").arg("fetch"));
    assert!(out.status.success(), "fetch failed: {}", stderr(&out));
    assert!(!stderr(&out).contains("loaded index content"));
}
