use clap::{Parser, Subcommand};
use serde_json::Value;
use simple_blog::config::{self, SiteConfig};
use simple_blog::content::{ApiFactory, ClientFactory, ExportFactory};
use simple_blog::load::{self, DraftMode, SiteProps};
use simple_blog::{generate, header, output, rich_text};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Shared flags for commands that load content.
#[derive(clap::Args, Clone)]
struct DraftArgs {
    /// Fetch and render unpublished drafts. Reads the token from the
    /// variable named by `api.token_env`.
    #[arg(long)]
    draft: bool,
}

#[derive(Parser)]
#[command(name = "simple-blog")]
#[command(about = "Static blog generator backed by a headless content API")]
#[command(long_about = "\
Static blog generator backed by a headless content API

Settings and posts are fetched from the content API (or a local JSON export)
and rendered to a static site: an index page with a hero post and more
stories, plus one page per post.

Site layout:

  config.toml                      # API, site, and color options
  dist/                            # Generated site
  ├── index.html
  └── posts/<slug>/index.html

Export layout (--export-dir):

  export/
  ├── settings.json
  ├── posts/<slug>.json            # Published posts
  └── drafts/<slug>.json           # Overlays posts/ in draft mode

Draft mode (--draft) fetches unpublished content with a read token and marks
every page with a preview banner.

Run 'simple-blog gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    site: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (props.json)
    #[arg(long, default_value = ".simple-blog-temp", global = true)]
    temp_dir: PathBuf,

    /// Read content from a local JSON export instead of the API
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch settings and posts into props.json
    Fetch(DraftArgs),
    /// Render the site from props.json
    Generate,
    /// Run the full pipeline: fetch → generate
    Build(DraftArgs),
    /// Render a single blog header to stdout
    Header {
        /// Site title
        #[arg(long)]
        title: String,
        /// Plain-text description (shown at level 1)
        #[arg(long)]
        description: Option<String>,
        /// Heading level, 1 or 2
        #[arg(long)]
        level: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let props_path = cli.temp_dir.join("props.json");

    match cli.command {
        Command::Fetch(ref draft_args) => {
            let site_config = config::load_config(&cli.site)?;
            let props = fetch(&cli, &site_config, draft_args)?;
            write_props(&props, &props_path)?;
            output::print_fetch_output(&props);
        }
        Command::Generate => {
            let site_config = config::load_config(&cli.site)?;
            let props = generate::read_props(&props_path)?;
            let report = generate::generate(&props, &site_config, &cli.output)?;
            output::print_generate_output(&report);
        }
        Command::Build(ref draft_args) => {
            let site_config = config::load_config(&cli.site)?;

            println!("==> Stage 1: Fetching content");
            let props = fetch(&cli, &site_config, draft_args)?;
            write_props(&props, &props_path)?;
            output::print_fetch_output(&props);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report = generate::generate(&props, &site_config, &cli.output)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Header {
            ref title,
            ref description,
            ref level,
        } => {
            // Numbers arrive as JSON; anything else is passed through as a string
            // so the error names it.
            let level = serde_json::from_str::<Value>(level)
                .unwrap_or_else(|_| Value::String(level.clone()));
            let description = description.as_deref().map(rich_text::paragraph);
            let markup = header::render_header_checked(title, description.as_deref(), &level)?;
            println!("{}", markup.into_string());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn fetch(
    cli: &Cli,
    site_config: &SiteConfig,
    draft_args: &DraftArgs,
) -> Result<SiteProps, Box<dyn std::error::Error>> {
    let draft = DraftMode::from_env(draft_args.draft, &site_config.api.token_env)?;
    let factory = client_factory(cli.export_dir.as_deref(), site_config);
    Ok(load::load_site(
        factory.as_ref(),
        &draft,
        site_config.site.more_stories,
    )?)
}

fn client_factory(export_dir: Option<&Path>, site_config: &SiteConfig) -> Box<dyn ClientFactory> {
    match export_dir {
        Some(dir) => Box::new(ExportFactory::new(dir)),
        None => Box::new(ApiFactory::new(site_config.api.clone())),
    }
}

fn write_props(props: &SiteProps, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(props)?)?;
    tracing::debug!(path = %path.display(), "wrote props");
    Ok(())
}
