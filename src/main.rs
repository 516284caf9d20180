//! `tvthek` CLI - walk the TVthek catalog from a terminal

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tvthek::{ApiMode, Page, PageId, ParserConfig, TvthekParser, WebParser};

#[derive(Parser)]
#[command(name = "tvthek")]
#[command(about = "Browse the ORF TVthek catalog: letters, programs, episodes and videos")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/tvthek/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the upstream API generation
    #[arg(short, long, global = true, value_enum)]
    mode: Option<Mode>,

    /// Print pages as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Service,
    Html,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the index and show how many programs each letter holds
    Letters,

    /// List the programs filed under one letter (0, a-z)
    Bucket {
        /// Bucket key
        key: char,
    },

    /// List the episodes of a program
    List {
        /// Program locator (episode listing URL)
        uri: String,
    },

    /// Resolve the playable videos of an episode
    Videos {
        /// Episode locator
        uri: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let mut config = match &cli.config {
        Some(path) => ParserConfig::load_from(path)?,
        None => ParserConfig::load()?,
    };
    if let Some(mode) = cli.mode {
        config.mode = match mode {
            Mode::Service => ApiMode::Service,
            Mode::Html => ApiMode::Html,
        };
    }

    let parser = TvthekParser::from_config(&config)?;
    parser.protocols().add_protocol(&config.protocols);

    match cli.command {
        Commands::Letters => cmd_letters(&parser, cli.json).await,
        Commands::Bucket { key } => cmd_bucket(&parser, key, cli.json).await,
        Commands::List { uri } => cmd_expand(&parser, &uri, cli.json).await,
        Commands::Videos { uri } => cmd_expand(&parser, &uri, cli.json).await,
    }
}

async fn cmd_letters(parser: &TvthekParser, json: bool) -> Result<()> {
    let root = parser.root().await?;
    let buckets = parser.children(root).await.unwrap_or_default();

    let mut counts = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let title = parser.page(bucket).await.map(|p| p.title).unwrap_or_default();
        let count = parser.children(bucket).await.map_or(0, |c| c.len());
        counts.push((title, count));
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = counts
            .into_iter()
            .map(|(title, count)| (title, count.into()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (title, count) in counts {
            println!("{title:>2}  {count}");
        }
    }
    Ok(())
}

async fn cmd_bucket(parser: &TvthekParser, key: char, json: bool) -> Result<()> {
    let key = key.to_ascii_lowercase();
    let bucket = parser
        .bucket(key)
        .with_context(|| format!("no bucket {key:?}, use 0 or a-z"))?;

    parser.root().await?;
    parser.parse(bucket).await?;
    print_children(parser, bucket, json).await
}

async fn cmd_expand(parser: &TvthekParser, uri: &str, json: bool) -> Result<()> {
    let id = parser.open(Page::overview(uri, uri)).await;
    parser.parse(id).await?;
    print_children(parser, id, json).await
}

async fn print_children(parser: &TvthekParser, id: PageId, json: bool) -> Result<()> {
    let node = parser
        .snapshot(id)
        .await
        .context("page vanished while printing")?;

    if json {
        let pages: Vec<&Page> = node.children.iter().map(|c| &c.page).collect();
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    println!("📂 {}", node.page.title);
    for child in &node.children {
        let page = &child.page;
        match page.video_details() {
            Some(video) => {
                println!(
                    "  🎬 {} ({}:{:02})",
                    page.title,
                    video.duration / 60,
                    video.duration % 60
                );
                println!("     {}", video.video_uri);
            }
            None => {
                println!("  📁 {} [{}]", page.title, child.children.len());
                println!("     {}", page.uri);
            }
        }
    }
    Ok(())
}
