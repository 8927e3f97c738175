//! Command-line interface for post-view.
//!
//! `scan` lists the quote blocks found in a cooked post; `expand` runs one
//! block through the expand cycle against a content store and prints the
//! resulting post markup.

use crate::quote::{
    ApplyOutcome, LogReporter, QuoteController, ToggleOutcome, TopicRef, ViewContext,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use post_view_config::Config;
use post_view_content::{ContentStore, HttpContentStore, MemoryContentStore, TopicId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// post-view - Quote expansion for rendered forum posts
#[derive(Parser)]
#[command(name = "post-view")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ~/.config/post-view/config.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Topic the post is viewed in
#[derive(Debug, Clone, clap::Args)]
pub struct TopicArgs {
    /// Id of the topic being viewed
    #[arg(long, value_name = "ID")]
    pub topic: Option<u64>,

    /// Slug of the topic being viewed
    #[arg(long, value_name = "SLUG", default_value = "topic")]
    pub slug: String,
}

impl TopicArgs {
    fn context(&self) -> ViewContext {
        match self.topic {
            Some(id) => ViewContext::in_topic(TopicRef::new(TopicId(id), self.slug.clone())),
            None => ViewContext {
                topic: None,
                post_topic_id: TopicId(0),
            },
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the quote blocks in a cooked post and where their headers link
    Scan {
        /// Cooked post HTML
        file: PathBuf,

        #[command(flatten)]
        topic: TopicArgs,
    },

    /// Expand one quote block and print the resulting post HTML
    Expand {
        /// Cooked post HTML
        file: PathBuf,

        /// Index of the block to expand (as listed by `scan`)
        #[arg(long, value_name = "N")]
        block: usize,

        /// Serve quoted posts from `<DIR>/<topic>/<post>.html` instead of HTTP
        #[arg(long, value_name = "DIR")]
        posts: Option<PathBuf>,

        #[command(flatten)]
        topic: TopicArgs,
    },
}

/// Load the config named on the command line, or the default one.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load(),
    }
}

/// Run a parsed command, writing its output to stdout.
pub fn run(command: Commands, config: Config, runtime: &Runtime) -> Result<()> {
    let config = Arc::new(config);
    match command {
        Commands::Scan { file, topic } => {
            let html = read_post(&file)?;
            print!("{}", scan_report(&html, topic.context(), &config));
            Ok(())
        }
        Commands::Expand {
            file,
            block,
            posts,
            topic,
        } => {
            let html = read_post(&file)?;
            let context = topic.context();
            let output = match posts {
                Some(dir) => {
                    let store = MemoryContentStore::new();
                    let loaded = store
                        .load_dir(&dir)
                        .with_context(|| format!("Failed to read posts from {}", dir.display()))?;
                    log::info!("Loaded {} posts from {:?}", loaded, dir);
                    runtime.block_on(expand_block(Arc::new(store), config, context, &html, block))?
                }
                None => {
                    let store = HttpContentStore::new(&config.content)?;
                    runtime.block_on(expand_block(Arc::new(store), config, context, &html, block))?
                }
            };
            println!("{output}");
            Ok(())
        }
    }
}

fn read_post(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// One line per quote block: index, referenced post, topic, kind and link.
pub fn scan_report(html: &str, context: ViewContext, config: &Arc<Config>) -> String {
    let mut controller = QuoteController::new(
        Arc::new(MemoryContentStore::new()),
        Arc::new(LogReporter),
        Arc::clone(config),
        context,
    );
    controller.replace_content(html);

    let mut report = String::new();
    for block in controller.blocks() {
        let post = block
            .referenced_post_number()
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let topic = block
            .referenced_topic_id()
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        let kind = if block.is_full_quote() {
            "full"
        } else {
            "excerpt"
        };
        let link = controller
            .nav_link(block.id())
            .ok()
            .flatten()
            .map_or_else(|| "-".to_string(), |l| l.href().to_string());
        report.push_str(&format!(
            "{}\tpost={}\ttopic={}\t{}\tlink={}\n",
            block.id().index(),
            post,
            topic,
            kind,
            link
        ));
    }
    report
}

/// Expand block `index` of `html` and return the post markup once the
/// fetch has settled.
pub async fn expand_block<S: ContentStore>(
    store: Arc<S>,
    config: Arc<Config>,
    context: ViewContext,
    html: &str,
    index: usize,
) -> Result<String> {
    let mut controller = QuoteController::new(store, Arc::new(LogReporter), config, context);
    let ids = controller.replace_content(html);
    let Some(&id) = ids.get(index) else {
        bail!("Block {} not found ({} quote blocks)", index, ids.len());
    };
    controller.attach_all();

    if controller.toggle(id)? != ToggleOutcome::Expanding {
        bail!("Block {} cannot be expanded", index);
    }
    match controller.settle_next().await {
        Some(ApplyOutcome::Expanded { highlighted }) => {
            if !highlighted {
                log::warn!("Excerpt of block {} not found in quoted post", index);
            }
            Ok(controller.render())
        }
        Some(ApplyOutcome::Failed) => bail!("Failed to load the quoted post for block {}", index),
        Some(ApplyOutcome::Stale) | None => bail!("Fetch for block {} was abandoned", index),
    }
}
