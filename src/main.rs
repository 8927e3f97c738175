use anyhow::Result;
use clap::Parser;
use post_view::cli::{self, Cli};
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    let args = Cli::parse();

    // Route log records to /tmp/post_view_debug.log.
    // CLI --log-level takes precedence, then RUST_LOG, then config (applied below).
    post_view::debug::init_log_bridge(args.log_level.map(|l| l.to_level_filter()));

    log::info!("Starting post-view {}", post_view::VERSION);

    let config = cli::load_config(args.config.as_deref())?;
    post_view::debug::apply_config_level(config.log_level.to_level_filter());

    // Runtime for content store fetches
    let runtime = Runtime::new()?;
    let result = cli::run(args.command, config, &runtime);

    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    if let Err(ref e) = result {
        eprintln!("post-view: error: {e:#}");
    }
    result
}
