use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;

use timeline_pager::{
    app::App,
    infrastructure::{
        cli::Cli, config::Config, loader::TimelineLoader, source::InMemorySource,
    },
    utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    let config = Config::new()?.with_page_size(args.page_size)?;

    let source = InMemorySource::generate(config.source.message_count, config.source.reply_every)
        .with_latency(Duration::from_millis(config.source.latency_ms));
    let loader = TimelineLoader::new(source, config.page_size);

    let mut app = App::new(loader, std::io::stdout(), args.compact);
    app.run(&args.command).await
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
