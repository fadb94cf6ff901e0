//! # reelhousectl
//!
//! Operator CLI over `reelhouse-core`: apply migrations, submit a film from
//! local files, moderate it, and inspect catalogue, watch progress and saved
//! lists for a user.
//!
//! Configuration comes from the environment (and `.env`), see
//! `reelhouse_core::config::Config`.

mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use reelhouse_core::config::Config;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, DbCommand};
use crate::commands::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    for problem in config.validate() {
        debug!(%problem, "configuration incomplete");
    }

    match cli.command {
        Command::Db(DbCommand::Migrate) => commands::migrate(&config).await,
        Command::ImageUrl { asset_id, variant } => {
            commands::image_url(&config, &asset_id, variant)
        }
        command => {
            let ctx = AppContext::connect(config).await?;
            run(&ctx, command).await
        }
    }
}

async fn run(ctx: &AppContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Submit(args) => commands::submit(ctx, args).await,
        Command::List { category } => commands::list(ctx, category.as_deref()).await,
        Command::Shelves => commands::shelves(ctx).await,
        Command::Search { query } => commands::search(ctx, &query).await,
        Command::Moderate { content_id, status } => {
            commands::moderate(ctx, content_id, status).await
        }
        Command::Progress(args) => commands::progress(ctx, args).await,
        Command::ContinueWatching(args) => commands::continue_watching(ctx, args).await,
        Command::History(args) => commands::history(ctx, args).await,
        Command::MyList(command) => commands::my_list(ctx, command).await,
        Command::Db(_) | Command::ImageUrl { .. } => Ok(()),
    }
}
