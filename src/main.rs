mod cli;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, InitOptions, RefreshOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dir_context=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("cannot open project root {}", cli.root.display()))?;

    match cli.command {
        Commands::Init {
            mode,
            no_git,
            ai,
            ignore,
        } => {
            cli::init(
                &root,
                InitOptions {
                    mode,
                    no_git,
                    ai,
                    ignore,
                },
            )
            .await?;
        }
        Commands::Refresh {
            path,
            all,
            dry_run,
            watch,
        } => {
            cli::refresh(
                &root,
                RefreshOptions {
                    path,
                    all,
                    dry_run,
                    watch,
                },
            )
            .await?;
        }
        Commands::Context { view, path, output } => {
            cli::context(&root, view, path.as_deref(), output.as_deref())?;
        }
    }

    Ok(())
}
