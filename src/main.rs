use clap::ArgMatches;
use devto_deploy::changes::{ChangeSource, GitChangeSource, StaticChangeSource};
use devto_deploy::config::{app, Config};
use devto_deploy::deploy::deploy;
use devto_deploy::publish::{DevToClient, PublishClient};
use devto_deploy::report::ConsoleReporter;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let matches = app().get_matches();
    init_tracing(matches.occurrences_of("verbose"));

    if let Err(e) = run(&matches).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(matches: &ArgMatches<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_matches(matches, Config::token_from_env())?;

    let source: Box<dyn ChangeSource> = if config.files.is_empty() {
        Box::new(
            GitChangeSource::new(&config.root_directory)
                .with_revisions(config.head.as_str(), config.base.as_str()),
        )
    } else {
        Box::new(StaticChangeSource::new(config.files.clone()))
    };
    let client: Arc<dyn PublishClient> = Arc::new(DevToClient::new(
        config.endpoint.clone(),
        config.token.clone(),
    ));

    let summary = deploy(&config, source.as_ref(), client, &ConsoleReporter).await?;
    info!(%summary, "deploy finished");
    Ok(())
}

// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbosity: u64) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
