use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_curator::{
    config::{defaults::DEFAULT_CONFIG_FILE, Config, RuntimeOverrides},
    errors::AppError,
    proxy::{PlaylistCurator, RunMode},
    sources::{FilePlaylistSource, HttpPlaylistSource, PlaylistSource},
};

#[derive(Parser)]
#[command(name = "m3u-curator")]
#[command(version)]
#[command(about = "Regroups an upstream IPTV playlist into a curated, allow-listed playlist")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Upstream playlist URL
    #[arg(long, env = "SOURCE_URL", value_name = "URL")]
    source_url: Option<String>,

    /// Channel groups as a JSON object of group name to channel names
    #[arg(long, env = "CHANNEL_GROUPS", value_name = "JSON")]
    channel_groups: Option<String>,

    /// Read the playlist from a local file instead of fetching it
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output playlist path (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the curated playlist instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Must run before parsing so .env values reach the `env` arguments
    let dotenv_path = dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_filter = format!("m3u_curator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting m3u-curator v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_from_file(&cli.config)?;
    let curator_config = config.resolve(RuntimeOverrides {
        source_url: cli.source_url,
        channel_groups: cli.channel_groups,
        output_path: cli.output,
        require_source_url: cli.input.is_none(),
    })?;

    let source: Box<dyn PlaylistSource> = match cli.input {
        Some(path) => Box::new(FilePlaylistSource::new(path)),
        None => {
            let url = curator_config
                .source
                .url
                .clone()
                .context("source URL missing after validation")?;
            Box::new(HttpPlaylistSource::new(url, &curator_config.source)?)
        }
    };

    let mode = if cli.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Publish
    };

    let summary = PlaylistCurator::new(&curator_config)
        .run(source.as_ref(), mode)
        .await?;

    match summary.output {
        Some(path) => info!("'{}' written successfully", path.display()),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(summary.content.as_bytes())
                .context("Failed to write playlist to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

/// Configuration problems exit with 2, everything else with 1
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<AppError>() {
        Some(app_error) if app_error.is_configuration() => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
