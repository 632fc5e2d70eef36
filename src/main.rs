use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use streamable::{create_client, CliArgs, Config, ProgressInfo};

#[derive(Parser)]
#[command(name = "streamable")]
#[command(about = "Upload, import and inspect videos on streamable.com")]
struct Cli {
    #[arg(short, long, help = "Increase verbosity")]
    verbose: bool,

    #[arg(short, long, help = "Path to a config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Override the API base URL")]
    api_url: Option<String>,

    #[arg(short, long, env = "STREAMABLE_USERNAME", help = "Account username")]
    username: Option<String>,

    #[arg(
        short,
        long,
        env = "STREAMABLE_PASSWORD",
        hide_env_values = true,
        help = "Account password"
    )]
    password: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a local video file
    Upload {
        path: PathBuf,
        #[arg(long, help = "Print upload progress to stderr")]
        progress: bool,
    },
    /// Import a video from a remote URL
    Import { url: String },
    /// Show information about an existing video
    Get { shortcode: String },
}

fn print_progress(info: &ProgressInfo) {
    eprint!(
        "\r{:>6.2}%  {} / {} bytes",
        info.percent, info.uploaded_bytes, info.total_bytes
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        api_url: cli.api_url.clone(),
        config_file: cli.config.clone(),
        username: cli.username.clone(),
        password: cli.password.clone(),
        timeout_secs: cli.timeout,
    };
    let config = Config::load_with_cli(&args).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(tracing::Level::INFO)
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client = create_client(&config.api).context("Failed to create API client")?;

    let video = match cli.command {
        Command::Upload { path, progress } => {
            let result = if progress {
                client.upload_video_with_progress(&path, print_progress).await
            } else {
                client.upload_video(&path).await
            };
            if progress {
                eprintln!();
            }
            result.with_context(|| format!("Failed to upload {}", path.display()))?
        }
        Command::Import { url } => client
            .import_video(&url)
            .await
            .with_context(|| format!("Failed to import {}", url))?,
        Command::Get { shortcode } => client
            .get_video(&shortcode)
            .await
            .with_context(|| format!("Failed to fetch video {}", shortcode))?,
    };

    println!("{}", serde_json::to_string_pretty(&video)?);
    Ok(())
}
