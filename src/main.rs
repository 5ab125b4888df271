use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use xgrab::config::LogFormat;
use xgrab::download::get_http_client;
use xgrab::{
    Config, DownloadPlan, MediaVariant, SourceKind, XgrabError, download_post, expand_home,
    format_size, is_twitter_url, parse_id, resolve_media, sources_for,
};

const VERSION: &str = git_version::git_version!(
    args = ["--tags", "--always", "--dirty"],
    fallback = env!("CARGO_PKG_VERSION")
);

#[derive(Parser, Debug)]
#[command(
    name = "xgrab",
    version = VERSION,
    about = "Download videos, GIFs and photos from X/Twitter posts",
    long_about = "Download the media attached to an X/Twitter post without an API key.\n\
    Post metadata is looked up through public endpoints, falling back from one to the next.\n\n\
    Examples:\n\
      xgrab https://x.com/user/status/1956686646272790863             # Best quality video to <id>.mp4\n\
      xgrab https://x.com/user/status/1956686646272790863 -o clip.mp4 # Custom filename\n\
      xgrab https://x.com/user/status/1956686646272790863 -o ./media  # Into a directory\n\
      xgrab https://x.com/user/status/1956686646272790863 --all       # Every MP4 rendition\n\
      xgrab https://x.com/user/status/1956686646272790863 --photos    # Photos too\n\
      xgrab https://x.com/user/status/1956686646272790863 -i          # Show media only"
)]
struct Args {
    /// Post URL, e.g. https://x.com/<user>/status/<id>
    url: String,

    /// Output file or directory. Defaults to '<id>.mp4' in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Download all available MP4 renditions, ordered by bitrate
    #[arg(long = "all")]
    download_all: bool,

    /// Include HLS .m3u8 playlists in the selection
    #[arg(long)]
    include_m3u8: bool,

    /// Also download photos attached to the post
    #[arg(long)]
    photos: bool,

    /// Overwrite existing files
    #[arg(long)]
    force: bool,

    /// Show the selected media without downloading
    #[arg(short, long = "info-only")]
    info_only: bool,

    /// Metadata source to try, in order (syndication, fxtwitter, vxtwitter, graphql, page).
    /// Repeat to build a fallback chain; overrides the config file
    #[arg(long = "source", value_parser = parse_source)]
    sources: Vec<SourceKind>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hide the progress line
    #[arg(short, long)]
    quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_source(s: &str) -> std::result::Result<SourceKind, String> {
    SourceKind::from_str(s).map_err(|_| {
        format!("unknown source '{s}' (expected syndication, fxtwitter, vxtwitter, graphql or page)")
    })
}

fn init_logging(format: LogFormat, verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn display_media(post_id: &str, media: &[MediaVariant]) {
    println!("Found {} media file(s) in post {}:", media.len(), post_id);
    println!();

    for (index, item) in media.iter().enumerate() {
        println!("[{}] {}", index + 1, item.suggested_filename);
        println!("    Kind: {}", item.kind);
        if let Some(bitrate) = item.bitrate {
            println!("    Bitrate: {}/s", format_size(Some(bitrate / 8)));
        }
        if let Some(content_type) = &item.content_type {
            println!("    Type: {}", content_type);
        }
        println!("    URL: {}", item.url);
        println!();
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    init_logging(config.logging.format, args.verbose);

    if !is_twitter_url(&args.url) {
        warn!("{} does not look like an X/Twitter URL", args.url);
    }
    let post_id = parse_id(&args.url)?;
    debug!("Extracted post ID: {}", post_id);

    let plan = DownloadPlan {
        output: args.output.as_deref().map(expand_home),
        download_all: args.download_all,
        include_m3u8: args.include_m3u8,
        include_photos: args.photos,
        overwrite: args.force,
        ..DownloadPlan::new(post_id)
    };
    debug!("{:?}", plan);

    let kinds = if args.sources.is_empty() {
        &config.sources
    } else {
        &args.sources
    };
    let sources = sources_for(kinds);

    let client = get_http_client(&config.http)?;

    if args.info_only {
        let media = resolve_media(&client, &plan, &sources)
            .await
            .context("Lookup failed")?;
        display_media(&plan.post_id, &media);
        return Ok(());
    }

    let outputs = download_post(&client, &plan, &sources, !args.quiet)
        .await
        .context("Download failed")?;
    for path in outputs {
        println!("{}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let code = match run(args).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            e.downcast_ref::<XgrabError>()
                .map_or(1, XgrabError::exit_code)
        }
    };
    std::process::exit(code);
}
