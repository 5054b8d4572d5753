//! `observing` - command-line entry point for the observing utilities.
//!
//! # Commands
//!
//! ```text
//! observing parse-obs-id AT_O_20200219_000212        -> DataId as JSON
//! observing parse-visit-id 2021032300308             -> DataId as JSON
//! observing offsets --target X,Y --current X,Y       -> dx/dy in arcseconds
//! observing wait-image --obs-id ID --root DIR        -> path and size of the image
//! ```
//!
//! Settings come from the config file (see [`observing_config`]) and are
//! overridden by flags. Log lines go to stdout through the decorated
//! formatter; `RUST_LOG` overrides the configured filter.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args, Parser, Subcommand};

use observing_config::{ObservingConfig, PollSettings};
use observing_logging::LogSettings;
use observing_poller::{DirectoryRepository, Poller};
use observing_types::{DataId, PixelPosition, calculate_xy_offsets, parse_obs_id, parse_visit_id};

#[derive(Parser)]
#[command(name = "observing")]
#[command(about = "Observatory control helpers: identifiers, offsets and image retrieval")]
struct Cli {
    /// Config file (default: $OBSERVING_CONFIG or ~/.observing/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an archiver observation id, e.g. AT_O_20200219_000212
    ParseObsId { obs_id: String },
    /// Decode a camera visit id, e.g. 2021032300308
    ParseVisitId { visit_id: String },
    /// Offset in arcseconds that moves a source from CURRENT to TARGET
    Offsets {
        /// Desired position, "X,Y" in pixels
        #[arg(long, allow_hyphen_values = true)]
        target: PixelPosition,
        /// Current position, "X,Y" in pixels
        #[arg(long, allow_hyphen_values = true)]
        current: PixelPosition,
        /// Arcseconds per pixel (default: instrument plate scale)
        #[arg(long)]
        pixel_scale: Option<f64>,
    },
    /// Wait for an image to land in the repository
    WaitImage(WaitImageArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("id").required(true).args(["obs_id", "visit_id"])))]
struct WaitImageArgs {
    /// Archiver observation id
    #[arg(long)]
    obs_id: Option<String>,
    /// Camera visit id
    #[arg(long)]
    visit_id: Option<String>,
    /// Detector to read (default: from config, else the instrument default)
    #[arg(long)]
    detector: Option<u32>,
    /// Repository root (default: [repository] root from config)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Seconds to wait before giving up
    #[arg(long)]
    timeout: Option<f64>,
    /// Milliseconds between attempts
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

fn load_config(explicit: Option<&PathBuf>) -> Result<ObservingConfig> {
    match explicit {
        Some(path) => ObservingConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(ObservingConfig::load()?.unwrap_or_default()),
    }
}

fn init_tracing(config: &ObservingConfig, no_color: bool) {
    let settings = LogSettings {
        use_colors: config.use_colors() && !no_color,
        filter: config.log_filter().to_string(),
    };
    observing_logging::init(&settings);
}

fn print_data_id(data_id: &DataId) -> Result<()> {
    let json = serde_json::to_string_pretty(data_id)?;
    println!("{json}");
    Ok(())
}

fn resolve_data_id(args: &WaitImageArgs, config: &ObservingConfig) -> Result<DataId> {
    let data_id = match (&args.obs_id, &args.visit_id) {
        (Some(obs_id), _) => parse_obs_id(obs_id)?,
        (None, Some(visit_id)) => parse_visit_id(visit_id)?,
        (None, None) => bail!("one of --obs-id or --visit-id is required"),
    };
    let detector = match args.detector {
        Some(detector) => detector,
        None => config.detector()?,
    };
    Ok(data_id.with_detector(detector))
}

fn resolve_poll_settings(args: &WaitImageArgs, config: &ObservingConfig) -> Result<PollSettings> {
    let mut settings = config.poll_settings()?;
    if let Some(seconds) = args.timeout {
        settings.timeout = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("--timeout {seconds} is not a non-negative number"))?;
    }
    if let Some(ms) = args.poll_interval_ms {
        if ms == 0 {
            bail!("--poll-interval-ms must be greater than zero");
        }
        settings.poll_interval = Duration::from_millis(ms);
    }
    Ok(settings)
}

async fn wait_image(args: WaitImageArgs, config: &ObservingConfig) -> Result<()> {
    let data_id = resolve_data_id(&args, config)?;
    let settings = resolve_poll_settings(&args, config)?;
    let root = args
        .root
        .clone()
        .or_else(|| config.repository_root())
        .context("no repository root; pass --root or set [repository] root in the config")?;

    let repository = DirectoryRepository::new(root);
    let poller = Poller::new(settings.timeout)
        .with_poll_interval(settings.poll_interval)
        .with_span(tracing::info_span!("wait_image", obs_id = %data_id.obs_id()));

    tracing::info!(
        path = %repository.path_for(&data_id).display(),
        timeout_ms = settings.timeout.as_millis(),
        "Waiting for {data_id}"
    );
    let exposure = poller
        .retrieve(&data_id, &repository)
        .await
        .with_context(|| format!("failed to retrieve {data_id}"))?;

    println!("{}\t{} bytes", exposure.path.display(), exposure.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config, cli.no_color);

    match cli.command {
        Commands::ParseObsId { obs_id } => print_data_id(&parse_obs_id(&obs_id)?),
        Commands::ParseVisitId { visit_id } => print_data_id(&parse_visit_id(&visit_id)?),
        Commands::Offsets {
            target,
            current,
            pixel_scale,
        } => {
            let scale = match pixel_scale {
                Some(scale) if scale.is_finite() && scale > 0.0 => scale,
                Some(scale) => bail!("--pixel-scale {scale} is not a positive number"),
                None => config.pixel_scale()?,
            };
            let offset = calculate_xy_offsets(target, current, scale);
            println!("{:.3} {:.3}", offset.dx, offset.dy);
            Ok(())
        }
        Commands::WaitImage(args) => wait_image(args, &config).await,
    }
}
