use anyhow::{Context, Result};
use clap::Parser;
use retroconf_core::config::MemoryStore;
use retroconf_core::libretro::DisabledReason;
use retroconf_core::{
    save_settings, translate, write_libretro_config, Controller, DisplayQuery, FixedResolution, LaunchRequest,
    OverlayOutcome, Paths, Resolution, SystemDescriptor, TvServiceQuery,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Generate RetroArch settings for one emulator launch.
#[derive(Debug, Parser)]
#[command(name = "retroconf", version)]
struct Args {
    /// System name, e.g. `snes`.
    #[arg(short, long)]
    system: String,

    /// ROM about to be launched.
    #[arg(short, long)]
    rom: PathBuf,

    /// Bezel set to look up, e.g. `recalbox`.
    #[arg(short, long)]
    bezel: Option<String>,

    /// Number of connected controllers.
    #[arg(short, long, default_value_t = 1)]
    controllers: usize,

    /// Flat `scope.key=value` configuration file.
    #[arg(long)]
    conf: Option<PathBuf>,

    /// JSON file overriding the default file layout.
    #[arg(long)]
    paths: Option<PathBuf>,

    /// Screen resolution (`WIDTHxHEIGHT`) instead of asking tvservice.
    #[arg(long)]
    resolution: Option<Resolution>,

    /// Print the generated files instead of writing them.
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let paths = match &args.paths {
        Some(file) => Paths::load(file).with_context(|| format!("loading paths from {}", file.display()))?,
        None => Paths::from_env(),
    };

    let system = match &args.conf {
        Some(conf) => SystemDescriptor::load_conf(&args.system, conf)
            .with_context(|| format!("reading system config {}", conf.display()))?,
        None => SystemDescriptor::new(&args.system),
    };
    info!(system = %system.name, core = system.core().unwrap_or("-"), "building retroarch config");

    let display: Box<dyn DisplayQuery> = match args.resolution {
        Some(res) => Box::new(FixedResolution(res)),
        None => Box::new(TvServiceQuery::default()),
    };

    let controllers = Controller::players(args.controllers);
    let request = LaunchRequest {
        system: &system,
        controllers: &controllers,
        rom: &args.rom,
        bezel: args.bezel.as_deref(),
    };
    let translation = translate(&request, &paths, display.as_ref());

    match &translation.overlay {
        OverlayOutcome::Resolved(layout) => info!(image = %layout.image.display(), "overlay enabled"),
        OverlayOutcome::Disabled(DisabledReason::NoBezel) => {}
        OverlayOutcome::Disabled(reason) => info!(?reason, "overlay disabled"),
        OverlayOutcome::ResolutionUnavailable(e) => warn!(error = %e, "writing settings without overlay"),
    }

    if args.dry_run {
        let mut settings = MemoryStore::new();
        let mut core = MemoryStore::new();
        save_settings(&translation, &mut settings, &mut core)?;
        print!("{}", settings.render());
        if !core.is_empty() {
            println!("# {}", paths.retroarch_core_custom.display());
            print!("{}", core.render());
        }
        if let Some(layout) = translation.overlay.layout() {
            println!("# {}", paths.overlay_config_file.display());
            print!("{}", layout.render());
        }
        return Ok(());
    }

    write_libretro_config(&translation, &paths)
        .with_context(|| format!("writing {}", paths.retroarch_custom.display()))?;
    Ok(())
}
