use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "tides", version)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print (or write) the built-in page manifest.
    Manifest(ManifestArgs),
    /// Drive a page with a scripted trace and print its timeline as JSON.
    Replay(ReplayArgs),
    /// Render a scene illustration to PNG (or SVG markup).
    Illustrate(IllustrateArgs),
}

#[derive(Parser, Debug)]
struct ManifestArgs {
    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Page manifest JSON; the built-in page when omitted.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Trace JSON; a top-to-bottom scroll sweep when omitted.
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Directory datasets are read from. Overrides the manifest; sample data when neither is set.
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Sweep stride in pixels.
    #[arg(long, default_value_t = 300.0)]
    stride: f64,

    /// Clock advance per sweep step, in milliseconds.
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Start with reduced motion enabled.
    #[arg(long)]
    reduced_motion: bool,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct IllustrateArgs {
    /// Scene to render (forest, city or lab).
    #[arg(long)]
    scene: tides::SceneName,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// Raster width in pixels; the illustration's natural size when omitted.
    #[arg(long)]
    width: Option<u32>,

    /// Write SVG markup instead of PNG.
    #[arg(long)]
    svg: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    match cli.cmd {
        Command::Manifest(args) => cmd_manifest(args),
        Command::Replay(args) => cmd_replay(args),
        Command::Illustrate(args) => cmd_illustrate(args),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn emit(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("write stdout")?;
        }
    }
    Ok(())
}

fn cmd_manifest(args: ManifestArgs) -> anyhow::Result<()> {
    let json = tides::PageManifest::standard().to_json_pretty()?;
    emit(args.out.as_deref(), &json)
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let manifest = match &args.manifest {
        Some(path) => tides::PageManifest::from_path(path)?,
        None => tides::PageManifest::standard(),
    };
    let data_root = args.data_root.clone().or_else(|| manifest.data_root.clone());
    let source: Box<dyn tides::DataSource> = match data_root {
        Some(root) => Box::new(tides::FsDataSource::new(root)),
        None => Box::new(tides::OfflineDataSource),
    };

    let mut page = tides::Page::new(manifest, source.as_ref()).context("build page")?;
    if args.reduced_motion {
        page.set_reduced_motion(true);
    }
    let trace = match &args.trace {
        Some(path) => tides::Trace::from_path(path)?,
        None => tides::Trace::sweep(&page, args.stride, args.frame_ms),
    };
    let mut timeline = tides::replay(&mut page, &trace);
    page.shutdown();
    timeline.extend(page.take_timeline());

    let json = serde_json::to_string_pretty(&timeline).context("serialize timeline")?;
    emit(args.out.as_deref(), &json)
}

fn cmd_illustrate(args: IllustrateArgs) -> anyhow::Result<()> {
    if args.svg {
        let markup = tides::render::raster::scene_markup(args.scene)?;
        return emit(Some(&args.out), &markup);
    }
    let raster = tides::render::raster::render_scene(args.scene, args.width)?;
    raster.write_png(&args.out)?;
    eprintln!("wrote {} ({}x{})", args.out.display(), raster.width, raster.height);
    Ok(())
}
