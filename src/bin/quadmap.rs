use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use quadmap::RenderBackend as _;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "quadmap", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Editor config JSON. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame of a project as a PNG.
    Render(RenderArgs),
    /// Render a PNG sequence at a fixed rate, polling media every frame.
    Sequence(SequenceArgs),
    /// Print a summary of a project file.
    Info(InfoArgs),
    /// Write a new project with one unbound surface per grid cell.
    New(NewArgs),
}

#[derive(Parser, Debug)]
struct ViewArgs {
    /// Output width in pixels (the viewport the project geometry is expressed in).
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Render in live mode (no grid, outlines, handles or labels).
    #[arg(long)]
    live: bool,

    /// Directory searched for source media by display name.
    #[arg(long)]
    media_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of frames to render.
    #[arg(long, default_value_t = 30)]
    frames: u64,

    /// Frame rate used to pace rendering.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 2)]
    rows: u32,

    #[arg(long, default_value_t = 3)]
    cols: u32,

    /// Gap between cells.
    #[arg(long, default_value_t = 6.0)]
    gutter: f64,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Render(args) => cmd_render(args, config),
        Command::Sequence(args) => cmd_sequence(args, config),
        Command::Info(args) => cmd_info(args, &config),
        Command::New(args) => cmd_new(args, &config),
    }
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<quadmap::EditorConfig> {
    let cfg = match path {
        Some(p) => quadmap::EditorConfig::from_path(p)?,
        None => {
            let cfg = quadmap::EditorConfig::default().with_env_overrides();
            cfg.validate()?;
            cfg
        }
    };
    Ok(cfg)
}

fn open_project(
    path: &Path,
    config: &quadmap::EditorConfig,
    media_dir: Option<&Path>,
) -> anyhow::Result<quadmap::Project> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read project '{}'", path.display()))?;
    let mut project = quadmap::Project::from_json_str(&text, config.history_limit)?;
    let dir = media_dir
        .map(Path::to_path_buf)
        .or_else(|| path.parent().map(Path::to_path_buf));
    if let Some(dir) = dir {
        let bound = project.sources_mut().rebind_from_dir(&dir);
        tracing::info!(
            bound,
            total = project.sources().len(),
            dir = %dir.display(),
            "bound media sources"
        );
    }
    Ok(project)
}

fn make_session(
    project: &mut quadmap::Project,
    config: quadmap::EditorConfig,
    view: &ViewArgs,
) -> anyhow::Result<quadmap::EditorSession> {
    let viewport = quadmap::Viewport::new(view.width, view.height)?;
    let mut session = quadmap::EditorSession::new(config, viewport);
    if view.live {
        session.enter_live(project, viewport);
    }
    Ok(session)
}

fn make_backend(config: &quadmap::EditorConfig) -> anyhow::Result<quadmap::CpuBackend> {
    let settings = quadmap::RenderSettings::from_config(config)?;
    Ok(quadmap::CpuBackend::new(settings)?)
}

fn cmd_render(args: RenderArgs, config: quadmap::EditorConfig) -> anyhow::Result<()> {
    let mut project = open_project(&args.in_path, &config, args.view.media_dir.as_deref())?;
    let mut backend = make_backend(&config)?;
    let session = make_session(&mut project, config, &args.view)?;

    let plan = quadmap::compile_frame(&project, &session);
    let frame = backend.render_plan(&plan)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs, config: quadmap::EditorConfig) -> anyhow::Result<()> {
    let mut project = open_project(&args.in_path, &config, args.view.media_dir.as_deref())?;
    let mut backend = make_backend(&config)?;
    let session = make_session(&mut project, config, &args.view)?;

    let mut clock = quadmap::FixedRateClock::new(args.fps)?;
    let mut sink = quadmap::PngSequenceSink::new(&args.out_dir);
    let frames = quadmap::FrameLoop::new(&mut backend, &mut clock).run(
        &project,
        &session,
        &mut sink,
        args.frames,
    )?;

    eprintln!("wrote {frames} frames to {}", args.out_dir.display());
    Ok(())
}

fn cmd_info(args: InfoArgs, config: &quadmap::EditorConfig) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read project '{}'", args.in_path.display()))?;
    let project = quadmap::Project::from_json_str(&text, config.history_limit)?;

    println!("sources: {}", project.sources().len());
    for s in project.sources().iter() {
        println!("  {}  {:?}  {}", s.id, s.kind, s.display_name);
    }
    println!("surfaces: {}", project.surfaces().len());
    for s in project.surfaces() {
        let b = s.bounds();
        let source = match &s.source_id {
            Some(id) if project.sources().contains(id) => id.to_string(),
            Some(id) => format!("{id} (missing)"),
            None => "-".to_owned(),
        };
        println!(
            "  {}  source={}  bounds=[{:.1}, {:.1}]-[{:.1}, {:.1}]  opacity={:.2}  blend={:?}",
            s.id, source, b.min_x, b.min_y, b.max_x, b.max_y, s.opacity, s.blend_mode
        );
    }
    Ok(())
}

fn cmd_new(args: NewArgs, config: &quadmap::EditorConfig) -> anyhow::Result<()> {
    let grid = quadmap::GridLayout::new(args.rows, args.cols, args.gutter)?;
    let viewport = quadmap::Viewport::new(args.width, args.height)?;
    let mut project = quadmap::Project::new(config.history_limit);
    let cells: Vec<usize> = (0..grid.cell_count()).collect();
    project.assign_to_cells(&grid, viewport, None, &cells)?;
    project.save_to_path(&args.out)?;

    eprintln!(
        "wrote {} ({} surfaces)",
        args.out.display(),
        project.surfaces().len()
    );
    Ok(())
}
