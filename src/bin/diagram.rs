use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

/// Overlay captions and grid lines onto a PNG, then crop and save or display it.
///
/// Caption files hold one caption per line as `text size x,y`: `text` has no spaces, `size` is
/// the font size in points, and `x,y` is the pixel the caption is centered on. `_2` in `text`
/// becomes a subscript.
#[derive(Parser, Debug)]
#[command(name = "diagram", version)]
struct Cli {
    /// Source PNG image.
    image: PathBuf,

    /// Draw H horizontal and V vertical grid lines.
    #[arg(long, value_name = "H,V")]
    grid: Option<String>,

    /// Save the result to this PNG instead of opening a viewer.
    #[arg(short = 'o', long = "out", value_name = "PATH")]
    out: Option<PathBuf>,

    /// Read captions from this file.
    #[arg(long = "cap", value_name = "PATH")]
    cap: Option<PathBuf>,

    /// Crop the result to LEFT,TOP,RIGHT,BOTTOM (pre-crop pixel coordinates).
    #[arg(long, value_name = "L,T,R,B")]
    crop: Option<String>,

    /// Serve re-render requests as JSON lines on stdin/stdout.
    #[arg(long, visible_alias = "web")]
    interactive: bool,

    /// Directory for interactive artifacts (defaults to the system temp dir).
    #[arg(long, value_name = "DIR", requires = "interactive")]
    artifact_dir: Option<PathBuf>,

    /// Image viewer used when no output path is given.
    #[arg(long, env = diagram::VIEWER_ENV, default_value = diagram::DEFAULT_VIEWER)]
    viewer: String,

    /// Additional directory of .ttf/.otf fonts (repeatable).
    #[arg(long = "font-dir", value_name = "DIR")]
    font_dirs: Vec<PathBuf>,

    /// Log pipeline details.
    #[arg(long)]
    debug: bool,

    /// Log as JSON lines.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn run_config(&self) -> diagram::RunConfig {
        let output = match &self.out {
            Some(path) => diagram::Output::File(path.clone()),
            None => diagram::Output::Viewer(self.viewer.clone()),
        };
        let mut cfg = diagram::RunConfig::new(&self.image, output);
        cfg.grid = self.grid.clone();
        cfg.caption_file = self.cap.clone();
        cfg.crop = self.crop.clone();
        cfg.interactive = self.interactive;
        cfg.font_dirs = self.font_dirs.clone();
        cfg
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging = diagram::logging::LoggingConfig::with_debug(cli.debug);
    logging.json = cli.log_json;
    diagram::logging::init_logging(&logging);

    let cfg = cli.run_config();
    cfg.validate()?;
    let renderer = diagram::SvgTextRenderer::with_font_dirs(&cfg.font_dirs);

    if cfg.interactive {
        return cmd_interactive(&cfg, renderer, cli.artifact_dir);
    }
    cmd_render(&cfg, &renderer)
}

fn cmd_render(cfg: &diagram::RunConfig, renderer: &diagram::SvgTextRenderer) -> anyhow::Result<()> {
    let plan = cfg.plan()?;
    diagram::render_once(&cfg.source, &plan, &cfg.output, renderer)
        .with_context(|| format!("annotate '{}'", cfg.source.display()))?;

    if let diagram::Output::File(path) = &cfg.output {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_interactive(
    cfg: &diagram::RunConfig,
    renderer: diagram::SvgTextRenderer,
    artifact_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let artifact_dir = artifact_dir.unwrap_or_else(std::env::temp_dir);
    let mut session = diagram::InteractiveSession::new(
        &cfg.source,
        cfg.caption_file.clone(),
        renderer,
        artifact_dir,
    )?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let answered = diagram::serve_lines(&mut session, stdin.lock(), stdout.lock())?;
    tracing::info!(answered, "interactive session closed");
    Ok(())
}
