use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use image::{Rgba, RgbaImage};
use slideshow::compositor::SlideCompositor;
use slideshow::render::{CpuCompositor, RecordingBackend};
use slideshow::transitions::{
    TransitionParameters, TransitionRegistry, TransitionStage, TransitionSubType, TransitionType,
};
use slideshow::{
    ElapsedTime, EngineConfig, ManualClock, MetaPresentation, PresentationInfo, SlideShowHandler,
};

#[derive(Parser, Debug)]
#[command(name = "slideshow", version)]
struct Cli {
    /// Log scheduling decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame of a 2D slide transition as a PNG.
    Frame(FrameArgs),
    /// Run a slide transition against the recording backend and print its GL commands.
    Trace(TraceArgs),
    /// Play a presentation on a simulated clock and print what happens, one JSON object per line.
    Timeline(TimelineArgs),
}

#[derive(Parser, Debug)]
struct TransitionArgs {
    /// Transition type, e.g. `fade` or `barWipe`.
    #[arg(long)]
    kind: String,

    /// Transition subtype, e.g. `crossfade`.
    #[arg(long)]
    subtype: Option<String>,

    /// Play the transition in reverse.
    #[arg(long)]
    reverse: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    transition: TransitionArgs,

    /// Leaving slide PNG; a solid color when omitted.
    #[arg(long)]
    leaving: Option<PathBuf>,

    /// Entering slide PNG; a solid color when omitted.
    #[arg(long)]
    entering: Option<PathBuf>,

    /// Progress in `[0, 1]`.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 320)]
    width: u32,

    #[arg(long, default_value_t = 240)]
    height: u32,
}

#[derive(Parser, Debug)]
struct TraceArgs {
    #[command(flatten)]
    transition: TransitionArgs,

    /// Frames to render between start and end.
    #[arg(long, default_value_t = 4)]
    frames: u32,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Input presentation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Next-effect requests issued whenever the show waits.
    #[arg(long, default_value_t = 0)]
    clicks: u32,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Trace(args) => cmd_trace(args),
        Command::Timeline(args) => cmd_timeline(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn transition_params(
    args: &TransitionArgs,
    leaving: RgbaImage,
    entering: RgbaImage,
) -> anyhow::Result<TransitionParameters> {
    let ty = TransitionType::parse(&args.kind)
        .with_context(|| format!("unknown transition type '{}'", args.kind))?;
    let subtype = match args.subtype.as_deref() {
        Some(name) => TransitionSubType::parse(name)
            .with_context(|| format!("unknown transition subtype '{name}'"))?,
        None => TransitionSubType::Default,
    };
    Ok(
        TransitionParameters::new(ty, subtype, Rc::new(leaving), Rc::new(entering))
            .with_direction(!args.reverse),
    )
}

fn read_png(path: &Path) -> anyhow::Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("read image '{}'", path.display()))?;
    Ok(image.to_rgba8())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cpu = CpuCompositor::new(args.width, args.height)?;
    let slide = |path: Option<&PathBuf>, color: [u8; 4]| -> anyhow::Result<RgbaImage> {
        match path {
            Some(path) => Ok(cpu.fit(&read_png(path)?)),
            None => Ok(RgbaImage::from_pixel(args.width, args.height, Rgba(color))),
        }
    };
    let leaving = slide(args.leaving.as_ref(), [18, 20, 28, 255])?;
    let entering = slide(args.entering.as_ref(), [230, 226, 210, 255])?;

    let params = transition_params(&args.transition, leaving, entering)?;
    let (resolved, program) = TransitionRegistry::with_builtin()
        .program(&params)
        .with_context(|| format!("no transition for '{}'", args.transition.kind))?;
    let frame = cpu.render_program(&program, &params.leaving, &params.entering, args.time)?;

    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({})", args.out.display(), resolved.kind);
    Ok(())
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    let leaving = RgbaImage::from_pixel(16, 12, Rgba([0, 0, 0, 255]));
    let entering = RgbaImage::from_pixel(16, 12, Rgba([255, 255, 255, 255]));
    let params = transition_params(&args.transition, leaving, entering)?;
    let change = TransitionRegistry::with_builtin()
        .create(&params)
        .with_context(|| format!("no transition for '{}'", args.transition.kind))?;

    let backend = RecordingBackend::new();
    let log = backend.log();
    let mut stage = TransitionStage::new(Box::new(backend));
    stage.begin(change)?;
    let frames = args.frames.max(1);
    for frame in 0..=frames {
        stage.perform(f64::from(frame) / f64::from(frames));
        stage.render_pending()?;
    }
    stage.finish();

    for command in log.snapshot() {
        println!("{command:?}");
    }
    eprintln!("{} commands, {} draws", log.len(), log.draw_count());
    Ok(())
}

/// Small stand-ins for rendered slides; the recording backend never looks at the pixels.
#[derive(Debug)]
struct PlaceholderSlides {
    bitmap: Rc<RgbaImage>,
}

impl SlideCompositor for PlaceholderSlides {
    fn get_slide(&mut self, _slide: usize) -> Option<Rc<RgbaImage>> {
        Some(self.bitmap.clone())
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("open config '{}'", path.display()))?;
    let config: EngineConfig =
        serde_json::from_str(&text).with_context(|| "parse engine config JSON")?;
    config.validate()?;
    Ok(config)
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.in_path)
        .with_context(|| format!("open presentation '{}'", args.in_path.display()))?;
    let info = PresentationInfo::from_json(&text).with_context(|| "parse presentation JSON")?;
    let config = read_config(args.config.as_deref())?;

    let height = (64 * info.height / info.width).max(1);
    let compositor = PlaceholderSlides {
        bitmap: Rc::new(RgbaImage::new(64, height)),
    };
    let presentation = MetaPresentation::new(info, &config)?;
    let first = presentation
        .first_slide()
        .context("every slide is hidden")?;

    let clock = Rc::new(ManualClock::new());
    let mut handler = SlideShowHandler::new(
        presentation,
        config,
        ElapsedTime::new(clock.clone()),
        Box::new(RecordingBackend::new()),
        Box::new(compositor),
    )?;

    handler.start(first)?;
    let mut now = 0.0;
    let mut clicks = args.clicks;
    loop {
        let wakeup = handler.tick()?;
        for entry in handler.take_timeline() {
            println!("{}", serde_json::to_string(&entry)?);
        }
        match wakeup {
            Some(wait) if now + wait <= args.seconds => {
                clock.advance(wait);
                now += wait;
            }
            _ => {
                if clicks == 0 || now >= args.seconds {
                    break;
                }
                clicks -= 1;
                if !handler.next_effect() && !handler.next_slide()? {
                    for entry in handler.take_timeline() {
                        println!("{}", serde_json::to_string(&entry)?);
                    }
                    break;
                }
            }
        }
    }
    eprintln!("simulated {now:.3}s");
    Ok(())
}
