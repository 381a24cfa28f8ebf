use std::{
    fs::File,
    io::BufReader,
    ops::ControlFlow,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "beatframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of a track as a PNG.
    Frame(FrameArgs),
    /// Export a video of a whole track (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// List the encoder profiles this system supports.
    Probe,
    /// Print a scene config as JSON.
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Scene config JSON, overlaid onto the defaults (or onto `--preset`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in preset to start from.
    #[arg(long)]
    preset: Option<String>,

    /// Font file to register; the first one is the fallback family.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input audio file.
    #[arg(long)]
    audio: PathBuf,

    #[command(flatten)]
    scene: SceneArgs,

    /// Playback time to render, in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output width.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Output height.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input audio file.
    #[arg(long)]
    audio: PathBuf,

    #[command(flatten)]
    scene: SceneArgs,

    /// Output resolution.
    #[arg(long, value_enum, default_value_t = beatframe::ExportResolution::P1080)]
    resolution: beatframe::ExportResolution,

    /// Output frame rate.
    #[arg(long, value_enum, default_value_t = beatframe::ExportFrameRate::Fps60)]
    fps: beatframe::ExportFrameRate,

    /// Output quality.
    #[arg(long, value_enum, default_value_t = beatframe::ExportQuality::High)]
    quality: beatframe::ExportQuality,

    /// Directory the video is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// List preset names instead.
    #[arg(long)]
    list_presets: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beatframe=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Probe => cmd_probe(),
        Command::Config(args) => cmd_config(args),
    }
}

fn read_scene(args: &SceneArgs) -> anyhow::Result<beatframe::SceneConfig> {
    let base = match args.preset.as_deref() {
        Some(name) => beatframe::preset(name).with_context(|| {
            format!(
                "unknown preset '{name}' (available: {})",
                beatframe::PRESET_NAMES.join(", ")
            )
        })?,
        None => beatframe::SceneConfig::default(),
    };
    let Some(path) = args.config.as_deref() else {
        return Ok(base);
    };
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse config JSON")?;
    Ok(beatframe::apply_overlay(&base, &value))
}

fn make_visualizer(
    scene: &SceneArgs,
    preview: beatframe::Canvas,
) -> anyhow::Result<beatframe::Visualizer> {
    let cfg = read_scene(scene)?;
    let mut vis = beatframe::Visualizer::new(beatframe::VisualizerOpts {
        preview,
        ..beatframe::VisualizerOpts::default()
    })?;
    vis.scene().store(cfg);
    for font in &scene.fonts {
        let family = vis.renderer_mut().fonts_mut().register_file(font)?;
        tracing::info!(family, path = %font.display(), "registered font");
    }
    Ok(vis)
}

fn load_track(
    vis: &mut beatframe::Visualizer,
    audio: &Path,
) -> anyhow::Result<beatframe::SteppedClock> {
    let clock = beatframe::SteppedClock::new();
    let loaded = vis.load_audio(audio, None, None, Box::new(clock.clone()))?;
    if !loaded {
        anyhow::bail!("'{}' is not a recognized audio file", audio.display());
    }
    Ok(clock)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let canvas = beatframe::Canvas::new(args.width, args.height)?;
    let mut vis = make_visualizer(&args.scene, canvas)?;
    let clock = load_track(&mut vis, &args.audio)?;

    // Warm up analysis smoothing and particles before the requested time.
    const WARMUP_SECS: f64 = 1.0;
    const STEP: f64 = 1.0 / 60.0;
    let start = (args.at - WARMUP_SECS).max(0.0);
    vis.seek(start);
    if let Some(pb) = vis.playback_mut() {
        pb.play();
    }
    beatframe::FrameLoop::unpaced().run(|_| {
        let Some(pb) = vis.playback().filter(|pb| pb.is_playing()) else {
            return ControlFlow::Break(());
        };
        if pb.current_time() + STEP > args.at {
            return ControlFlow::Break(());
        }
        clock.advance(STEP);
        if let Err(e) = vis.tick() {
            tracing::warn!(error = %e, "tick failed");
        }
        ControlFlow::Continue(())
    });
    vis.tick()?;

    let frame = vis.renderer().frame();
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let settings = beatframe::ExportSettings {
        resolution: args.resolution,
        frame_rate: args.fps,
        quality: args.quality,
    };
    let preview = beatframe::Canvas::new(640, 360)?;
    let mut vis = make_visualizer(&args.scene, preview)?;
    let clock = load_track(&mut vis, &args.audio)?;

    let probe = beatframe::FfmpegProbe::detect();
    let profile =
        vis.start_capture(settings, &probe, Box::new(beatframe::FfmpegEncoder::new()))?;
    tracing::info!(mime = profile.mime_type, "export started");

    let step = settings.frame_rate.fps().frame_duration_secs();
    let mut last_reported = -10.0;
    let (_, failed) = beatframe::FrameLoop::unpaced().run(|_| {
        clock.advance(step);
        if let Err(e) = vis.tick() {
            return ControlFlow::Break(Some(e));
        }
        let capture = vis.capture();
        if !capture.is_active() {
            return ControlFlow::Break(None);
        }
        if capture.progress() - last_reported >= 10.0 {
            last_reported = capture.progress();
            tracing::info!(progress = capture.progress().round(), "exporting");
        }
        ControlFlow::Continue(())
    });
    if let Some(Some(e)) = failed {
        return Err(e.into());
    }

    let artifact = vis
        .take_artifact()
        .context("export finished without producing a video")?;
    let path = artifact.save_to(&args.out_dir)?;
    eprintln!("wrote {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(())
}

fn cmd_probe() -> anyhow::Result<()> {
    if !beatframe::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg was not found on PATH");
    }
    let probe = beatframe::FfmpegProbe::detect();
    for profile in beatframe::PROBE_LIST {
        let mark = if beatframe::EncoderProbe::is_supported(&probe, &profile) {
            "yes"
        } else {
            "no"
        };
        println!(
            "{:<10} {:<12} {:<8} {mark}",
            profile.mime_type, profile.video_encoder, profile.audio_encoder
        );
    }
    match beatframe::select_profile(&probe) {
        Some(p) => println!("selected: {} ({})", p.mime_type, p.extension),
        None => println!("selected: none (export unsupported)"),
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    if args.list_presets {
        for name in beatframe::PRESET_NAMES {
            println!("{name}");
        }
        return Ok(());
    }
    let cfg = read_scene(&args.scene)?;
    println!("{}", cfg.to_json_pretty()?);
    Ok(())
}
