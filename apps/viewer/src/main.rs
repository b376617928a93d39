use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use layview_app::{self as app, AppState};
use layview_io::ViewerSettings;
use layview_renderer::{InputEvent, RendererKind};

#[derive(Parser, Debug)]
#[command(about = "Render layout documents with the layview backends", version)]
struct Args {
    /// Layout documents to upload, in order
    documents: Vec<PathBuf>,

    /// Settings file; defaults are used when it does not exist
    #[arg(long, default_value = "layview.json")]
    settings: PathBuf,

    /// Backend to start with (planar, sprite, scene); overrides the settings file
    #[arg(long)]
    mode: Option<RendererKind>,

    /// Switch to the next backend this many times before uploading
    #[arg(long, default_value_t = 0)]
    toggle: usize,

    /// JSON array of wheel/pointer events applied after uploading
    #[arg(long)]
    events: Option<PathBuf>,

    /// Fit the view again after the events
    #[arg(long)]
    fit: bool,

    /// Report the primitives under this canvas position, as `x,y`
    #[arg(long, value_parser = parse_position)]
    hit: Option<(f64, f64)>,

    /// Write the default settings to `--settings` and exit
    #[arg(long)]
    write_settings: bool,

    /// Pretty-print the frame JSON
    #[arg(long)]
    pretty: bool,
}

fn parse_position(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'x,y', got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {}", e))?;
    Ok((x, y))
}

fn run(args: Args) -> Result<(), String> {
    if args.write_settings {
        ViewerSettings::default()
            .save(&args.settings)
            .map_err(|e| e.to_string())?;
        log::info!("wrote default settings to {}", args.settings.display());
        return Ok(());
    }

    let mut settings = ViewerSettings::load_or_default(&args.settings).map_err(|e| e.to_string())?;
    if let Some(mode) = args.mode {
        settings.initial_mode = mode;
    }

    let mut state = AppState::new(&settings)?;
    for _ in 0..args.toggle {
        let mode = app::toggle_mode(&mut state)?;
        log::info!("switched to {} renderer", mode);
    }

    for path in &args.documents {
        let info = app::upload_document(&mut state, path)?;
        log::info!(
            "uploaded {} ({} shapes, {} objects)",
            info.layout_id,
            info.shape_count,
            info.object_count
        );
    }

    if let Some(path) = &args.events {
        let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let events: Vec<InputEvent> =
            serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))?;
        let changed = app::apply_events(&mut state, &events)?;
        log::info!("{} of {} events changed the view", changed, events.len());
    }

    if args.fit {
        app::zoom_fit(&mut state)?;
    }

    if let Some((x, y)) = args.hit {
        let hits = app::hit_test(&state, x, y);
        eprintln!("hit ({}, {}): {}", x, y, hits.join(", "));
    }

    let frame = app::get_frame(&state)?;
    let json = frame.to_json(args.pretty).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = ViewerSettings::load_or_default(&args.settings)
        .map(|s| s.log_filter)
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
