//! polypcm CLI: play a score through the default device or export a WAV.
//!
//! Usage:
//!   pp-cli catalog.yaml song.yaml
//!   pp-cli catalog.yaml song.yaml --wav output.wav
//!   pp-cli catalog.yaml song.yaml --config session.toml

use clap::Parser;
use pp_master::{Controller, ControllerError, SessionConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pp-cli", version, about = "Polyphonic sample player")]
struct Args {
    /// Catalog manifest listing instruments and kits.
    manifest: PathBuf,

    /// Score file.
    score: PathBuf,

    /// Session settings (YAML, TOML or JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render to this WAV file instead of playing.
    #[arg(long)]
    wav: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ControllerError> {
    let config = SessionConfig::load(args.config.as_deref())?;
    let mut ctrl = Controller::load(&args.manifest, &args.score, config)?;

    println!("Patches:  {}", ctrl.catalog().len());
    println!("Samples:  {}", ctrl.catalog().bank().len());
    println!("Events:   {}", ctrl.events().len());
    if let Some(last) = ctrl.events().last_start() {
        let engine = &ctrl.config().engine;
        let seconds = last.to_frame(engine.sample_rate, engine.beats_per_second) as f64 / engine.sample_rate as f64;
        println!("Length:   {:.2} beats ({:.1} s)", last.as_beats_f64(), seconds);
    }
    println!();

    match &args.wav {
        Some(path) => render_to_wav(&ctrl, path),
        None => play_audio(&mut ctrl),
    }
}

fn play_audio(ctrl: &mut Controller) -> Result<(), ControllerError> {
    ctrl.play()?;
    println!("Playing...");

    while ctrl.is_playing() {
        if let Some(pos) = ctrl.position() {
            print!("\rBeat: {:8.2}", pos.as_beats_f64());
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("\rDone.          ");
    Ok(())
}

fn render_to_wav(ctrl: &Controller, path: &Path) -> Result<(), ControllerError> {
    let rate = ctrl.config().engine.sample_rate;
    info!(path = %path.display(), sample_rate = rate, "rendering");

    let mut file = BufWriter::new(File::create(path)?);
    let frames = ctrl.write_wav(&mut file)?;
    file.flush()?;
    println!("Wrote {} frames to {}", frames, path.display());
    Ok(())
}
