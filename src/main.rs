//! Application entry point for air-writer.
//!
//! # Startup sequence (`replay`)
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] (defaults on first run) and the language preference.
//! 3. Load the landmark trace; it backs both the camera and the hand model.
//! 4. Build the OCR engine: Tesseract when compiled in, otherwise a stub
//!    that fails every call so the rest of the pipeline still runs.
//! 5. Spawn the [`Coordinator`] and start the camera.
//! 6. Report status changes until the trace is exhausted and no recognition
//!    is pending, then print the recognised text.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use air_writer::config::{AppConfig, AppPaths, Preferences};
use air_writer::i18n::MessageKey;
use air_writer::ocr::{RecognitionEngine, TileRecorder};
use air_writer::pipeline::{new_shared_state, Coordinator, Event};
use air_writer::replay::{ReplayCamera, ReplayTracker, Trace};

/// Write characters in the air with your index finger.
#[derive(Parser, Debug)]
#[command(name = "air-writer", version)]
#[command(about = "Air-writing recognition: fingertip strokes to characters")]
struct Cli {
    /// Settings file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a recorded landmark trace through the full pipeline
    Replay {
        /// JSON landmark trace
        trace: PathBuf,

        /// Write every tile sent to the OCR engine into this directory
        #[arg(long)]
        save_tiles: Option<PathBuf>,

        /// Tesseract data directory
        #[arg(long)]
        tessdata: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the settings file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let paths = AppPaths::new();
    let config = match &cli.config {
        // An explicitly requested file must load.
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };

    match cli.command {
        Command::Replay {
            trace,
            save_tiles,
            tessdata,
        } => replay(config, paths, trace, save_tiles, tessdata).await,
        Command::Config { write } => {
            print!("{}", toml::to_string_pretty(&config)?);
            if write {
                match &cli.config {
                    Some(path) => config.save_to(path)?,
                    None => config.save()?,
                }
                let written = cli.config.as_ref().unwrap_or(&paths.settings_file);
                log::info!("Wrote {}", written.display());
            }
            Ok(())
        }
    }
}

async fn replay(
    config: AppConfig,
    paths: AppPaths,
    trace_path: PathBuf,
    save_tiles: Option<PathBuf>,
    tessdata: Option<String>,
) -> Result<()> {
    let preferences = Preferences::load().unwrap_or_else(|e| {
        log::warn!("Failed to load preferences ({e}); using defaults");
        Preferences::default()
    });

    let trace = Arc::new(Trace::load(&trace_path)?);
    log::info!(
        "Loaded {} frames from {} ({} ms/frame)",
        trace.len(),
        trace_path.display(),
        trace.frame_interval_ms
    );

    let base = base_engine(tessdata);
    let engine: Arc<dyn RecognitionEngine> = match save_tiles {
        Some(dir) => {
            let recorder = TileRecorder::new(base, dir);
            log::info!("Saving OCR tiles to {}", recorder.dir().display());
            Arc::new(recorder)
        }
        None => Arc::from(base),
    };

    let state = new_shared_state(preferences.language);
    let (tx, rx) = mpsc::channel::<Event>(64);

    let coordinator = Coordinator::new(
        config.clone(),
        Arc::clone(&state),
        engine,
        Arc::new(ReplayCamera::new(Arc::clone(&trace))),
        Arc::new(ReplayTracker::new(trace, config.hands.clone())),
        tx.clone(),
    )
    .with_preferences_path(paths.preferences_file);

    let task = tokio::spawn(coordinator.run(rx));
    tx.send(Event::StartCamera).await?;

    let mut ticker = tokio::time::interval(Duration::from_millis(20));
    let mut last_status = None;
    let failure = loop {
        ticker.tick().await;

        let st = state.lock().unwrap();
        if last_status != Some(st.status) {
            log::info!("[{}] {}", st.pipeline.label(), st.status_text());
            last_status = Some(st.status);
        }

        if st.status.key == MessageKey::StatusError {
            break Some(st.status_text());
        }
        if st.stream_ended && !st.pipeline.is_busy() {
            break None;
        }
    };

    tx.send(Event::Shutdown).await?;
    task.await?;

    if let Some(message) = failure {
        bail!("{message}");
    }

    let st = state.lock().unwrap();
    println!("{}", st.output_label());
    log::info!("Confidence of last character: {}", st.confidence_label());
    Ok(())
}

// ---------------------------------------------------------------------------
// OCR engine selection
// ---------------------------------------------------------------------------

#[cfg(feature = "tesseract")]
fn base_engine(tessdata: Option<String>) -> Box<dyn RecognitionEngine> {
    log::info!("Using Tesseract OCR");
    Box::new(air_writer::ocr::TesseractEngine::new(tessdata))
}

#[cfg(not(feature = "tesseract"))]
fn base_engine(tessdata: Option<String>) -> Box<dyn RecognitionEngine> {
    if tessdata.is_some() {
        log::warn!("--tessdata ignored: built without the `tesseract` feature");
    }
    log::warn!("No OCR backend compiled in; recognition will fail.");
    Box::new(air_writer::ocr::UnavailableEngine::new(
        "air-writer was built without the `tesseract` feature",
    ))
}
