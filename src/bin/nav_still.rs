//! nav_still - describe a single image's detections
//!
//! Reads one JSON frame (the detector output for a still image), prints the
//! instruction and speaks it once. The repeat throttle does not apply.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use nav_assist::ui::{Ui, UiMode};
use nav_assist::{
    load_still_frame, EspeakSynthesizer, MutedSynthesizer, NavConfig, NavigationSession,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON file with the frame's detections.
    frame: PathBuf,
    /// Config file (JSON, or TOML with a .toml extension).
    #[arg(long, env = "NAV_CONFIG")]
    config: Option<PathBuf>,
    /// Minimum detector confidence (0-1).
    #[arg(long)]
    confidence: Option<f32>,
    /// Print only; never speak.
    #[arg(long)]
    no_voice: bool,
    /// Mirror boxes horizontally before classifying.
    #[arg(long)]
    mirror: bool,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = NavConfig::load_from(args.config.as_deref())?;
    if let Some(confidence) = args.confidence {
        config.confidence_threshold = confidence;
    }
    if args.no_voice {
        config.voice_enabled = false;
    }
    if args.mirror {
        config.mirror = true;
    }
    config.validate()?;

    let ui = Ui::new(UiMode::Plain, false);
    let frame = {
        let mut stage = ui.stage("Load frame");
        let frame = load_still_frame(&args.frame)?;
        stage.set_detail(args.frame.display().to_string());
        frame
    };
    let frame = if config.mirror { frame.mirrored() } else { frame };
    log::debug!(
        "frame {}x{} with {} detection(s)",
        frame.width,
        frame.height,
        frame.detections.len()
    );

    let mut session = if config.voice_enabled {
        NavigationSession::from_config(&config, EspeakSynthesizer::new(config.speech.clone()))
    } else {
        NavigationSession::from_config(&config, MutedSynthesizer)
    };

    let report = session.describe_still(&frame);
    let mode = if args.json {
        UiMode::Json
    } else {
        UiMode::Plain
    };
    let display = Ui::new(mode, false).instructions();
    display.show(&report)?;
    display.finish();
    Ok(())
}
