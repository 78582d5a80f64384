//! navassist - live / recorded-video navigation assistant
//!
//! This runner:
//! 1. Reads detector output frame by frame (JSON Lines file, stdin, or stub://)
//! 2. Plans one instruction per frame and displays it
//! 3. Speaks the instruction when it changes, or again after the cooldown
//! 4. Stops at end of input or on Ctrl-C

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use nav_assist::ui::{Ui, UiMode};
use nav_assist::{
    open_source, EspeakSynthesizer, FrameSource, MutedSynthesizer, NavConfig,
    NavigationSession, SyntheticConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Detection input: a JSON Lines file, `-` for stdin, or `stub://walk`.
    #[arg(long, default_value = "-")]
    input: String,
    /// Config file (JSON, or TOML with a .toml extension).
    #[arg(long, env = "NAV_CONFIG")]
    config: Option<PathBuf>,
    /// Minimum detector confidence (0-1).
    #[arg(long)]
    confidence: Option<f32>,
    /// Seconds before an unchanged instruction is repeated.
    #[arg(long)]
    cooldown: Option<f64>,
    /// Display only; never speak.
    #[arg(long)]
    no_voice: bool,
    /// Mirror boxes horizontally (front-facing webcam preview).
    #[arg(long)]
    mirror: bool,
    /// Ignore frame timestamps and use the wall clock for the cooldown.
    #[arg(long)]
    wall_clock: bool,
    /// Sleep between frames to follow their timestamps.
    #[arg(long)]
    pace: bool,
    /// Output style.
    #[arg(long, value_enum, default_value_t = UiMode::Auto)]
    ui: UiMode,
    /// Print one JSON report per frame on stdout.
    #[arg(long)]
    json: bool,
    /// Frame rate for stub:// inputs.
    #[arg(long, default_value_t = 10)]
    fps: u32,
    /// Seed for stub:// inputs.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let ui = Ui::from_args(args.ui, args.json, std::io::stderr().is_terminal());

    let config = {
        let mut stage = ui.stage("Load configuration");
        let config = load_config(&args)?;
        stage.set_detail(match &args.config {
            Some(path) => path.display().to_string(),
            None => "defaults + environment".to_string(),
        });
        config
    };

    let mut source = {
        let mut stage = ui.stage("Open input");
        let mut source = open_source(
            &args.input,
            SyntheticConfig {
                fps: args.fps,
                seed: args.seed,
                ..SyntheticConfig::default()
            },
        )?;
        source.connect()?;
        stage.set_detail(source.stats().location);
        source
    };

    let mut session = {
        let mut stage = ui.stage("Prepare speech");
        let session = if config.voice_enabled {
            NavigationSession::from_config(&config, EspeakSynthesizer::new(config.speech.clone()))
        } else {
            NavigationSession::from_config(&config, MutedSynthesizer)
        };
        stage.set_detail(session.synthesizer_name());
        session
    };

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    log::info!(
        "navassist running. input={} voice={} ({}) confidence={:.2} cooldown={:.1}s",
        args.input,
        session.voice_enabled(),
        session.synthesizer_name(),
        config.confidence_threshold,
        config.cooldown.as_secs_f64()
    );

    let display = ui.instructions();
    let started = Instant::now();
    let mut last_health_log = Instant::now();

    while running.load(Ordering::SeqCst) {
        let Some(frame) = source.next_frame()? else {
            log::info!("end of input");
            break;
        };
        let frame = if config.mirror { frame.mirrored() } else { frame };

        if args.pace {
            if let Some(ts) = frame.timestamp {
                let elapsed = started.elapsed();
                if ts > elapsed {
                    std::thread::sleep(ts - elapsed);
                }
            }
        }

        let now = match frame.timestamp {
            Some(ts) if !args.wall_clock => ts,
            _ => started.elapsed(),
        };
        let report = session.process_frame(&frame, now);
        display.show(&report)?;

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::debug!(
                "source health={} frames={} location={}",
                source.is_healthy(),
                stats.frames_read,
                stats.location
            );
            last_health_log = Instant::now();
        }
    }
    display.finish();

    if !running.load(Ordering::SeqCst) {
        log::info!("shutdown signal received, stopping");
    }

    let stats = session.stats();
    eprintln!("navassist summary:");
    eprintln!("  frames processed: {}", stats.frames);
    eprintln!("  announcements: {}", stats.announcements);
    eprintln!("  spoken: {}", stats.spoken);
    eprintln!("  speech failures: {}", stats.speech_failures);
    eprintln!("  input: {}", source.stats().location);
    Ok(())
}

fn load_config(args: &Args) -> Result<NavConfig> {
    let mut config = NavConfig::load_from(args.config.as_deref())?;
    if let Some(confidence) = args.confidence {
        config.confidence_threshold = confidence;
    }
    if let Some(cooldown) = args.cooldown {
        config.cooldown = Duration::try_from_secs_f64(cooldown)
            .map_err(|_| anyhow!("--cooldown must be a non-negative number of seconds"))?;
    }
    if args.no_voice {
        config.voice_enabled = false;
    }
    if args.mirror {
        config.mirror = true;
    }
    config.validate()?;
    Ok(config)
}
