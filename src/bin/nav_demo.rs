//! nav_demo - end-to-end synthetic run of the navigation assistant

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use nav_assist::ui::{Ui, UiMode};
use nav_assist::{
    open_source, FrameSource, NavConfig, NavigationSession, SyntheticConfig, DEFAULT_COOLDOWN,
};

const DEMO_INPUT: &str = "stub://walk";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Frames per second for the synthetic walk.
    #[arg(long, default_value_t = 10)]
    fps: u32,
    /// Seed for box jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Seconds before an unchanged instruction is repeated.
    #[arg(long, default_value_t = DEFAULT_COOLDOWN.as_secs_f64())]
    cooldown: f64,
    /// Optional JSON Lines file receiving every frame report.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }

    let ui = Ui::new(UiMode::Auto, std::io::stderr().is_terminal());
    let configure = ui.stage("Configure session");
    let config = NavConfig {
        cooldown: Duration::try_from_secs_f64(args.cooldown)
            .map_err(|_| anyhow!("cooldown must be a non-negative number of seconds"))?,
        ..NavConfig::default()
    };

    // Speech goes to the log instead of the audio device.
    let utterances: Rc<RefCell<Vec<(Duration, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let clock = Rc::new(RefCell::new(Duration::ZERO));
    let mut session = {
        let utterances = Rc::clone(&utterances);
        let clock = Rc::clone(&clock);
        NavigationSession::from_config(&config, move |text: &str| -> Result<()> {
            let at = *clock.borrow();
            log::info!("say @{:>5.1}s: {}", at.as_secs_f64(), text);
            utterances.borrow_mut().push((at, text.to_string()));
            Ok(())
        })
    };

    drop(configure);

    let mut replay = ui.stage("Replay synthetic walk");
    let mut source = open_source(
        DEMO_INPUT,
        SyntheticConfig {
            fps: args.fps,
            seed: args.seed,
            ..SyntheticConfig::default()
        },
    )?;
    source.connect()?;

    let mut writer = match &args.out {
        Some(path) => Some(BufWriter::new(
            fs::File::create(path)
                .with_context(|| format!("creating report file {}", path.display()))?,
        )),
        None => None,
    };

    let mut instructions = BTreeSet::new();
    while let Some(frame) = source.next_frame()? {
        let now = frame.timestamp.unwrap_or_default();
        *clock.borrow_mut() = now;
        let report = session.process_frame(&frame, now);
        instructions.insert(report.sentence.clone());
        if let Some(writer) = writer.as_mut() {
            serde_json::to_writer(&mut *writer, &report)?;
            writeln!(writer)?;
        }
    }
    if let Some(mut writer) = writer {
        writer.flush()?;
    }
    replay.set_detail(format!("{} frames", session.stats().frames));
    drop(replay);

    let stats = session.stats();
    println!("demo summary:");
    println!("  frames processed: {}", stats.frames);
    println!("  announcements: {}", stats.announcements);
    println!("  distinct instructions: {}", instructions.len());
    for sentence in &instructions {
        println!("    - {}", sentence);
    }
    println!("  spoken timeline:");
    for (at, text) in utterances.borrow().iter() {
        println!("    {:>5.1}s  {}", at.as_secs_f64(), text);
    }
    if let Some(path) = &args.out {
        println!("  reports: {}", path.display());
    }
    println!("next steps:");
    println!("  cargo run --bin navassist -- --input {} --pace", DEMO_INPUT);

    Ok(())
}
