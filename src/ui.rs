//! Terminal presentation.
//!
//! Stage banners and the per-frame instruction line. Pretty mode keeps the
//! current instruction on a single live spinner line; plain mode prints one
//! line per frame; JSON mode writes one `FrameReport` per line to stdout.

use anyhow::Result;
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::{Duration, Instant};

use crate::session::FrameReport;

/// Output style selected with `--ui`. `Json` is chosen by `--json` instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
    #[value(skip)]
    Json,
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    pub fn from_args(mode: UiMode, json: bool, is_tty: bool) -> Self {
        let mode = if json { UiMode::Json } else { mode };
        Self::new(mode, is_tty)
    }

    fn use_pretty(&self) -> bool {
        self.is_tty && matches!(self.mode, UiMode::Pretty | UiMode::Auto)
    }

    /// Start a named setup step; it reports its duration when dropped.
    pub fn stage(&self, name: &str) -> StageGuard {
        let spinner = if self.use_pretty() {
            let spinner = spinner();
            spinner.set_message(format!("{name}…"));
            Some(spinner)
        } else {
            eprintln!("==> {}", name);
            None
        };
        StageGuard {
            name: name.to_string(),
            detail: None,
            start: Instant::now(),
            spinner,
        }
    }

    /// Presenter for the instruction stream.
    pub fn instructions(&self) -> InstructionDisplay {
        let live = self.use_pretty().then(spinner);
        InstructionDisplay {
            mode: self.mode,
            live,
        }
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_draw_target(ProgressDrawTarget::stderr());
    spinner.enable_steady_tick(Duration::from_millis(120));
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner
}

pub struct StageGuard {
    name: String,
    detail: Option<String>,
    start: Instant,
    spinner: Option<ProgressBar>,
}

impl StageGuard {
    /// Extra text for the completion line, e.g. what the step resolved to.
    pub fn set_detail(&mut self, detail: impl Into<String>) {
        self.detail = Some(detail.into());
    }
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        let line = stage_done_line(&self.name, self.detail.as_deref(), self.start.elapsed());
        match &self.spinner {
            Some(spinner) => spinner.finish_with_message(line),
            None => eprintln!("{line}"),
        }
    }
}

fn stage_done_line(name: &str, detail: Option<&str>, elapsed: Duration) -> String {
    match detail {
        Some(detail) => format!("✔ {}: {} ({})", name, detail, format_duration(elapsed)),
        None => format!("✔ {} ({})", name, format_duration(elapsed)),
    }
}

/// Shows each frame's instruction, whether or not it was spoken.
pub struct InstructionDisplay {
    mode: UiMode,
    live: Option<ProgressBar>,
}

impl InstructionDisplay {
    pub fn show(&self, report: &FrameReport) -> Result<()> {
        if let Some(live) = &self.live {
            live.set_message(format_report(report));
            if report.spoken {
                live.println(format!("🔊 {}", report.sentence));
            }
            return Ok(());
        }

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if self.mode == UiMode::Json {
            serde_json::to_writer(&mut out, report)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", format_report(report))?;
        }
        Ok(())
    }

    pub fn finish(self) {
        if let Some(live) = self.live {
            live.finish_and_clear();
        }
    }
}

pub fn format_report(report: &FrameReport) -> String {
    let marker = if report.spoken {
        " [spoken]"
    } else if report.speech_error.is_some() {
        " [speech failed]"
    } else if report.announced {
        " [muted]"
    } else {
        ""
    };
    format!("#{} {}{}", report.frame_index, report.sentence, marker)
}

pub fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
