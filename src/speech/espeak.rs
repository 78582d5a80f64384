use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};

use super::SpeechSynthesizer;

const DEFAULT_PROGRAM: &str = "espeak";
const DEFAULT_VOICE: &str = "en";
const DEFAULT_RATE_WPM: u32 = 150;

/// Command-line speech engine settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechSettings {
    /// Executable to run (`espeak` or `espeak-ng`).
    pub program: String,
    /// Voice name passed with `-v`.
    pub voice: String,
    /// Words per minute passed with `-s`.
    pub rate_wpm: u32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            rate_wpm: DEFAULT_RATE_WPM,
        }
    }
}

/// Speaks through an external espeak process.
///
/// Each sentence spawns one process that plays the audio and exits on its
/// own. The synthesizer never waits for playback; exited processes are
/// reaped on later calls and when the synthesizer is dropped.
pub struct EspeakSynthesizer {
    settings: SpeechSettings,
    children: Vec<Child>,
}

impl EspeakSynthesizer {
    pub fn new(settings: SpeechSettings) -> Self {
        Self {
            settings,
            children: Vec::new(),
        }
    }

    pub fn settings(&self) -> &SpeechSettings {
        &self.settings
    }

    /// Arguments for one utterance, text last.
    fn args(&self, text: &str) -> Vec<String> {
        vec![
            "-v".to_string(),
            self.settings.voice.clone(),
            "-s".to_string(),
            self.settings.rate_wpm.to_string(),
            text.to_string(),
        ]
    }

    /// Number of spawned processes not yet known to have exited.
    pub fn pending(&mut self) -> usize {
        self.reap();
        self.children.len()
    }

    fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        Self::new(SpeechSettings::default())
    }
}

impl SpeechSynthesizer for EspeakSynthesizer {
    fn name(&self) -> &'static str {
        "espeak"
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        self.reap();

        let text = sanitize(text);
        if text.is_empty() {
            return Ok(());
        }

        let child = Command::new(&self.settings.program)
            .args(self.args(&text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| {
                format!("failed to start speech engine '{}'", self.settings.program)
            })?;
        log::debug!("speech: spawned {} (pid {})", self.settings.program, child.id());
        self.children.push(child);
        Ok(())
    }
}

impl Drop for EspeakSynthesizer {
    fn drop(&mut self) {
        self.reap();
        if !self.children.is_empty() {
            log::debug!(
                "speech: {} utterance(s) still playing at shutdown",
                self.children.len()
            );
        }
    }
}

/// Drop control characters and surrounding whitespace.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_voice_and_rate_before_text() {
        let synth = EspeakSynthesizer::default();
        assert_eq!(
            synth.args("Stop."),
            vec!["-v", "en", "-s", "150", "Stop."]
        );
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize("knife\non the left.\u{7}"), "knife on the left.");
        assert_eq!(sanitize(" \t\r\n"), "");
    }

    #[test]
    fn blank_text_spawns_nothing() {
        let mut synth = EspeakSynthesizer::new(SpeechSettings {
            program: "/nonexistent/espeak".to_string(),
            ..SpeechSettings::default()
        });
        assert!(synth.speak("\n").is_ok());
        assert_eq!(synth.pending(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn finished_utterances_are_reaped() {
        let mut synth = EspeakSynthesizer::new(SpeechSettings {
            program: "true".to_string(),
            ..SpeechSettings::default()
        });
        synth.speak("Path is clear. Move forward.").unwrap();
        synth.speak("Stop.").unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while synth.pending() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(synth.pending(), 0);
    }

    #[test]
    fn missing_engine_is_an_error() {
        let mut synth = EspeakSynthesizer::new(SpeechSettings {
            program: "/nonexistent/espeak".to_string(),
            ..SpeechSettings::default()
        });
        let err = synth.speak("Stop.").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/espeak"));
    }
}
