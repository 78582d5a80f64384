//! Speech output.
//!
//! The session hands each sentence that passed the throttle to a
//! `SpeechSynthesizer`. Implementations must return quickly: audio playback
//! happens out of band and its completion is never awaited.

mod espeak;

use anyhow::Result;

pub use espeak::{EspeakSynthesizer, SpeechSettings};

/// Something that can announce a sentence.
pub trait SpeechSynthesizer {
    /// Engine identifier for logs.
    fn name(&self) -> &'static str {
        "callback"
    }

    /// Start announcing `text`. Errors are reported by the caller and never
    /// retried.
    fn speak(&mut self, text: &str) -> Result<()>;
}

impl<F> SpeechSynthesizer for F
where
    F: FnMut(&str) -> Result<()>,
{
    fn speak(&mut self, text: &str) -> Result<()> {
        self(text)
    }
}

/// Synthesizer that accepts every sentence and produces no sound.
#[derive(Clone, Copy, Debug, Default)]
pub struct MutedSynthesizer;

impl SpeechSynthesizer for MutedSynthesizer {
    fn name(&self) -> &'static str {
        "muted"
    }

    fn speak(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn closures_are_synthesizers() {
        let mut spoken = Vec::new();
        {
            let mut synth = |text: &str| -> Result<()> {
                spoken.push(text.to_string());
                Ok(())
            };
            synth.speak("Stop.").unwrap();
            assert_eq!(SpeechSynthesizer::name(&synth), "callback");
        }
        assert_eq!(spoken, vec!["Stop."]);
    }

    #[test]
    fn boxed_synthesizers_dispatch() {
        let mut synth: Box<dyn SpeechSynthesizer> =
            Box::new(|_: &str| -> Result<()> { Err(anyhow!("no audio device")) });
        assert!(synth.speak("Stop.").is_err());

        let mut muted: Box<dyn SpeechSynthesizer> = Box::new(MutedSynthesizer);
        assert_eq!(muted.name(), "muted");
        assert!(muted.speak("Stop.").is_ok());
    }
}
