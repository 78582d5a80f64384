use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::planner::{ClassSets, DEFAULT_DANGER_CLASSES, DEFAULT_MOVING_CLASSES};
use crate::session::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::speech::SpeechSettings;
use crate::throttle::DEFAULT_COOLDOWN;

const MAX_RATE_WPM: u32 = 1000;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct NavConfigFile {
    confidence_threshold: Option<f32>,
    voice_enabled: Option<bool>,
    cooldown_secs: Option<f64>,
    mirror: Option<bool>,
    classes: Option<ClassesConfigFile>,
    speech: Option<SpeechConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ClassesConfigFile {
    danger: Option<Vec<String>>,
    moving: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SpeechConfigFile {
    program: Option<String>,
    voice: Option<String>,
    rate_wpm: Option<u32>,
}

/// Session configuration: file (`NAV_CONFIG`), then environment, then validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavConfig {
    pub confidence_threshold: f32,
    pub voice_enabled: bool,
    pub cooldown: Duration,
    /// Mirror boxes horizontally before classifying (front-facing webcams).
    pub mirror: bool,
    pub danger_classes: Vec<String>,
    pub moving_classes: Vec<String>,
    pub speech: SpeechSettings,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            voice_enabled: true,
            cooldown: DEFAULT_COOLDOWN,
            mirror: false,
            danger_classes: to_strings(DEFAULT_DANGER_CLASSES),
            moving_classes: to_strings(DEFAULT_MOVING_CLASSES),
            speech: SpeechSettings::default(),
        }
    }
}

impl NavConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("NAV_CONFIG")
            .ok()
            .filter(|path| !path.trim().is_empty());
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Like `load`, with the config file chosen by the caller (e.g. a CLI flag).
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: NavConfigFile) -> Result<Self> {
        let defaults = Self::default();
        let cooldown = match file.cooldown_secs {
            Some(secs) => cooldown_from_secs(secs)?,
            None => defaults.cooldown,
        };
        let danger_classes = file
            .classes
            .as_ref()
            .and_then(|classes| classes.danger.clone())
            .unwrap_or(defaults.danger_classes);
        let moving_classes = file
            .classes
            .and_then(|classes| classes.moving)
            .unwrap_or(defaults.moving_classes);
        let speech = match file.speech {
            Some(speech) => SpeechSettings {
                program: speech.program.unwrap_or(defaults.speech.program),
                voice: speech.voice.unwrap_or(defaults.speech.voice),
                rate_wpm: speech.rate_wpm.unwrap_or(defaults.speech.rate_wpm),
            },
            None => defaults.speech,
        };
        Ok(Self {
            confidence_threshold: file
                .confidence_threshold
                .unwrap_or(defaults.confidence_threshold),
            voice_enabled: file.voice_enabled.unwrap_or(defaults.voice_enabled),
            cooldown,
            mirror: file.mirror.unwrap_or(defaults.mirror),
            danger_classes,
            moving_classes,
            speech,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("NAV_CONFIDENCE") {
            self.confidence_threshold = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("NAV_CONFIDENCE must be a number between 0 and 1"))?;
        }
        if let Ok(value) = std::env::var("NAV_VOICE") {
            self.voice_enabled = parse_bool("NAV_VOICE", &value)?;
        }
        if let Ok(value) = std::env::var("NAV_COOLDOWN_SECS") {
            let secs: f64 = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("NAV_COOLDOWN_SECS must be a number of seconds"))?;
            self.cooldown = cooldown_from_secs(secs)?;
        }
        if let Ok(value) = std::env::var("NAV_MIRROR") {
            self.mirror = parse_bool("NAV_MIRROR", &value)?;
        }
        if let Ok(value) = std::env::var("NAV_DANGER_CLASSES") {
            let parsed = split_csv(&value);
            if !parsed.is_empty() {
                self.danger_classes = parsed;
            }
        }
        if let Ok(value) = std::env::var("NAV_MOVING_CLASSES") {
            let parsed = split_csv(&value);
            if !parsed.is_empty() {
                self.moving_classes = parsed;
            }
        }
        if let Ok(program) = std::env::var("NAV_SPEECH_PROGRAM") {
            if !program.trim().is_empty() {
                self.speech.program = program.trim().to_string();
            }
        }
        if let Ok(voice) = std::env::var("NAV_SPEECH_VOICE") {
            if !voice.trim().is_empty() {
                self.speech.voice = voice.trim().to_string();
            }
        }
        if let Ok(rate) = std::env::var("NAV_SPEECH_RATE") {
            self.speech.rate_wpm = rate
                .trim()
                .parse()
                .map_err(|_| anyhow!("NAV_SPEECH_RATE must be an integer words-per-minute"))?;
        }
        Ok(())
    }

    pub fn validate(&mut self) -> Result<()> {
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(anyhow!(
                "confidence threshold must be within 0..=1 (got {})",
                self.confidence_threshold
            ));
        }
        if self.speech.rate_wpm == 0 || self.speech.rate_wpm > MAX_RATE_WPM {
            return Err(anyhow!(
                "speech rate must be within 1..={} words per minute",
                MAX_RATE_WPM
            ));
        }
        if self.speech.program.trim().is_empty() {
            return Err(anyhow!("speech program must not be empty"));
        }
        if self.speech.voice.trim().is_empty() {
            return Err(anyhow!("speech voice must not be empty"));
        }

        self.danger_classes = normalize_classes("danger", &self.danger_classes)?;
        self.moving_classes = normalize_classes("moving", &self.moving_classes)?;
        let classes = self.class_sets();
        for shared in classes.overlap() {
            log::warn!(
                "class '{}' is listed as both danger and moving; treating it as danger",
                shared
            );
        }
        Ok(())
    }

    pub fn class_sets(&self) -> ClassSets {
        ClassSets::new(
            self.danger_classes.iter().cloned(),
            self.moving_classes.iter().cloned(),
        )
    }
}

fn read_config_file(path: &Path) -> Result<NavConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg: NavConfigFile = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn cooldown_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| anyhow!("cooldown must be a finite, non-negative number of seconds"))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("{} must be a boolean (got '{}')", name, other)),
    }
}

fn normalize_classes(kind: &str, classes: &[String]) -> Result<Vec<String>> {
    classes
        .iter()
        .map(|class| {
            let trimmed = class.trim();
            if trimmed.is_empty() {
                Err(anyhow!("{} class names must not be empty", kind))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Priority;

    #[test]
    fn defaults_match_the_stock_vocabulary() {
        let mut cfg = NavConfig::default();
        cfg.validate().unwrap();

        assert_eq!(cfg.confidence_threshold, 0.5);
        assert!(cfg.voice_enabled);
        assert_eq!(cfg.cooldown, Duration::from_secs(3));
        let classes = cfg.class_sets();
        assert_eq!(classes.priority_of("gun"), Priority::Danger);
        assert_eq!(classes.priority_of("motorcycle"), Priority::Moving);
        assert_eq!(classes.priority_of("chair"), Priority::Other);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file: NavConfigFile = serde_json::from_str(
            r#"{ "cooldown_secs": 1.5, "speech": { "voice": "en-us" } }"#,
        )
        .unwrap();
        let cfg = NavConfig::from_file(file).unwrap();

        assert_eq!(cfg.cooldown, Duration::from_millis(1500));
        assert_eq!(cfg.speech.voice, "en-us");
        assert_eq!(cfg.speech.program, "espeak");
        assert_eq!(cfg.speech.rate_wpm, 150);
        assert_eq!(cfg.danger_classes, NavConfig::default().danger_classes);
    }

    #[test]
    fn negative_cooldown_is_rejected() {
        let file: NavConfigFile = serde_json::from_str(r#"{ "cooldown_secs": -1.0 }"#).unwrap();
        assert!(NavConfig::from_file(file).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<NavConfigFile>(r#"{ "cooldown": 3 }"#).is_err());
    }

    #[test]
    fn validation_bounds() {
        let mut cfg = NavConfig {
            confidence_threshold: 1.5,
            ..NavConfig::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = NavConfig {
            confidence_threshold: f32::NAN,
            ..NavConfig::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = NavConfig::default();
        cfg.speech.rate_wpm = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = NavConfig {
            moving_classes: vec!["person".to_string(), "  ".to_string()],
            ..NavConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn class_names_are_trimmed() {
        let mut cfg = NavConfig {
            danger_classes: vec![" knife ".to_string()],
            ..NavConfig::default()
        };
        cfg.validate().unwrap();
        assert_eq!(cfg.danger_classes, vec!["knife"]);
    }

    #[test]
    fn parses_boolean_spellings() {
        assert!(parse_bool("X", "On").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
