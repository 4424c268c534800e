//! Sample definitions loaded from YAML.
//!
//! A sample is a set of template lines plus the tokens substituted into them.
//! Loading converts every [`RawToken`] into a validated [`Token`] stamped with
//! the owning sample's name.

use crate::error::ConfigError;
use crate::token::{RawToken, Token};
use crate::window::{resolve_time, TimeWindow};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn default_now() -> String {
    "now".to_string()
}

/// Sample as written in a sample file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSample {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    disabled: bool,
    #[serde(default = "default_now")]
    earliest: String,
    #[serde(default = "default_now")]
    latest: String,
    #[serde(default)]
    randomize_events: bool,
    #[serde(default)]
    tokens: Vec<RawToken>,
    #[serde(default)]
    lines: Vec<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSampleSet {
    samples: Vec<RawSample>,
}

/// A template sample with its tokens.
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: String,
    pub description: Option<String>,
    pub disabled: bool,
    /// Time specification for the window start (`now`, `-1h`, RFC 3339)
    pub earliest: String,
    /// Time specification for the window end
    pub latest: String,
    /// Pick lines uniformly at random instead of cycling through them
    pub randomize_events: bool,
    /// Tokens in application order
    pub tokens: Vec<Token>,
    /// Template lines, each a map of field name to text
    pub lines: Vec<BTreeMap<String, String>>,
}

impl Sample {
    /// Resolve `earliest`/`latest` against `now`.
    pub fn window(&self, now: DateTime<Utc>) -> Result<TimeWindow, ConfigError> {
        let earliest = resolve_time(&self.earliest, now)?;
        let latest = resolve_time(&self.latest, now)?;
        TimeWindow::new(earliest, latest)
    }

    /// Get a token by name.
    pub fn get_token(&self, name: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.name == name)
    }

    fn from_raw(raw: RawSample) -> Result<Self, ConfigError> {
        let tokens = raw
            .tokens
            .into_iter()
            .map(|t| Token::from_raw(t, &raw.name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: raw.name,
            description: raw.description,
            disabled: raw.disabled,
            earliest: raw.earliest,
            latest: raw.latest,
            randomize_events: raw.randomize_events,
            tokens,
            lines: raw.lines,
        })
    }
}

/// All samples from one sample file.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    pub samples: Vec<Sample>,
}

impl SampleSet {
    /// Load samples from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse samples from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawSampleSet = serde_yaml::from_str(yaml)?;
        let samples = raw
            .samples
            .into_iter()
            .map(Sample::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { samples })
    }

    /// Get a sample by name.
    pub fn get_sample(&self, name: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.name == name)
    }

    /// Get a sample by name, or fail with [`ConfigError::SampleNotFound`].
    pub fn require_sample(&self, name: &str) -> Result<&Sample, ConfigError> {
        self.get_sample(name)
            .ok_or_else(|| ConfigError::SampleNotFound(name.to_string()))
    }

    /// Samples that are not disabled.
    pub fn enabled(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(|s| !s.disabled)
    }

    pub fn sample_names(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.name.as_str()).collect()
    }
}
