//! Token definitions.
//!
//! A [`Token`] pairs a match specification (where in the event to substitute)
//! with a [`TokenValue`] (what to substitute). Tokens are written in YAML in
//! the flat shape of [`RawToken`] and converted into the typed form once, at
//! load time, so every strategy carries exactly the parameters it needs.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field a token applies to when none is configured.
pub const DEFAULT_FIELD: &str = "_raw";

// ============================================================================
// Typed Token
// ============================================================================

/// How a token's match pattern is located inside an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFormat {
    /// Literal substring match
    Template,
    /// Regular expression; the first capture group is replaced when present
    Regex,
}

impl TokenFormat {
    fn parse(format: &str) -> Option<Self> {
        match format {
            "template" => Some(Self::Template),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }
}

/// Rendering of a generated timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampEncoding {
    /// strftime-style format string (`type: timestamp`)
    Strftime,
    /// Reference-time layout such as `2006-01-02 15:04:05` (`type: gotimestamp`)
    Layout,
    /// Decimal seconds since the Unix epoch (`type: epochtimestamp`)
    Epoch,
}

/// Randomized primitive selected by a `random` token's `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RandomKind {
    /// Integer in `[lower, upper)`
    Int { lower: i64, upper: i64 },
    /// Fixed-point value in `[lower, upper)` with `precision` fractional digits
    Float {
        lower: i64,
        upper: i64,
        precision: u32,
    },
    /// `length` characters from the alphanumeric alphabet
    String { length: usize },
    /// `length` characters from the hexadecimal alphabet
    Hex { length: usize },
    /// Version 4 UUID
    Guid,
    Ipv4,
    Ipv6,
}

impl RandomKind {
    /// Name used for this kind in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int { .. } => "int",
            Self::Float { .. } => "float",
            Self::String { .. } => "string",
            Self::Hex { .. } => "hex",
            Self::Guid => "guid",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }
}

/// A weighted option of a `weightedChoice` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedChoice {
    pub weight: u64,
    pub choice: String,
}

impl WeightedChoice {
    pub fn new(weight: u64, choice: impl Into<String>) -> Self {
        Self {
            weight,
            choice: choice.into(),
        }
    }
}

/// Value-generation strategy of a token, one variant per token type.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// Literal replacement text
    Static { replacement: String },

    /// Random instant within the time window, correlated through the choice slot
    Timestamp {
        encoding: TimestampEncoding,
        /// Format string; unused for [`TimestampEncoding::Epoch`]
        format: String,
    },

    /// Independent random primitive
    Random(RandomKind),

    /// Uniform pick from a literal list
    Choice { choices: Vec<String> },

    /// Pick proportional to integer weights, in list order
    WeightedChoice { choices: Vec<WeightedChoice> },

    /// Uniform pick of a row, surfacing the `src_field` column
    FieldChoice {
        rows: Vec<BTreeMap<String, String>>,
        src_field: String,
    },

    /// User-supplied script evaluated in a fresh sandbox
    Script {
        source: String,
        /// Initial entries of the script's `state` table
        init: BTreeMap<String, String>,
    },
}

impl TokenValue {
    /// Configuration name of the token type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Static { .. } => "static",
            Self::Timestamp { encoding, .. } => match encoding {
                TimestampEncoding::Strftime => "timestamp",
                TimestampEncoding::Layout => "gotimestamp",
                TimestampEncoding::Epoch => "epochtimestamp",
            },
            Self::Random(_) => "random",
            Self::Choice { .. } => "choice",
            Self::WeightedChoice { .. } => "weightedChoice",
            Self::FieldChoice { .. } => "fieldChoice",
            Self::Script { .. } => "script",
        }
    }

    /// Whether generation reads or writes the shared choice slot.
    pub fn uses_choice_slot(&self) -> bool {
        matches!(
            self,
            Self::Timestamp { .. }
                | Self::Choice { .. }
                | Self::WeightedChoice { .. }
                | Self::FieldChoice { .. }
        )
    }

    /// Check the parameters this strategy needs, returning a reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Static { .. } | Self::Script { .. } => Ok(()),
            Self::Timestamp { encoding, format } => {
                if *encoding != TimestampEncoding::Epoch && format.is_empty() {
                    return Err("timestamp format (replacement) must not be empty".to_string());
                }
                Ok(())
            }
            Self::Random(kind) => validate_random(kind),
            Self::Choice { choices } => {
                if choices.is_empty() {
                    return Err("choice list must not be empty".to_string());
                }
                Ok(())
            }
            Self::WeightedChoice { choices } => {
                if choices.is_empty() {
                    return Err("weightedChoice list must not be empty".to_string());
                }
                let total = choices
                    .iter()
                    .try_fold(0u64, |acc, c| acc.checked_add(c.weight))
                    .ok_or_else(|| "total weight overflows".to_string())?;
                if total == 0 {
                    return Err("total weight must be positive".to_string());
                }
                Ok(())
            }
            Self::FieldChoice { rows, src_field } => {
                if rows.is_empty() {
                    return Err("fieldChoice list must not be empty".to_string());
                }
                if src_field.is_empty() {
                    return Err("srcField is required for fieldChoice".to_string());
                }
                if let Some(row) = rows.iter().position(|r| !r.contains_key(src_field)) {
                    return Err(format!("fieldChoice row {row} has no '{src_field}' column"));
                }
                Ok(())
            }
        }
    }
}

fn validate_random(kind: &RandomKind) -> Result<(), String> {
    match kind {
        RandomKind::Int { lower, upper } => {
            if upper <= lower {
                return Err(format!("upper ({upper}) must be greater than lower ({lower})"));
            }
            upper
                .checked_sub(*lower)
                .ok_or_else(|| "integer range overflows".to_string())?;
            Ok(())
        }
        RandomKind::Float {
            lower,
            upper,
            precision,
        } => {
            if upper <= lower {
                return Err(format!("upper ({upper}) must be greater than lower ({lower})"));
            }
            let scale = 10i64
                .checked_pow(*precision)
                .ok_or_else(|| format!("precision {precision} is too large"))?;
            let scaled_lower = lower.checked_mul(scale);
            let scaled_upper = upper.checked_mul(scale);
            match (scaled_lower, scaled_upper) {
                (Some(l), Some(u)) if u.checked_sub(l).is_some() => Ok(()),
                _ => Err(format!("bounds overflow at precision {precision}")),
            }
        }
        RandomKind::String { .. }
        | RandomKind::Hex { .. }
        | RandomKind::Guid
        | RandomKind::Ipv4
        | RandomKind::Ipv6 => Ok(()),
    }
}

/// One configured substitution site.
///
/// Immutable once built; the only per-call mutable state is the caller's
/// [`ChoiceSlot`](crate::ChoiceSlot).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token name
    pub name: String,
    /// Name of the owning sample, for diagnostics only
    pub sample: String,
    pub format: TokenFormat,
    /// Literal text or regular expression, depending on `format`
    pub pattern: String,
    /// Output field this token is applied to
    pub field: String,
    /// Tokens sharing a group share one choice slot per rendered event
    pub group: Option<u32>,
    pub value: TokenValue,
}

impl Token {
    /// Build and validate a token applied to the default field.
    pub fn new(
        name: impl Into<String>,
        format: TokenFormat,
        pattern: impl Into<String>,
        value: TokenValue,
    ) -> Result<Self, ConfigError> {
        let token = Self {
            name: name.into(),
            sample: String::new(),
            format,
            pattern: pattern.into(),
            field: DEFAULT_FIELD.to_string(),
            group: None,
            value,
        };
        token.validate()?;
        Ok(token)
    }

    /// Shorthand for a literal `template` token.
    pub fn template(
        name: impl Into<String>,
        pattern: impl Into<String>,
        value: TokenValue,
    ) -> Result<Self, ConfigError> {
        Self::new(name, TokenFormat::Template, pattern, value)
    }

    /// Shorthand for a `regex` token.
    pub fn regex(
        name: impl Into<String>,
        pattern: impl Into<String>,
        value: TokenValue,
    ) -> Result<Self, ConfigError> {
        Self::new(name, TokenFormat::Regex, pattern, value)
    }

    pub fn in_sample(mut self, sample: impl Into<String>) -> Self {
        self.sample = sample.into();
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }

    /// Validate the value parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern.is_empty() {
            return Err(self.invalid("token pattern must not be empty".to_string()));
        }
        self.value.validate().map_err(|reason| self.invalid(reason))
    }

    fn invalid(&self, reason: String) -> ConfigError {
        ConfigError::InvalidToken {
            sample: self.sample.clone(),
            token: self.name.clone(),
            reason,
        }
    }

    /// Convert the flat configuration record into a typed token.
    pub fn from_raw(raw: RawToken, sample: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidToken {
            sample: sample.to_string(),
            token: raw.name.clone(),
            reason,
        };
        let invalid_type = |kind: &str| ConfigError::InvalidTokenType {
            sample: sample.to_string(),
            token: raw.name.clone(),
            kind: kind.to_string(),
        };

        let format = match raw.format.as_deref() {
            None => TokenFormat::Template,
            Some(f) => {
                TokenFormat::parse(f).ok_or_else(|| invalid(format!("unknown format '{f}'")))?
            }
        };

        let replacement = || raw.replacement.clone().unwrap_or_default();

        let value = match raw.kind.as_str() {
            "static" => TokenValue::Static {
                replacement: replacement(),
            },
            "timestamp" | "gotimestamp" | "epochtimestamp" => TokenValue::Timestamp {
                encoding: match raw.kind.as_str() {
                    "timestamp" => TimestampEncoding::Strftime,
                    "gotimestamp" => TimestampEncoding::Layout,
                    _ => TimestampEncoding::Epoch,
                },
                format: replacement(),
            },
            "random" => {
                let lower = raw.lower.unwrap_or(0);
                let upper = raw.upper.unwrap_or(0);
                let length = raw.length.unwrap_or(0);
                let kind = match raw.replacement.as_deref().unwrap_or_default() {
                    "int" => RandomKind::Int { lower, upper },
                    "float" => RandomKind::Float {
                        lower,
                        upper,
                        precision: raw.precision.unwrap_or(0),
                    },
                    "string" => RandomKind::String { length },
                    "hex" => RandomKind::Hex { length },
                    "guid" => RandomKind::Guid,
                    "ipv4" => RandomKind::Ipv4,
                    "ipv6" => RandomKind::Ipv6,
                    other => return Err(invalid_type(&format!("random/{other}"))),
                };
                TokenValue::Random(kind)
            }
            "choice" => TokenValue::Choice {
                choices: raw.choice.clone(),
            },
            "weightedChoice" => TokenValue::WeightedChoice {
                choices: raw.weighted_choice.clone(),
            },
            "fieldChoice" => TokenValue::FieldChoice {
                rows: raw.field_choice.clone(),
                src_field: raw.src_field.clone().unwrap_or_default(),
            },
            "script" => TokenValue::Script {
                source: raw
                    .script
                    .clone()
                    .ok_or_else(|| invalid("script tokens need a 'script' body".to_string()))?,
                init: raw.init.clone(),
            },
            other => return Err(invalid_type(other)),
        };

        let token = Self {
            name: raw.name,
            sample: sample.to_string(),
            format,
            pattern: raw.token,
            field: raw.field.unwrap_or_else(|| DEFAULT_FIELD.to_string()),
            group: raw.group,
            value,
        };
        token.validate()?;
        Ok(token)
    }
}

// ============================================================================
// Flat Configuration Record
// ============================================================================

/// Token as written in a sample file.
///
/// Every parameter is optional here; [`Token::from_raw`] decides which ones
/// the declared `type` needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawToken {
    pub name: String,

    #[serde(default)]
    pub format: Option<String>,

    /// Match pattern
    pub token: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub replacement: Option<String>,

    #[serde(default)]
    pub group: Option<u32>,

    #[serde(default)]
    pub field: Option<String>,

    #[serde(default)]
    pub src_field: Option<String>,

    #[serde(default)]
    pub precision: Option<u32>,

    #[serde(default)]
    pub lower: Option<i64>,

    #[serde(default)]
    pub upper: Option<i64>,

    #[serde(default)]
    pub length: Option<usize>,

    #[serde(default)]
    pub weighted_choice: Vec<WeightedChoice>,

    #[serde(default)]
    pub field_choice: Vec<BTreeMap<String, String>>,

    #[serde(default)]
    pub choice: Vec<String>,

    #[serde(default)]
    pub script: Option<String>,

    #[serde(default)]
    pub init: BTreeMap<String, String>,
}
