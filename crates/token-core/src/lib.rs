//! Core types for the eventgen token-substitution engine.
//!
//! This crate provides the data model shared by the engine and its callers:
//!
//! - [`Token`] - A substitution site: match specification plus value strategy
//! - [`TokenValue`] - One variant per value strategy, validated at construction
//! - [`ChoiceSlot`] - Caller-owned slot correlating selections across tokens
//! - [`TimeWindow`] - Bounds for randomized timestamps
//! - [`SampleSet`] - Samples (template lines plus tokens) loaded from YAML
//!
//! # Architecture
//!
//! ```text
//! token-core (this crate)
//!    │
//!    └─── token-generator  (offset resolution, value generation, splicing)
//!              │
//!              └─── eventgen  (CLI rendering samples to stdout)
//! ```
//!
//! # Example
//!
//! ```rust
//! use token_core::{Token, TokenValue};
//!
//! let token = Token::template(
//!     "host",
//!     "%host%",
//!     TokenValue::Choice { choices: vec!["a".into(), "b".into()] },
//! )
//! .unwrap();
//! assert_eq!(token.value.type_name(), "choice");
//! ```

pub mod choice;
pub mod error;
pub mod sample;
pub mod token;
pub mod window;

// Re-exports for convenience
pub use choice::ChoiceSlot;
pub use error::ConfigError;
pub use sample::{Sample, SampleSet};
pub use token::{
    RandomKind, RawToken, TimestampEncoding, Token, TokenFormat, TokenValue, WeightedChoice,
    DEFAULT_FIELD,
};
pub use window::{resolve_time, TimeWindow};
