//! Token-substitution engine for eventgen.
//!
//! Given an event string and a [`Token`](token_core::Token), the engine finds
//! where the token sits, generates a replacement value and splices it in.
//! Every call takes an explicit random source and a caller-owned
//! [`ChoiceSlot`](token_core::ChoiceSlot); the engine itself keeps no state
//! between calls, so independent streams can run in parallel as long as each
//! owns its own RNG.
//!
//! # Architecture
//!
//! ```text
//!  event, token
//!       │
//!       ▼
//! ┌──────────────┐   range    ┌────────────────────┐
//! │   offsets    │───────────▶│      replace       │
//! └──────────────┘            │  (splice driver)   │
//!                             └─────────┬──────────┘
//!                                       │ token, slot, window, rng
//!                                       ▼
//!                             ┌────────────────────┐
//!                             │     generators     │──▶ script sandbox (Lua)
//!                             └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use token_core::{ChoiceSlot, TimeWindow, Token, TokenValue};
//! use token_generator::replace;
//!
//! let token = Token::template(
//!     "status",
//!     "%s%",
//!     TokenValue::Static { replacement: "OK".to_string() },
//! )
//! .unwrap();
//!
//! let mut event = "status=%s%".to_string();
//! let mut rng = StdRng::seed_from_u64(42);
//! replace(&mut event, &token, &mut ChoiceSlot::new(), &TimeWindow::at(Utc::now()), &mut rng)
//!     .unwrap();
//! assert_eq!(event, "status=OK");
//! ```
//!
//! # Token types
//!
//! - `static` - Literal replacement text
//! - `timestamp` / `gotimestamp` / `epochtimestamp` - Random instant in the window
//! - `random` - `int`, `float`, `string`, `hex`, `guid`, `ipv4`, `ipv6`
//! - `choice` - Uniform pick from a list
//! - `weightedChoice` - Pick proportional to integer weights
//! - `fieldChoice` - One column of a uniformly picked row
//! - `script` - Lua script result

pub mod error;
pub mod generator;
pub mod generators;
pub mod offsets;
pub mod replace;

// Re-exports for convenience
pub use error::{ScriptError, TokenError};
pub use generator::{EventGenerator, EventIterator, RenderedEvent};
pub use generators::script::{LuaSandbox, ScriptEnv, ScriptSandbox, ScriptState};
pub use generators::{generate_replacement, generate_replacement_with};
pub use offsets::{replacement_offsets, replacement_offsets_from};
pub use replace::{replace, replace_all_with, replace_with};
