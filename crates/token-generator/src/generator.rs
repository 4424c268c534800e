//! Sample renderer producing complete events.

use crate::error::TokenError;
use crate::generators::script::{seed_state, LuaSandbox, ScriptEnv, ScriptSandbox, ScriptState};
use crate::replace::replace_all_with;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use token_core::{ChoiceSlot, Sample, TimeWindow, DEFAULT_FIELD};
use tracing::debug;

/// One rendered event: the sample line with every token substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEvent {
    pub sample: String,
    pub index: u64,
    pub fields: BTreeMap<String, String>,
}

impl RenderedEvent {
    /// The `_raw` field, if the line has one.
    pub fn raw(&self) -> Option<&str> {
        self.fields.get(DEFAULT_FIELD).map(String::as_str)
    }
}

/// Renders events from a sample with a seeded random source.
///
/// Tokens are applied in configuration order. Tokens sharing a `group` share
/// one choice slot per event; ungrouped tokens get a fresh slot per event.
/// Script tokens keep their state table across events.
pub struct EventGenerator {
    sample: Sample,
    seed: u64,
    rng: StdRng,
    index: u64,
    sandbox: Box<dyn ScriptSandbox>,
    /// One state table per token, parallel to `sample.tokens`
    script_states: Vec<ScriptState>,
}

impl EventGenerator {
    /// Create a generator for `sample` seeded with `seed`.
    pub fn new(sample: Sample, seed: u64) -> Self {
        let script_states = sample.tokens.iter().map(seed_state).collect();
        Self {
            sample,
            seed,
            rng: StdRng::seed_from_u64(seed),
            index: 0,
            sandbox: Box::new(LuaSandbox),
            script_states,
        }
    }

    /// Set the starting event index.
    ///
    /// Re-seeds the RNG from the base seed and the index, so disjoint index
    /// ranges render independently and reproducibly.
    pub fn with_start_index(mut self, index: u64) -> Self {
        self.index = index;
        let seed = self.seed.wrapping_add(index.wrapping_mul(0x9E3779B97F4A7C15));
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the script sandbox.
    pub fn with_sandbox(mut self, sandbox: impl ScriptSandbox + 'static) -> Self {
        self.sandbox = Box::new(sandbox);
        self
    }

    pub fn current_index(&self) -> u64 {
        self.index
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    /// Render the next event with timestamps drawn from `window`.
    pub fn next_event(&mut self, window: &TimeWindow) -> Result<RenderedEvent, TokenError> {
        let lines = &self.sample.lines;
        if lines.is_empty() {
            return Err(TokenError::NoLines(self.sample.name.clone()));
        }

        let line_index = if self.sample.randomize_events {
            self.rng.random_range(0..lines.len())
        } else {
            (self.index % lines.len() as u64) as usize
        };
        let mut fields = lines[line_index].clone();

        let mut groups: HashMap<u32, ChoiceSlot> = HashMap::new();
        for (token, state) in self.sample.tokens.iter().zip(self.script_states.iter_mut()) {
            let Some(text) = fields.get_mut(&token.field) else {
                debug!(
                    "Field '{}' not present in line {} of sample '{}', skipping token '{}'",
                    token.field, line_index, self.sample.name, token.name
                );
                continue;
            };

            let mut fresh = ChoiceSlot::new();
            let slot = match token.group {
                Some(group) => groups.entry(group).or_default(),
                None => &mut fresh,
            };

            let mut env = ScriptEnv::new(self.sandbox.as_ref(), state);
            replace_all_with(text, token, slot, window, &mut self.rng, &mut env)?;
        }

        let event = RenderedEvent {
            sample: self.sample.name.clone(),
            index: self.index,
            fields,
        };
        self.index += 1;
        Ok(event)
    }

    /// Lazily render `count` events.
    pub fn events(&mut self, window: TimeWindow, count: u64) -> EventIterator<'_> {
        EventIterator {
            generator: self,
            window,
            remaining: count,
        }
    }
}

/// Iterator that lazily renders events.
pub struct EventIterator<'a> {
    generator: &'a mut EventGenerator,
    window: TimeWindow,
    remaining: u64,
}

impl Iterator for EventIterator<'_> {
    type Item = Result<RenderedEvent, TokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        Some(self.generator.next_event(&self.window))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EventIterator<'_> {}
