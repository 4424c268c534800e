//! List-selection generators: `choice`, `weightedChoice` and `fieldChoice`.
//!
//! All three honor the shared choice slot: an unset slot performs the
//! selection and stores the index, a set slot is reused without touching the
//! RNG.

use crate::error::TokenError;
use rand::Rng;
use std::collections::BTreeMap;
use token_core::{ChoiceSlot, Token, WeightedChoice};

/// Uniform index into a list of `len` entries, via the shared slot.
pub fn select_uniform<R: Rng>(
    token: &Token,
    slot: &mut ChoiceSlot,
    len: usize,
    rng: &mut R,
) -> Result<usize, TokenError> {
    let index = slot.get_or_select_with(|| {
        if len == 0 {
            return Err(empty_list(token));
        }
        Ok(rng.random_range(0..len) as i64)
    })?;
    checked_index(token, index, len)
}

/// Weighted index into `choices`, via the shared slot.
pub fn select_weighted<R: Rng>(
    token: &Token,
    slot: &mut ChoiceSlot,
    choices: &[WeightedChoice],
    rng: &mut R,
) -> Result<usize, TokenError> {
    let index = slot.get_or_select_with(|| {
        weighted_index(choices, rng)
            .map(|i| i as i64)
            .ok_or_else(|| TokenError::InvalidToken {
                sample: token.sample.clone(),
                token: token.name.clone(),
                reason: "total weight must be positive".to_string(),
            })
    })?;
    checked_index(token, index, choices.len())
}

/// Cumulative-weight sampling.
///
/// Draws `r` uniformly in `[0, total)` and returns the first index whose
/// running total strictly exceeds `r`. Falls back to the last index if
/// rounding pushes `r` past every total. `None` when the total weight is zero.
pub fn weighted_index<R: Rng>(choices: &[WeightedChoice], rng: &mut R) -> Option<usize> {
    let mut totals = Vec::with_capacity(choices.len());
    let mut running: u64 = 0;
    for choice in choices {
        running = running.saturating_add(choice.weight);
        totals.push(running);
    }
    if running == 0 {
        return None;
    }

    let r = rng.random::<f64>() * running as f64;
    Some(pick_weighted(&totals, r))
}

/// First index whose cumulative total strictly exceeds `r`, or the last index
/// when none does. `totals` must not be empty.
pub fn pick_weighted(totals: &[u64], r: f64) -> usize {
    totals
        .iter()
        .position(|&total| r < total as f64)
        .unwrap_or(totals.len().saturating_sub(1))
}

/// Value of `src_field` in the row selected through the shared slot.
pub fn select_field<'a, R: Rng>(
    token: &Token,
    slot: &mut ChoiceSlot,
    rows: &'a [BTreeMap<String, String>],
    src_field: &str,
    rng: &mut R,
) -> Result<&'a str, TokenError> {
    let index = select_uniform(token, slot, rows.len(), rng)?;
    rows[index]
        .get(src_field)
        .map(String::as_str)
        .ok_or_else(|| TokenError::InvalidToken {
            sample: token.sample.clone(),
            token: token.name.clone(),
            reason: format!("fieldChoice row {index} has no '{src_field}' column"),
        })
}

fn checked_index(token: &Token, index: i64, len: usize) -> Result<usize, TokenError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| TokenError::ChoiceOutOfRange {
            token: token.name.clone(),
            index,
            len,
        })
}

fn empty_list(token: &Token) -> TokenError {
    TokenError::InvalidToken {
        sample: token.sample.clone(),
        token: token.name.clone(),
        reason: "choice list must not be empty".to_string(),
    }
}
