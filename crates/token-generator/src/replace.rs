//! Substitution driver: resolve the offset, generate, splice.

use crate::error::TokenError;
use crate::generators::script::{seed_state, LuaSandbox, ScriptEnv};
use crate::generators::generate_replacement_with;
use crate::offsets::replacement_offsets_from;
use rand::Rng;
use std::ops::Range;
use token_core::{ChoiceSlot, TimeWindow, Token};

/// Replace the first occurrence of `token` in `event`.
///
/// Returns the byte range of the inserted replacement, or `None` when the
/// token is absent (the event is left untouched). Pattern-compile and
/// generation errors propagate.
pub fn replace<R: Rng>(
    event: &mut String,
    token: &Token,
    slot: &mut ChoiceSlot,
    window: &TimeWindow,
    rng: &mut R,
) -> Result<Option<Range<usize>>, TokenError> {
    let mut state = seed_state(token);
    let mut env = ScriptEnv::new(&LuaSandbox, &mut state);
    replace_with(event, token, slot, window, rng, &mut env)
}

/// [`replace`] with an explicit script environment.
pub fn replace_with<R: Rng>(
    event: &mut String,
    token: &Token,
    slot: &mut ChoiceSlot,
    window: &TimeWindow,
    rng: &mut R,
    env: &mut ScriptEnv<'_>,
) -> Result<Option<Range<usize>>, TokenError> {
    Ok(replace_from(event, token, 0, slot, window, rng, env)?.map(|splice| splice.inserted))
}

/// Replace every occurrence of `token`, scanning forward past each inserted
/// replacement so a replacement containing the pattern is never revisited.
///
/// All occurrences share `slot`. Returns the number of substitutions made.
pub fn replace_all_with<R: Rng>(
    event: &mut String,
    token: &Token,
    slot: &mut ChoiceSlot,
    window: &TimeWindow,
    rng: &mut R,
    env: &mut ScriptEnv<'_>,
) -> Result<usize, TokenError> {
    let mut cursor = 0;
    let mut count = 0;

    while cursor <= event.len() {
        let Some(splice) = replace_from(event, token, cursor, slot, window, rng, env)? else {
            break;
        };
        count += 1;
        cursor = splice.inserted.end;
        if splice.matched.is_empty() {
            // An empty match would be found again at the cursor; step over one character
            match event[cursor..].chars().next() {
                Some(c) => cursor += c.len_utf8(),
                None => break,
            }
        }
    }

    Ok(count)
}

/// Byte ranges of one substitution: the matched span in the event before the
/// splice, and the inserted replacement after it.
struct Splice {
    matched: Range<usize>,
    inserted: Range<usize>,
}

fn replace_from<R: Rng>(
    event: &mut String,
    token: &Token,
    start: usize,
    slot: &mut ChoiceSlot,
    window: &TimeWindow,
    rng: &mut R,
    env: &mut ScriptEnv<'_>,
) -> Result<Option<Splice>, TokenError> {
    let matched = match replacement_offsets_from(event, token, start) {
        Ok(span) => span,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };

    let replacement = generate_replacement_with(token, slot, window, rng, env)?;
    event.replace_range(matched.clone(), &replacement);
    let inserted = matched.start..matched.start + replacement.len();
    Ok(Some(Splice { matched, inserted }))
}
