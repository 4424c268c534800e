//! Replacement generators for each token type.
//!
//! [`generate_replacement`] dispatches on the token's [`TokenValue`] and
//! produces the text to splice in. Selection strategies (timestamps and the
//! three list choices) read or write the caller's [`ChoiceSlot`] so tokens
//! of one logical record agree on a single selection.

pub mod choice;
pub mod network;
pub mod numeric;
pub mod script;
pub mod text;
pub mod timestamp;
pub mod uuid;

use crate::error::TokenError;
use rand::Rng;
use script::{seed_state, LuaSandbox, ScriptEnv};
use token_core::{ChoiceSlot, RandomKind, TimeWindow, Token, TokenValue};
use tracing::error;

/// Generate the replacement text for `token`.
///
/// Script tokens run in a [`LuaSandbox`] against a fresh state table seeded
/// from the token.
pub fn generate_replacement<R: Rng>(
    token: &Token,
    slot: &mut ChoiceSlot,
    window: &TimeWindow,
    rng: &mut R,
) -> Result<String, TokenError> {
    let mut state = seed_state(token);
    let mut env = ScriptEnv::new(&LuaSandbox, &mut state);
    generate_replacement_with(token, slot, window, rng, &mut env)
}

/// Generate the replacement text for `token`, running scripts in `env`.
pub fn generate_replacement_with<R: Rng>(
    token: &Token,
    slot: &mut ChoiceSlot,
    window: &TimeWindow,
    rng: &mut R,
    env: &mut ScriptEnv<'_>,
) -> Result<String, TokenError> {
    match &token.value {
        TokenValue::Static { replacement } => Ok(replacement.clone()),

        TokenValue::Timestamp { encoding, format } => {
            let instant = timestamp::select_instant(token, slot, window, rng)?;
            timestamp::render_timestamp(token, instant, *encoding, format)
        }

        TokenValue::Random(kind) => generate_random(token, kind, rng),

        TokenValue::Choice { choices } => {
            let index = choice::select_uniform(token, slot, choices.len(), rng)?;
            Ok(choices[index].clone())
        }

        TokenValue::WeightedChoice { choices } => {
            let index = choice::select_weighted(token, slot, choices, rng)?;
            Ok(choices[index].choice.clone())
        }

        TokenValue::FieldChoice { rows, src_field } => {
            choice::select_field(token, slot, rows, src_field, rng).map(str::to_string)
        }

        TokenValue::Script { source, .. } => match env.sandbox.run(source, &mut *env.state) {
            Ok(text) => Ok(text),
            Err(e) => {
                error!(
                    token = %token.name,
                    sample = %token.sample,
                    error = %e,
                    "Error executing script"
                );
                Ok(String::new())
            }
        },
    }
}

fn generate_random<R: Rng>(
    token: &Token,
    kind: &RandomKind,
    rng: &mut R,
) -> Result<String, TokenError> {
    let invalid = |reason: String| TokenError::InvalidToken {
        sample: token.sample.clone(),
        token: token.name.clone(),
        reason,
    };

    // Tokens built by hand can skip construction-time validation
    token.value.validate().map_err(invalid)?;

    match *kind {
        RandomKind::Int { lower, upper } => {
            Ok(numeric::generate_int(rng, lower, upper).to_string())
        }
        RandomKind::Float {
            lower,
            upper,
            precision,
        } => {
            let scale = 10i64
                .checked_pow(precision)
                .ok_or_else(|| invalid(format!("precision {precision} is too large")))?;
            Ok(numeric::generate_float(rng, lower, upper, scale, precision))
        }
        RandomKind::String { length } => Ok(text::generate_from_alphabet(
            rng,
            text::ALPHANUMERIC,
            length,
        )),
        RandomKind::Hex { length } => Ok(text::generate_from_alphabet(rng, text::HEX, length)),
        RandomKind::Guid => Ok(uuid::generate_guid(rng)),
        RandomKind::Ipv4 => Ok(network::generate_ipv4(rng)),
        RandomKind::Ipv6 => Ok(network::generate_ipv6(rng)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;
    use token_core::{TimestampEncoding, WeightedChoice};
    use tracing_test::traced_test;

    fn window() -> TimeWindow {
        let latest = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TimeWindow::new(latest - chrono::Duration::days(1), latest).unwrap()
    }

    fn token(value: TokenValue) -> Token {
        Token::template("t", "%t%", value).unwrap().in_sample("unit")
    }

    fn generate(value: TokenValue, slot: &mut ChoiceSlot, rng: &mut StdRng) -> String {
        generate_replacement(&token(value), slot, &window(), rng).unwrap()
    }

    #[test]
    fn test_static_ignores_slot() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut slot = ChoiceSlot::new();
        let value = TokenValue::Static {
            replacement: "OK".to_string(),
        };

        assert_eq!(generate(value, &mut slot, &mut rng), "OK");
        assert_eq!(slot, ChoiceSlot::Unselected);
    }

    #[test]
    fn test_random_does_not_touch_slot() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut slot = ChoiceSlot::new();

        let value = generate(
            TokenValue::Random(RandomKind::Int {
                lower: 10,
                upper: 20,
            }),
            &mut slot,
            &mut rng,
        );
        let n: i64 = value.parse().unwrap();
        assert!((10..20).contains(&n));
        assert!(!slot.is_selected());
    }

    #[test]
    fn test_float_token_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = TokenValue::Random(RandomKind::Float {
            lower: 0,
            upper: 10,
            precision: 2,
        });

        for _ in 0..200 {
            let text = generate(value.clone(), &mut ChoiceSlot::new(), &mut rng);
            let (_, fraction) = text.split_once('.').unwrap();
            assert_eq!(fraction.len(), 2);
            let v: f64 = text.parse().unwrap();
            assert!((0.0..10.0).contains(&v));
        }
    }

    #[test]
    fn test_preselected_slot_reused_by_every_selection_type() {
        let mut rng = StdRng::seed_from_u64(42);

        let choice = TokenValue::Choice {
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };
        let weighted = TokenValue::WeightedChoice {
            choices: vec![
                WeightedChoice::new(100, "w0"),
                WeightedChoice::new(1, "w1"),
                WeightedChoice::new(1, "w2"),
            ],
        };
        let rows = (0..3)
            .map(|i| BTreeMap::from([("col".to_string(), format!("row{i}"))]))
            .collect();
        let field = TokenValue::FieldChoice {
            rows,
            src_field: "col".to_string(),
        };

        for _ in 0..50 {
            let mut slot = ChoiceSlot::Selected(2);
            assert_eq!(generate(choice.clone(), &mut slot, &mut rng), "c");
            assert_eq!(generate(weighted.clone(), &mut slot, &mut rng), "w2");
            assert_eq!(generate(field.clone(), &mut slot, &mut rng), "row2");
            assert_eq!(slot, ChoiceSlot::Selected(2));
        }
    }

    #[test]
    fn test_timestamp_tokens_share_instant() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut slot = ChoiceSlot::new();

        let epoch = generate(
            TokenValue::Timestamp {
                encoding: TimestampEncoding::Epoch,
                format: String::new(),
            },
            &mut slot,
            &mut rng,
        );
        let formatted = generate(
            TokenValue::Timestamp {
                encoding: TimestampEncoding::Strftime,
                format: "%s".to_string(),
            },
            &mut slot,
            &mut rng,
        );

        assert_eq!(epoch, formatted);
        assert!(slot.is_selected());
    }

    #[test]
    fn test_same_seed_same_choice() {
        let value = TokenValue::Choice {
            choices: vec!["a".into(), "b".into(), "c".into()],
        };

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let first: Vec<String> = (0..20)
            .map(|_| generate(value.clone(), &mut ChoiceSlot::new(), &mut rng1))
            .collect();
        let second: Vec<String> = (0..20)
            .map(|_| generate(value.clone(), &mut ChoiceSlot::new(), &mut rng2))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_script_result() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = TokenValue::Script {
            source: "return state.sample .. ':' .. state.token".to_string(),
            init: BTreeMap::new(),
        };
        assert_eq!(generate(value, &mut ChoiceSlot::new(), &mut rng), "unit:t");
    }

    #[test]
    #[traced_test]
    fn test_script_fault_yields_empty_and_logs() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = TokenValue::Script {
            source: "error('kaboom')".to_string(),
            init: BTreeMap::new(),
        };

        assert_eq!(generate(value, &mut ChoiceSlot::new(), &mut rng), "");
        assert!(logs_contain("Error executing script"));
        assert!(logs_contain("kaboom"));
    }

    #[test]
    fn test_hand_built_invalid_value_is_error_not_panic() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut bad = token(TokenValue::Static {
            replacement: String::new(),
        });
        bad.value = TokenValue::Random(RandomKind::Int { lower: 5, upper: 5 });

        let err = generate_replacement(&bad, &mut ChoiceSlot::new(), &window(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, TokenError::InvalidToken { .. }));
    }
}
