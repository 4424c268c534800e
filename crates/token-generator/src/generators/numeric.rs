//! Numeric value generators.

use rand::Rng;

/// Uniform integer in `[lower, upper)`, sampled as an offset from `lower`.
///
/// Callers guarantee `lower < upper`.
pub fn generate_int<R: Rng>(rng: &mut R, lower: i64, upper: i64) -> i64 {
    rng.random_range(0..upper - lower) + lower
}

/// Fixed-point value in `[lower, upper)` with exactly `precision` digits.
///
/// The bounds are scaled by `10^precision`, an integer is drawn in the scaled
/// range, and the result is rendered from that integer so no floating-point
/// rounding can leak into the digits.
pub fn generate_float<R: Rng>(
    rng: &mut R,
    lower: i64,
    upper: i64,
    scale: i64,
    precision: u32,
) -> String {
    let scaled = generate_int(rng, lower * scale, upper * scale);
    render_fixed(scaled, scale, precision)
}

/// Render `scaled / scale` with `precision` fractional digits.
fn render_fixed(scaled: i64, scale: i64, precision: u32) -> String {
    if precision == 0 {
        return scaled.to_string();
    }
    let sign = if scaled < 0 { "-" } else { "" };
    let magnitude = scaled.unsigned_abs();
    let scale = scale.unsigned_abs();
    format!(
        "{sign}{}.{:0width$}",
        magnitude / scale,
        magnitude % scale,
        width = precision as usize
    )
}
