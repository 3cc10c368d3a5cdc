//! Power-law amplification relative to the score ceiling.

/// `max × (x / max)^exponent`, zero for non-positive or non-finite input.
///
/// Exponents above 1 compress low values; below 1 lift them.
pub fn amplify(x: f64, max: f64, exponent: f64) -> f64 {
    if !(x.is_finite() && x > 0.0) || max <= 0.0 {
        return 0.0;
    }
    max * (x / max).powf(exponent)
}

/// Pick the exponent by band: `< low_cut`, `< high_cut`, otherwise high.
pub fn segment_exponent(x: f64, low_cut: f64, high_cut: f64, exponents: [f64; 3]) -> f64 {
    if x < low_cut {
        exponents[0]
    } else if x < high_cut {
        exponents[1]
    } else {
        exponents[2]
    }
}

/// Clamp into `[0, max]`; NaN collapses to 0.
pub fn cap(x: f64, max: f64) -> f64 {
    if x.is_finite() { x.clamp(0.0, max) } else { 0.0 }
}
