//! Unit normalization for profiler-reported values
//!
//! Nsight tools print a unit next to every counter ("Kbyte", "usecond",
//! "cycle/nsecond", ...). Values are normalized to bytes, nanoseconds for
//! plain durations, and per-second for rates.

/// Multiplier that converts a value reported in `unit` to base units.
///
/// Unknown or empty units scale by 1.
pub fn scale_factor(unit: &str) -> f64 {
    let unit = unit.trim();
    match unit.split_once('/') {
        Some((numerator, denominator)) => numerator_scale(numerator) * per_time_scale(denominator),
        None => numerator_scale(unit),
    }
}

/// Normalize a reported value to base units
pub fn to_base_units(value: f64, unit: &str) -> f64 {
    value * scale_factor(unit)
}

fn numerator_scale(unit: &str) -> f64 {
    match unit {
        "nsecond" => 1.0,
        "usecond" => 1e3,
        "msecond" => 1e6,
        "second" => 1e9,
        _ => magnitude_prefix(unit),
    }
}

/// Scale for a rate denominator, relative to "per second"
fn per_time_scale(unit: &str) -> f64 {
    match unit {
        "second" => 1.0,
        "msecond" => 1e3,
        "usecond" => 1e6,
        "nsecond" => 1e9,
        _ => 1.0,
    }
}

/// SI magnitude prefix on a quantity ("Kbyte", "Mcycle", "Ginst")
fn magnitude_prefix(unit: &str) -> f64 {
    let mut chars = unit.chars();
    let factor = match chars.next() {
        Some('K') => 1e3,
        Some('M') => 1e6,
        Some('G') => 1e9,
        Some('T') => 1e12,
        _ => return 1.0,
    };
    // A bare "K" or an all-caps token is not a prefixed unit
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => factor,
        _ => 1.0,
    }
}
