//! Round-half-to-even ("banker's") rounding

/// Tolerance used to detect a tie after scaling.
///
/// Scaling by a power of ten rarely lands exactly on `.5` in binary floating
/// point (`2.675 * 100` is `267.49999999999997`), so anything within this
/// distance of one half is treated as a tie.
const TIE_EPSILON: f64 = 1e-8;

/// Round `value` to `decimal_places` using round-half-to-even.
///
/// Non-finite input is returned unchanged.
pub fn bankers_round(value: f64, decimal_places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let multiplier = 10f64.powi(decimal_places as i32);
    let scaled = value * multiplier;
    // Clamp accumulated float noise to 8 decimals before looking at the fraction
    let scaled = (scaled * 1e8).round() / 1e8;

    let whole = scaled.floor();
    let fraction = scaled - whole;

    let rounded = if fraction > 0.5 - TIE_EPSILON && fraction < 0.5 + TIE_EPSILON {
        if whole % 2.0 == 0.0 {
            whole
        } else {
            whole + 1.0
        }
    } else {
        scaled.round()
    };

    rounded / multiplier
}
