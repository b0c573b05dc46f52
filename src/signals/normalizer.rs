//! Signal text normalization
//!
//! Workers spell their calls in free form ("STRONG BUY", "strong_sell",
//! "HOLD"). Every text check the engine makes goes through this module.

/// Map signal text onto the directional scale {-1, 0, +1}.
///
/// Case-insensitive substring match. Magnitude is dropped here: "BUY" and
/// "STRONG BUY" both map to +1 and only confidence separates them later.
pub fn normalize(signal: &str) -> i8 {
    let upper = signal.to_uppercase();
    // "STRONG BUY" contains "BUY", so one check covers both spellings.
    if upper.contains("BUY") {
        1
    } else if upper.contains("SELL") {
        -1
    } else {
        0
    }
}

/// Whether a model's signal text agrees with a resolved label.
///
/// Exact or containment match after upper-casing and treating `_`, `-` and
/// whitespace alike, so "STRONG BUY" satisfies both `STRONG_BUY` and `BUY`.
/// Containment is loose on purpose and can over-match longer strings.
pub fn signal_matches(model_signal: &str, label: &str) -> bool {
    let model = canonical(model_signal);
    let label = canonical(label);
    if label.is_empty() {
        return false;
    }
    model == label || model.contains(&label)
}

fn canonical(text: &str) -> String {
    text.to_uppercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
