//! Shared Shannon entropy estimator
//!
//! High character-distribution entropy over page text or script bodies is a
//! known signal for packed or obfuscated payloads. Both extractors call the
//! same estimator so the two cannot drift apart.

use std::collections::HashMap;

/// Shannon entropy (base 2) over the character distribution of `text`,
/// rounded to 3 decimal places.
///
/// The text is case-folded first, so `"AB"` and `"ab"` score identically.
/// Empty input returns `0.0` rather than dividing by zero.
pub fn shannon_entropy(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let total = lowered.chars().count();
    if total == 0 {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in lowered.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }

    let total = total as f64;
    let entropy: f64 = counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum();

    round3(entropy)
}

/// Round to 3 decimal places, the precision every float feature is emitted at.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
