// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small statistics helpers shared by the line-height mode (§4.3), the
//! document-wide scale harmonization (§4.8), and the formula
//! dominant-font-size pick (§4.6). Values are bucketed by bit pattern so
//! floating point equality is exact for values that originated from the
//! same computation, the way a mode computed over exactly-equal floats
//! needs to be.

use std::collections::BTreeMap;

/// Mode of `values`, tie-broken by the smallest value. Returns `None` for
/// an empty slice.
pub fn mode(values: &[f64]) -> Option<f64> {
    weighted_mode(values.iter().map(|v| (*v, 1.0)))
}

/// Mode of a weighted multiset, where each `(value, weight)` pair
/// contributes `weight` occurrences. Ties broken by the smallest value.
pub fn weighted_mode(values: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let mut counts: BTreeMap<u64, (f64, f64)> = BTreeMap::new();
    for (value, weight) in values {
        let entry = counts.entry(value.to_bits()).or_insert((value, 0.0));
        entry.1 += weight;
    }
    counts
        .values()
        .fold(None::<(f64, f64)>, |best, &(value, total)| match best {
            None => Some((value, total)),
            Some((best_value, best_total)) => {
                if total > best_total || (total == best_total && value < best_value) {
                    Some((value, total))
                } else {
                    Some((best_value, best_total))
                }
            }
        })
        .map(|(value, _)| value)
}

/// Arithmetic mean, used as the documented fallback when a mode cannot be
/// established (§4.3 line height).
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, used as the documented fallback when no mode is reported at all
/// (§4.8).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
