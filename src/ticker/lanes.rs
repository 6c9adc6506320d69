//! Packs timed terms into non-overlapping ticker lanes.

use anyhow::{ensure, Result};
use tracing::debug;

use crate::types::{Appearance, Ticker};

/// Builds the ticker for `(term, center)` pairs, giving each appearance an
/// envelope of `width` seconds centred on its timestamp.
pub fn build_ticker(terms: &[(String, f64)], width: f64) -> Result<Ticker> {
    ensure!(
        width > 0.0,
        "Envelope width must be positive, got {}",
        width
    );

    let mut sorted: Vec<&(String, f64)> = terms.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut appearances = Vec::new();
    for group in sorted.chunk_by(|a, b| a.0 == b.0) {
        appearances.extend(merge_overlapping(group, width));
    }
    appearances.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut ticker = Ticker::default();
    for appearance in appearances {
        place(&mut ticker, appearance);
    }
    debug!(
        terms = terms.len(),
        lanes = ticker.lanes.len(),
        "ticker lanes built"
    );
    Ok(ticker)
}

/// Envelopes of one term, merged wherever they touch or overlap.
fn merge_overlapping(group: &[&(String, f64)], width: f64) -> Vec<Appearance> {
    let mut merged: Vec<Appearance> = Vec::new();
    for (term, center) in group.iter().map(|entry| (&entry.0, entry.1)) {
        let next = Appearance::new(term.clone(), center - width / 2.0, center + width / 2.0);
        match merged.last_mut() {
            Some(current) if current.end >= next.start => {
                current.end = current.end.max(next.end);
            }
            _ => merged.push(next),
        }
    }
    merged
}

/// First lane whose last appearance ends by `appearance.start`, else a new lane.
fn place(ticker: &mut Ticker, appearance: Appearance) {
    let free_lane = ticker.lanes.iter_mut().find(|lane| {
        lane.last()
            .map_or(true, |last| last.end <= appearance.start)
    });
    match free_lane {
        Some(lane) => lane.push(appearance),
        None => ticker.lanes.push(vec![appearance]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(entries: &[(&str, f64)]) -> Vec<(String, f64)> {
        entries
            .iter()
            .map(|(term, center)| (term.to_string(), *center))
            .collect()
    }

    #[test]
    fn overlapping_terms_open_new_lanes() {
        let ticker = build_ticker(&terms(&[("a", 100.0), ("b", 150.0), ("c", 400.0)]), 120.0)
            .unwrap();
        assert_eq!(ticker.lanes.len(), 2);
        assert_eq!(ticker.lanes[0].len(), 2);
        assert_eq!(ticker.lanes[0][1].term, "c");
        assert_eq!(ticker.lanes[1][0].term, "b");
    }

    #[test]
    fn repeated_term_merges_into_one_envelope() {
        let ticker = build_ticker(&terms(&[("rust", 100.0), ("rust", 160.0)]), 120.0).unwrap();
        assert_eq!(ticker.lanes.len(), 1);
        assert_eq!(ticker.lanes[0], vec![Appearance::new("rust", 40.0, 220.0)]);
        assert_eq!(ticker.end(), 220.0);
    }

    #[test]
    fn lanes_never_overlap() {
        let input = terms(&[
            ("a", 10.0),
            ("b", 20.0),
            ("c", 30.0),
            ("a", 400.0),
            ("d", 200.0),
            ("e", 260.0),
        ]);
        let ticker = build_ticker(&input, 120.0).unwrap();
        for lane in &ticker.lanes {
            for pair in lane.windows(2) {
                assert!(pair[0].end <= pair[1].start);
            }
        }
    }

    #[test]
    fn rejects_non_positive_width() {
        assert!(build_ticker(&terms(&[("a", 1.0)]), 0.0).is_err());
    }

    #[test]
    fn empty_input_builds_empty_ticker() {
        let ticker = build_ticker(&[], 120.0).unwrap();
        assert!(ticker.is_empty());
        assert_eq!(ticker.end(), 0.0);
    }
}
