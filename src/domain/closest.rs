//! Nearest-TSS association rules.

use crate::types::Gene;

/// Each gene's domain runs from the previous TSS to the next one, capped at
/// `max_extension` on either side.
///
/// A point between two consecutive TSSs lies in the domains of exactly those
/// two genes.
pub fn two_closest(genes: &[Gene], max_extension: i64) -> Vec<(i64, i64)> {
    (0..genes.len())
        .map(|i| {
            let tss = genes[i].tss;
            let mut start = tss.saturating_sub(max_extension);
            if i > 0 {
                start = start.max(genes[i - 1].tss);
            }
            let mut end = tss.saturating_add(max_extension);
            if let Some(next) = genes.get(i + 1) {
                end = end.min(next.tss);
            }
            (start, end)
        })
        .collect()
}

/// Each gene's domain reaches halfway to its neighbouring TSSs, capped at
/// `max_extension`. Equidistant positions belong to the lower gene.
pub fn one_closest(genes: &[Gene], max_extension: i64) -> Vec<(i64, i64)> {
    // First position closer to gene i + 1 than to gene i
    let boundaries: Vec<i64> = genes
        .windows(2)
        .map(|pair| pair[0].tss + (pair[1].tss - pair[0].tss) / 2 + 1)
        .collect();

    (0..genes.len())
        .map(|i| {
            let tss = genes[i].tss;
            let mut start = tss.saturating_sub(max_extension);
            if i > 0 {
                start = start.max(boundaries[i - 1]);
            }
            let mut end = tss.saturating_add(max_extension);
            if let Some(&boundary) = boundaries.get(i) {
                end = end.min(boundary);
            }
            (start, end)
        })
        .collect()
}
