//! Ranking and multiple-testing correction within a category.

/// Rank and adjusted p-values of one test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjusted {
    /// 1-based position after sorting by p-value, ties by term id.
    pub rank: usize,
    pub bonferroni: f64,
    /// Benjamini-Hochberg q-value.
    pub fdr: f64,
}

/// Rank `p_values` (ties broken by `ids`) and apply Bonferroni and
/// Benjamini-Hochberg correction.
///
/// Returns one entry per input, in input order.
pub fn rank_and_correct(p_values: &[f64], ids: &[&str]) -> Vec<Adjusted> {
    debug_assert_eq!(p_values.len(), ids.len());
    let n = p_values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        p_values[a]
            .total_cmp(&p_values[b])
            .then_with(|| ids[a].cmp(ids[b]))
    });

    let n_f = n as f64;
    let mut adjusted = vec![
        Adjusted {
            rank: 0,
            bonferroni: 1.0,
            fdr: 1.0,
        };
        n
    ];

    // Monotone from the largest p-value down
    let mut prev = f64::INFINITY;
    for pos in (0..n).rev() {
        let idx = order[pos];
        let rank = pos + 1;
        let p = p_values[idx];
        let fdr = (p * n_f / rank as f64).min(1.0).min(prev);
        prev = fdr;

        adjusted[idx] = Adjusted {
            rank,
            bonferroni: (p * n_f).min(1.0),
            fdr,
        };
    }

    adjusted
}
