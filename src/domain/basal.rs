//! Basal-plus-extension association rule.
//!
//! Every gene gets a strand-aware basal domain around its TSS. The union of
//! basal domains splits the chromosome into basal blocks and free gaps. A gap
//! is claimed from the left by the block gene whose basal domain ends last and
//! from the right by the block gene whose basal domain starts first; each
//! claimant reaches at most `max_extension` bp from its TSS.

use crate::types::{Gene, Strand};

/// A run of overlapping or touching basal domains.
#[derive(Debug, Clone, Copy)]
struct BasalBlock {
    start: i64,
    end: i64,
    /// Gene whose basal domain starts at `start` (earliest on ties).
    right_claimant: usize,
    /// Gene whose basal domain ends at `end` (latest on ties).
    left_claimant: usize,
}

/// Basal domain of a gene as `[start, end)`.
pub fn basal_span(gene: &Gene, upstream: i64, downstream: i64) -> (i64, i64) {
    match gene.strand {
        Strand::Positive => (gene.tss.saturating_sub(upstream), gene.tss.saturating_add(downstream)),
        Strand::Negative => (gene.tss.saturating_sub(downstream), gene.tss.saturating_add(upstream)),
    }
}

fn basal_blocks(basal: &[(i64, i64)]) -> Vec<BasalBlock> {
    let mut order: Vec<usize> = (0..basal.len()).collect();
    order.sort_by_key(|&i| (basal[i].0, i));

    let mut blocks: Vec<BasalBlock> = Vec::new();
    for i in order {
        let (start, end) = basal[i];
        match blocks.last_mut() {
            Some(block) if start <= block.end => {
                if end > block.end || (end == block.end && i > block.left_claimant) {
                    block.end = end;
                    block.left_claimant = i;
                }
            }
            _ => blocks.push(BasalBlock {
                start,
                end,
                right_claimant: i,
                left_claimant: i,
            }),
        }
    }
    blocks
}

/// Domains for the TSS-sorted genes of one chromosome, one span per gene.
///
/// Spans are not clipped to the chromosome.
pub fn basal_plus_ext(
    genes: &[Gene],
    upstream: i64,
    downstream: i64,
    max_extension: i64,
) -> Vec<(i64, i64)> {
    let basal: Vec<(i64, i64)> = genes
        .iter()
        .map(|g| basal_span(g, upstream, downstream))
        .collect();
    let mut spans = basal.clone();

    let blocks = basal_blocks(&basal);
    let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
        return spans;
    };

    // Chromosome ends: a single claimant, bounded only by the cap
    let head = first.right_claimant;
    spans[head].0 = spans[head].0.min(genes[head].tss.saturating_sub(max_extension));
    let tail = last.left_claimant;
    spans[tail].1 = spans[tail].1.max(genes[tail].tss.saturating_add(max_extension));

    for pair in blocks.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        let (a, b) = (left.end, right.start);

        let left_reach = genes[left.left_claimant].tss.saturating_add(max_extension).clamp(a, b);
        let right_reach = genes[right.right_claimant].tss.saturating_sub(max_extension).clamp(a, b);

        let (left_end, right_start) = if left_reach <= right_reach {
            (left_reach, right_reach)
        } else {
            let split = (a + (b - a) / 2).clamp(right_reach, left_reach);
            (split, split)
        };

        spans[left.left_claimant].1 = left_end;
        spans[right.right_claimant].0 = right_start;
    }

    spans
}
