//! Gene catalog: per-chromosome, TSS-sorted gene records.
//!
//! The catalog owns every [`Gene`]. Other stages refer to genes by their
//! catalog index, which is stable for the lifetime of the catalog.

use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use std::ops::Range;
use tracing::warn;

use crate::types::Gene;

/// Normalize a gene symbol or id for matching: trimmed and upper-cased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// All genes of an annotation build, grouped by chromosome and sorted by TSS.
#[derive(Debug, Clone, Default)]
pub struct GeneCatalog {
    /// Genes ordered by chromosome (first appearance), then TSS, then id.
    genes: Vec<Gene>,
    /// Contiguous span of `genes` per chromosome.
    chroms: IndexMap<String, Range<usize>>,
    /// Normalized id or display name -> gene index.
    by_symbol: AHashMap<String, usize>,
    chrom_sizes: AHashMap<String, i64>,
}

impl GeneCatalog {
    /// Build a catalog from genes in input order.
    ///
    /// Repeated gene ids keep their first occurrence.
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut chrom_order: IndexMap<String, Vec<Gene>> = IndexMap::new();
        let mut duplicates = 0usize;

        for gene in genes {
            if !seen.insert(gene.gene_id.clone()) {
                duplicates += 1;
                continue;
            }
            chrom_order.entry(gene.chrom.clone()).or_default().push(gene);
        }

        if duplicates > 0 {
            warn!(duplicates, "Skipped repeated gene ids (first occurrence kept)");
        }

        let mut sorted = Vec::with_capacity(seen.len());
        let mut chroms = IndexMap::with_capacity(chrom_order.len());
        for (chrom, mut chrom_genes) in chrom_order {
            chrom_genes.sort_by(|a, b| a.tss.cmp(&b.tss).then_with(|| a.gene_id.cmp(&b.gene_id)));
            let start = sorted.len();
            sorted.extend(chrom_genes);
            chroms.insert(chrom, start..sorted.len());
        }

        let mut by_symbol = AHashMap::with_capacity(sorted.len() * 2);
        for (idx, gene) in sorted.iter().enumerate() {
            by_symbol.entry(normalize_symbol(&gene.gene_id)).or_insert(idx);
        }
        // Names go in after every id so an id match always wins.
        for (idx, gene) in sorted.iter().enumerate() {
            by_symbol.entry(normalize_symbol(&gene.gene_name)).or_insert(idx);
        }

        GeneCatalog {
            genes: sorted,
            chroms,
            by_symbol,
            chrom_sizes: AHashMap::new(),
        }
    }

    /// Attach chromosome sizes used to clip regulatory domains.
    pub fn with_chrom_sizes(mut self, chrom_sizes: AHashMap<String, i64>) -> Self {
        self.chrom_sizes = chrom_sizes;
        self
    }

    /// Number of genes in the catalog.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn gene(&self, idx: usize) -> &Gene {
        &self.genes[idx]
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Chromosome names in first-appearance order.
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.chroms.keys().map(|c| c.as_str())
    }

    /// Chromosomes with the catalog index range of their genes.
    pub fn chrom_spans(&self) -> impl Iterator<Item = (&str, Range<usize>)> {
        self.chroms.iter().map(|(c, r)| (c.as_str(), r.clone()))
    }

    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.chroms.contains_key(chrom)
    }

    /// TSS-sorted genes on a chromosome (empty if unknown).
    pub fn genes_on(&self, chrom: &str) -> &[Gene] {
        match self.chroms.get(chrom) {
            Some(range) => &self.genes[range.clone()],
            None => &[],
        }
    }

    /// Known size of a chromosome, if sizes were supplied.
    pub fn chrom_size(&self, chrom: &str) -> Option<i64> {
        self.chrom_sizes.get(chrom).copied()
    }

    /// Resolve a gene-set symbol against ids and display names.
    pub fn resolve_symbol(&self, symbol: &str) -> Option<usize> {
        self.by_symbol.get(&normalize_symbol(symbol)).copied()
    }
}
