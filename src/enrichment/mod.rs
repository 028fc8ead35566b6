//! Enrichment engine: per-term counts, tests and corrections.
//!
//! The [`EnrichmentContext`] holds run-wide totals computed once from the
//! associations. Terms of a category are evaluated in parallel against it,
//! then ranked and corrected per test family.

pub mod correction;
pub mod stats;

use ahash::AHashMap;
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::associate::Associations;
use crate::catalog::GeneCatalog;
use crate::domain::DomainSet;
use crate::terms::ResolvedTerm;
use crate::types::GenomicRegion;

use correction::rank_and_correct;
use stats::{binomial_pvalue, fold_enrichment, hypergeometric_pvalue, ratio};

/// Run-wide totals shared by every term test.
#[derive(Debug, Clone)]
pub struct EnrichmentContext {
    pub total_regions: usize,
    /// Union length of all regulatory domains.
    pub genome_length: i64,
    /// Genes in the catalog.
    pub total_genes: usize,
    /// Hit gene -> indices of the regions associated with it, ascending.
    pub gene_regions: AHashMap<usize, Vec<usize>>,
    /// Region labels in input order.
    pub region_labels: Vec<String>,
}

impl EnrichmentContext {
    pub fn new(
        regions: &[GenomicRegion],
        associations: &Associations,
        domains: &DomainSet,
        catalog: &GeneCatalog,
    ) -> Self {
        let mut gene_regions: AHashMap<usize, Vec<usize>> = AHashMap::new();
        for (region_idx, genes) in associations.region_genes.iter().enumerate() {
            for &gene in genes {
                gene_regions.entry(gene).or_default().push(region_idx);
            }
        }

        EnrichmentContext {
            total_regions: regions.len(),
            genome_length: domains.genome_length(),
            total_genes: catalog.len(),
            gene_regions,
            region_labels: regions.iter().map(|r| r.label()).collect(),
        }
    }

    /// Number of distinct genes hit by any region.
    pub fn hit_genes(&self) -> usize {
        self.gene_regions.len()
    }
}

/// Test statistics of one term.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRecord {
    pub term_id: String,
    pub term_name: String,
    pub category: String,

    pub binom_rank: usize,
    pub binom_p: f64,
    pub binom_bonferroni: f64,
    pub binom_fdr: f64,
    pub binom_fold_enrichment: f64,
    pub observed_regions: usize,
    pub expected_regions: f64,
    pub genome_fraction: f64,
    pub region_coverage: f64,

    pub hyper_rank: usize,
    pub hyper_p: f64,
    pub hyper_bonferroni: f64,
    pub hyper_fdr: f64,
    pub hyper_fold_enrichment: f64,
    pub observed_genes: usize,
    pub expected_genes: f64,
    pub total_genes: usize,
    pub gene_coverage: f64,
    pub term_coverage: f64,

    /// Labels of the regions near the term's genes, in input order.
    pub regions: Vec<String>,
    /// Names of the term's hit genes, sorted.
    pub genes: Vec<String>,
}

/// Raw counts and p-values of one term before ranking.
pub fn score_term(
    term: &ResolvedTerm,
    context: &EnrichmentContext,
    domains: &DomainSet,
    catalog: &GeneCatalog,
) -> EnrichmentRecord {
    let hit: Vec<(usize, &Vec<usize>)> = term
        .genes
        .iter()
        .filter_map(|g| context.gene_regions.get(g).map(|r| (*g, r)))
        .collect();

    let mut region_idx: Vec<usize> = hit.iter().flat_map(|(_, r)| r.iter().copied()).collect();
    region_idx.sort_unstable();
    region_idx.dedup();

    let mut genes: Vec<String> = hit
        .iter()
        .map(|&(g, _)| catalog.gene(g).gene_name.clone())
        .collect();
    genes.sort();

    let observed_regions = region_idx.len();
    let observed_genes = hit.len();
    let total_genes = term.size();

    let genome_fraction = if context.genome_length > 0 {
        domains.covered_length(term.genes.iter().copied()) as f64 / context.genome_length as f64
    } else {
        0.0
    };
    let expected_regions = context.total_regions as f64 * genome_fraction;
    let binom_p = binomial_pvalue(
        observed_regions as u64,
        context.total_regions as u64,
        genome_fraction,
    );

    let expected_genes = if context.total_genes > 0 {
        context.hit_genes() as f64 * total_genes as f64 / context.total_genes as f64
    } else {
        0.0
    };
    let hyper_p = hypergeometric_pvalue(
        observed_genes as u64,
        context.total_genes as u64,
        total_genes as u64,
        context.hit_genes() as u64,
    );

    EnrichmentRecord {
        term_id: term.term.term_id.clone(),
        term_name: term.term.term_name.clone(),
        category: term.term.category.clone(),
        binom_rank: 0,
        binom_p,
        binom_bonferroni: binom_p,
        binom_fdr: binom_p,
        binom_fold_enrichment: fold_enrichment(observed_regions as f64, expected_regions),
        observed_regions,
        expected_regions,
        genome_fraction,
        region_coverage: ratio(observed_regions, context.total_regions),
        hyper_rank: 0,
        hyper_p,
        hyper_bonferroni: hyper_p,
        hyper_fdr: hyper_p,
        hyper_fold_enrichment: fold_enrichment(observed_genes as f64, expected_genes),
        observed_genes,
        expected_genes,
        total_genes,
        gene_coverage: ratio(observed_genes, context.hit_genes()),
        term_coverage: ratio(observed_genes, total_genes),
        regions: region_idx
            .iter()
            .map(|&i| context.region_labels[i].clone())
            .collect(),
        genes,
    }
}

/// Test, rank and correct every term of one category.
///
/// Rows come back ordered by binomial rank.
pub fn evaluate_category(
    terms: &IndexMap<String, ResolvedTerm>,
    context: &EnrichmentContext,
    domains: &DomainSet,
    catalog: &GeneCatalog,
) -> Vec<EnrichmentRecord> {
    let all_terms: Vec<&ResolvedTerm> = terms.values().collect();
    let mut records: Vec<EnrichmentRecord> = all_terms
        .par_iter()
        .map(|term| score_term(term, context, domains, catalog))
        .collect();

    let ids: Vec<&str> = all_terms.iter().map(|t| t.term.term_id.as_str()).collect();

    let binom_p: Vec<f64> = records.iter().map(|r| r.binom_p).collect();
    let hyper_p: Vec<f64> = records.iter().map(|r| r.hyper_p).collect();
    let binom = rank_and_correct(&binom_p, &ids);
    let hyper = rank_and_correct(&hyper_p, &ids);

    for ((record, b), h) in records.iter_mut().zip(binom).zip(hyper) {
        record.binom_rank = b.rank;
        record.binom_bonferroni = b.bonferroni;
        record.binom_fdr = b.fdr;
        record.hyper_rank = h.rank;
        record.hyper_bonferroni = h.bonferroni;
        record.hyper_fdr = h.fdr;
    }

    records.sort_by_key(|r| r.binom_rank);
    debug!(terms = records.len(), "Evaluated category");
    records
}
