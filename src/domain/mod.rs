//! Regulatory domain construction.
//!
//! Each association rule maps the TSS-sorted genes of one chromosome to one
//! raw `[start, end)` span per gene. This module dispatches the rule per
//! chromosome, clips spans to the chromosome and drops the empty ones.

pub mod basal;
pub mod closest;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::GeneCatalog;
use crate::config::Config;
use crate::types::{AssociationRule, Gene, RegulatoryDomain};

pub use basal::basal_plus_ext;
pub use closest::{one_closest, two_closest};

/// Regulatory domains of every gene in the catalog.
#[derive(Debug, Clone, Default)]
pub struct DomainSet {
    /// Domains in catalog order (chromosome, then TSS).
    domains: Vec<RegulatoryDomain>,
    /// Catalog gene index -> position in `domains`.
    by_gene: Vec<Option<usize>>,
}

impl DomainSet {
    pub fn domains(&self) -> &[RegulatoryDomain] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Domain owned by a gene, if it has a non-empty one.
    pub fn domain_of(&self, gene: usize) -> Option<&RegulatoryDomain> {
        self.by_gene
            .get(gene)
            .copied()
            .flatten()
            .map(|idx| &self.domains[idx])
    }

    /// Assayable genome length: the union length of all domains.
    pub fn genome_length(&self) -> i64 {
        union_length(self.domains.iter())
    }

    /// Union length of the domains owned by `genes`.
    pub fn covered_length<I>(&self, genes: I) -> i64
    where
        I: IntoIterator<Item = usize>,
    {
        union_length(genes.into_iter().filter_map(|g| self.domain_of(g)))
    }
}

/// Total length covered by a collection of domains, overlaps counted once.
pub fn union_length<'a, I>(domains: I) -> i64
where
    I: IntoIterator<Item = &'a RegulatoryDomain>,
{
    let mut spans: Vec<(&str, i64, i64)> = domains
        .into_iter()
        .map(|d| (d.chrom.as_str(), d.start, d.end))
        .collect();
    spans.sort_unstable();

    let mut total = 0i64;
    let mut current: Option<(&str, i64, i64)> = None;
    for (chrom, start, end) in spans {
        match current {
            Some((c, s, e)) if c == chrom && start <= e => {
                current = Some((c, s, e.max(end)));
            }
            Some((_, s, e)) => {
                total += e - s;
                current = Some((chrom, start, end));
            }
            None => current = Some((chrom, start, end)),
        }
    }
    if let Some((_, s, e)) = current {
        total += e - s;
    }
    total
}

/// Raw spans for one chromosome under the configured rule, one per gene.
fn rule_spans(genes: &[Gene], config: &Config) -> Vec<(i64, i64)> {
    match config.rule {
        AssociationRule::BasalPlusExt => basal_plus_ext(
            genes,
            config.upstream,
            config.downstream,
            config.max_extension,
        ),
        AssociationRule::TwoClosest => two_closest(genes, config.max_extension),
        AssociationRule::OneClosest => one_closest(genes, config.max_extension),
    }
}

/// Build the regulatory domains of every gene in the catalog.
///
/// Chromosomes are processed in parallel; the result does not depend on the
/// number of threads.
pub fn build_domains(catalog: &GeneCatalog, config: &Config) -> DomainSet {
    let spans: Vec<_> = catalog.chrom_spans().collect();

    let per_chrom: Vec<Vec<RegulatoryDomain>> = spans
        .par_iter()
        .map(|(chrom, range)| {
            let genes = &catalog.genes()[range.clone()];
            let size = catalog.chrom_size(chrom);

            rule_spans(genes, config)
                .into_iter()
                .enumerate()
                .filter_map(|(offset, (start, end))| {
                    let start = start.max(0);
                    let end = match size {
                        Some(size) => end.min(size),
                        None => end,
                    };
                    if start >= end {
                        debug!(
                            gene = %genes[offset].gene_id,
                            chrom = %chrom,
                            "Dropping empty regulatory domain"
                        );
                        return None;
                    }
                    Some(RegulatoryDomain::new(
                        range.start + offset,
                        chrom.to_string(),
                        start,
                        end,
                    ))
                })
                .collect()
        })
        .collect();

    let mut domains = Vec::with_capacity(catalog.len());
    let mut by_gene = vec![None; catalog.len()];
    for domain in per_chrom.into_iter().flatten() {
        by_gene[domain.gene] = Some(domains.len());
        domains.push(domain);
    }

    info!(
        rule = %config.rule,
        domains = domains.len(),
        genes = catalog.len(),
        "Built regulatory domains"
    );

    DomainSet { domains, by_gene }
}
