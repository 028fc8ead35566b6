//! Region-to-gene association through regulatory domain overlap.
//!
//! Domains are indexed per chromosome in an augmented interval list, so a
//! query costs a binary search per list component plus the number of
//! overlapping domains, whatever the gene density.

pub mod ailist;

use ahash::AHashMap;
use tracing::info;

use crate::associate::ailist::{AIList, Interval};
use crate::catalog::GeneCatalog;
use crate::domain::DomainSet;
use crate::types::{GenomicRegion, Strand};

/// Interval index over all regulatory domains.
#[derive(Debug, Clone, Default)]
pub struct DomainIndex {
    by_chrom: AHashMap<String, AIList<usize>>,
}

impl DomainIndex {
    pub fn new(domains: &DomainSet) -> Self {
        let mut intervals: AHashMap<String, Vec<Interval<usize>>> = AHashMap::new();
        for domain in domains.domains() {
            intervals.entry(domain.chrom.clone()).or_default().push(Interval {
                start: domain.start,
                end: domain.end,
                val: domain.gene,
            });
        }

        let by_chrom = intervals
            .into_iter()
            .map(|(chrom, list)| (chrom, AIList::build(list)))
            .collect();
        DomainIndex { by_chrom }
    }

    /// Genes whose domain overlaps `[start, end)` on `chrom`, ascending.
    pub fn query(&self, chrom: &str, start: i64, end: i64) -> Vec<usize> {
        let Some(list) = self.by_chrom.get(chrom) else {
            return Vec::new();
        };

        let mut genes = list.find(start, end);
        genes.sort_unstable();
        genes
    }
}

/// Genes associated with each input region, in region order.
#[derive(Debug, Clone, Default)]
pub struct Associations {
    /// Per region: sorted catalog indices of associated genes.
    pub region_genes: Vec<Vec<usize>>,
}

impl Associations {
    /// Number of regions associated with at least one gene.
    pub fn associated_regions(&self) -> usize {
        self.region_genes.iter().filter(|g| !g.is_empty()).count()
    }
}

/// Associate every region with the genes whose domains it overlaps.
pub fn associate_regions(regions: &[GenomicRegion], index: &DomainIndex) -> Associations {
    let region_genes: Vec<Vec<usize>> = regions
        .iter()
        .map(|r| index.query(&r.chrom, r.start, r.end))
        .collect();

    let associations = Associations { region_genes };
    info!(
        regions = regions.len(),
        associated = associations.associated_regions(),
        "Associated regions with genes"
    );
    associations
}

/// A row of the region-gene association table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationRow {
    pub region: String,
    pub gene_id: String,
    pub gene_name: String,
    pub chrom: String,
    pub tss: i64,
    /// Region midpoint relative to the TSS; positive is downstream on the
    /// gene's strand.
    pub distance: i64,
}

/// Flatten associations into table rows, one per region-gene pair.
pub fn association_rows(
    regions: &[GenomicRegion],
    associations: &Associations,
    catalog: &GeneCatalog,
) -> Vec<AssociationRow> {
    regions
        .iter()
        .zip(&associations.region_genes)
        .flat_map(|(region, genes)| {
            let label = region.label();
            let midpoint = region.midpoint();
            genes.iter().map(move |&g| {
                let gene = catalog.gene(g);
                let distance = match gene.strand {
                    Strand::Positive => midpoint - gene.tss,
                    Strand::Negative => gene.tss - midpoint,
                };
                AssociationRow {
                    region: label.clone(),
                    gene_id: gene.gene_id.clone(),
                    gene_name: gene.gene_name.clone(),
                    chrom: gene.chrom.clone(),
                    tss: gene.tss,
                    distance,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::build_domains;
    use crate::types::{AssociationRule, Gene};

    fn catalog() -> GeneCatalog {
        let genes = [1000, 5000, 9000]
            .iter()
            .enumerate()
            .map(|(i, &tss)| {
                Gene::new(
                    format!("G{}", i + 1),
                    format!("Gene{}", i + 1),
                    "chr1".to_string(),
                    tss,
                    tss + 200,
                    Strand::Positive,
                )
            })
            .collect();
        GeneCatalog::from_genes(genes)
    }

    fn index(rule: AssociationRule) -> DomainIndex {
        let mut config = Config::default();
        config.rule = rule;
        DomainIndex::new(&build_domains(&catalog(), &config))
    }

    #[test]
    fn test_one_closest_region_hits_single_gene() {
        let index = index(AssociationRule::OneClosest);
        assert_eq!(index.query("chr1", 2000, 2100), vec![0]);
        // Straddles the 3001 boundary
        assert_eq!(index.query("chr1", 2990, 3010), vec![0, 1]);
        assert!(index.query("chr2", 2000, 2100).is_empty());
    }

    #[test]
    fn test_two_closest_region_hits_both_neighbours() {
        let index = index(AssociationRule::TwoClosest);
        assert_eq!(index.query("chr1", 6000, 6100), vec![1, 2]);
    }

    #[test]
    fn test_query_boundaries_are_half_open() {
        let index = index(AssociationRule::OneClosest);
        // Domain of G2 is [3001, 7001)
        assert_eq!(index.query("chr1", 7001, 7002), vec![2]);
        assert_eq!(index.query("chr1", 3000, 3001), vec![0]);
    }

    #[test]
    fn test_long_domains_are_found() {
        // The last domain extends far past its TSS
        let index = index(AssociationRule::BasalPlusExt);
        assert_eq!(index.query("chr1", 500_000, 500_001), vec![2]);
    }

    /// Most entries examined by any of 2000 point queries on `n` forward
    /// genes spaced 100 bp apart.
    fn worst_query_cost(n: i64, rule: AssociationRule) -> usize {
        let genes = (0..n)
            .map(|i| {
                let tss = 10_000 + i * 100;
                Gene::new(
                    format!("G{}", i),
                    format!("Gene{}", i),
                    "chr1".to_string(),
                    tss,
                    tss + 50,
                    Strand::Positive,
                )
            })
            .collect();
        let mut config = Config::default();
        config.rule = rule;
        let index = DomainIndex::new(&build_domains(&GeneCatalog::from_genes(genes), &config));
        let list = index.by_chrom.get("chr1").unwrap();

        (0..2000)
            .map(|q| {
                let pos = 10_000 + (q * 7919) % (n * 100);
                list.visit(pos, pos + 1, |_| {})
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_query_cost_does_not_grow_with_gene_count() {
        for rule in [
            AssociationRule::OneClosest,
            AssociationRule::TwoClosest,
            AssociationRule::BasalPlusExt,
        ] {
            let sparse = worst_query_cost(1_000, rule);
            let dense = worst_query_cost(10_000, rule);
            assert!(dense <= sparse + 2, "{}: {} vs {} entries", rule, dense, sparse);
        }
        assert!(worst_query_cost(10_000, AssociationRule::OneClosest) <= 3);
    }

    #[test]
    fn test_association_rows() {
        let catalog = catalog();
        let mut config = Config::default();
        config.rule = AssociationRule::OneClosest;
        let index = DomainIndex::new(&build_domains(&catalog, &config));

        let regions = vec![
            GenomicRegion::new("chr1".to_string(), 2000, 2100, Some("peak1".to_string())),
            GenomicRegion::new("chr1".to_string(), 900, 950, None),
        ];
        let associations = associate_regions(&regions, &index);
        assert_eq!(associations.associated_regions(), 2);

        let rows = association_rows(&regions, &associations, &catalog);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "peak1");
        assert_eq!(rows[0].gene_id, "G1");
        assert_eq!(rows[0].distance, 1050);
        assert_eq!(rows[1].region, "chr1:900-950");
        assert_eq!(rows[1].distance, -75);
    }
}
