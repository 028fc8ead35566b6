//! Library-level tests of domain geometry, association and enrichment.
//!
//! These exercise the public API end to end on synthetic genomes, including
//! a brute-force comparison of the domain index on a large random input.

use localgreat::associate::{associate_regions, DomainIndex};
use localgreat::config::Config;
use localgreat::domain::basal::basal_span;
use localgreat::domain::{build_domains, two_closest};
use localgreat::enrichment::correction::rank_and_correct;
use localgreat::great::LocalGreat;
use localgreat::types::{AssociationRule, Gene, GenomicRegion, Strand, Term};
use localgreat::GeneCatalog;

// -------------------------------------------------------------------------
// Helper functions
// -------------------------------------------------------------------------

/// Small deterministic generator so the large-input checks need no extra crates.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> i64 {
        (self.next() % bound) as i64
    }
}

fn make_gene(id: &str, name: &str, chrom: &str, tss: i64, strand: Strand) -> Gene {
    let (start, end) = match strand {
        Strand::Positive => (tss, tss + 1000),
        Strand::Negative => (tss - 999, tss + 1),
    };
    Gene::new(
        id.to_string(),
        name.to_string(),
        chrom.to_string(),
        start,
        end,
        strand,
    )
}

fn random_catalog(rng: &mut Lcg, genes_per_chrom: usize) -> GeneCatalog {
    let mut genes = Vec::new();
    for chrom in ["chr1", "chr2", "chr3"] {
        for i in 0..genes_per_chrom {
            let strand = if rng.next() % 2 == 0 {
                Strand::Positive
            } else {
                Strand::Negative
            };
            let tss = 1000 + rng.below(20_000_000);
            let id = format!("{}_{}", chrom, i);
            genes.push(make_gene(&id, &id, chrom, tss, strand));
        }
    }
    GeneCatalog::from_genes(genes)
}

fn random_regions(rng: &mut Lcg, count: usize) -> Vec<GenomicRegion> {
    (0..count)
        .map(|i| {
            let chrom = ["chr1", "chr2", "chr3"][(rng.next() % 3) as usize];
            let start = rng.below(21_000_000);
            let end = start + 1 + rng.below(5000);
            GenomicRegion::new(chrom.to_string(), start, end, Some(format!("r{}", i)))
        })
        .collect()
}

fn three_gene_engine(rule: AssociationRule, terms: Vec<Term>) -> LocalGreat {
    let genes = vec![
        make_gene("G1", "Gene1", "chr1", 1000, Strand::Positive),
        make_gene("G2", "Gene2", "chr1", 5000, Strand::Positive),
        make_gene("G3", "Gene3", "chr1", 9000, Strand::Positive),
    ];
    let mut config = Config::default();
    config.rule = rule;
    LocalGreat::new(GeneCatalog::from_genes(genes), terms, config).unwrap()
}

fn term(id: &str, members: &[&str]) -> Term {
    Term::new(
        id.to_string(),
        format!("{} name", id),
        "test".to_string(),
        members.iter().map(|m| m.to_string()).collect(),
    )
}

// -------------------------------------------------------------------------
// 1. Domain geometry
// -------------------------------------------------------------------------

mod test_domain_geometry {
    use super::*;

    #[test]
    fn test_basal_plus_ext_overlaps_stay_inside_basal_domains() {
        let mut rng = Lcg(7);
        let catalog = random_catalog(&mut rng, 400);
        let config = Config::default();
        let domains = build_domains(&catalog, &config);

        for chrom in ["chr1", "chr2", "chr3"] {
            let on_chrom: Vec<_> = domains.domains().iter().filter(|d| d.chrom == chrom).collect();
            for (i, a) in on_chrom.iter().enumerate() {
                for b in on_chrom.iter().skip(i + 1) {
                    let lo = a.start.max(b.start);
                    let hi = a.end.min(b.end);
                    if lo >= hi {
                        continue;
                    }
                    for d in [a, b] {
                        let (bs, be) = basal_span(catalog.gene(d.gene), config.upstream, config.downstream);
                        assert!(
                            bs.max(0) <= lo && hi <= be,
                            "overlap [{}, {}) escapes basal domain of {}",
                            lo,
                            hi,
                            catalog.gene(d.gene).gene_id
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_basal_plus_ext_covers_gaps_when_uncapped() {
        let mut rng = Lcg(11);
        let catalog = random_catalog(&mut rng, 200);
        let config = Config {
            max_extension: 100_000_000,
            ..Config::default()
        };
        let domains = build_domains(&catalog, &config);

        // With an unbounded cap every chromosome is covered from 0 to the last domain end
        for chrom in ["chr1", "chr2", "chr3"] {
            let mut spans: Vec<(i64, i64)> = domains
                .domains()
                .iter()
                .filter(|d| d.chrom == chrom)
                .map(|d| (d.start, d.end))
                .collect();
            spans.sort_unstable();
            let mut reach = 0;
            for (start, end) in spans {
                assert!(start <= reach, "uncovered gap before {} on {}", start, chrom);
                reach = reach.max(end);
            }
        }
    }

    #[test]
    fn test_two_closest_borders_are_monotone() {
        let mut rng = Lcg(3);
        let catalog = random_catalog(&mut rng, 300);
        let genes = catalog.genes_on("chr2");
        let spans = two_closest(genes, 50_000);

        for pair in spans.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
            assert!(pair[0].1 <= pair[1].1);
        }
        for (i, span) in spans.iter().enumerate().skip(2) {
            // Gene i never reaches back past gene i - 1's TSS
            assert!(span.0 >= genes[i - 1].tss);
            assert!(spans[i - 2].1 <= genes[i - 1].tss);
        }
    }

    #[test]
    fn test_one_closest_partitions_without_overlap() {
        let mut rng = Lcg(5);
        let catalog = random_catalog(&mut rng, 300);
        let config = Config {
            rule: AssociationRule::OneClosest,
            ..Config::default()
        };
        let domains = build_domains(&catalog, &config);

        let mut by_chrom: Vec<_> = domains.domains().to_vec();
        by_chrom.sort_by(|a, b| a.chrom.cmp(&b.chrom).then(a.start.cmp(&b.start)));
        for pair in by_chrom.windows(2) {
            if pair[0].chrom == pair[1].chrom {
                assert!(pair[0].end <= pair[1].start);
            }
        }
    }
}

// -------------------------------------------------------------------------
// 2. Region association
// -------------------------------------------------------------------------

mod test_association {
    use super::*;

    #[test]
    fn test_index_matches_brute_force_on_large_input() {
        let mut rng = Lcg(42);
        let catalog = random_catalog(&mut rng, 1500);
        let regions = random_regions(&mut rng, 5000);

        for rule in [
            AssociationRule::BasalPlusExt,
            AssociationRule::TwoClosest,
            AssociationRule::OneClosest,
        ] {
            let config = Config {
                rule,
                max_extension: 200_000,
                ..Config::default()
            };
            let domains = build_domains(&catalog, &config);
            let index = DomainIndex::new(&domains);
            let associations = associate_regions(&regions, &index);

            for (region, genes) in regions.iter().zip(&associations.region_genes) {
                let mut expected: Vec<usize> = domains
                    .domains()
                    .iter()
                    .filter(|d| d.chrom == region.chrom && d.overlaps(region.start, region.end))
                    .map(|d| d.gene)
                    .collect();
                expected.sort_unstable();
                assert_eq!(genes, &expected, "{} under {}", region.label(), rule);
            }
        }
    }

    #[test]
    fn test_two_closest_point_in_at_most_two_domains() {
        let mut rng = Lcg(9);
        let catalog = random_catalog(&mut rng, 500);
        let config = Config {
            rule: AssociationRule::TwoClosest,
            ..Config::default()
        };
        let index = DomainIndex::new(&build_domains(&catalog, &config));

        for _ in 0..5000 {
            let pos = rng.below(21_000_000);
            assert!(index.query("chr1", pos, pos + 1).len() <= 2);
        }
    }
}

// -------------------------------------------------------------------------
// 3. Enrichment scenarios
// -------------------------------------------------------------------------

mod test_enrichment {
    use super::*;

    #[test]
    fn test_one_closest_single_gene_scenario() {
        let great = three_gene_engine(AssociationRule::OneClosest, vec![term("T1", &["Gene1"])]);
        let regions = vec![GenomicRegion::new("chr1".to_string(), 2000, 2100, None)];
        let result = great.analyze(regions).unwrap();

        let record = &result.tables["test"].records[0];
        assert_eq!(record.observed_genes, 1);
        assert!(record.binom_p < 1.0);
        assert_eq!(result.associations.len(), 1);
        assert_eq!(result.associations[0].gene_name, "Gene1");
    }

    #[test]
    fn test_unknown_symbol_is_dropped_not_fatal() {
        let great = three_gene_engine(
            AssociationRule::BasalPlusExt,
            vec![term("T1", &["Gene1", "Gene2", "NOT_IN_ANNOTATION"])],
        );
        assert!(great.terms().dropped_symbols() > 0);

        let regions = vec![GenomicRegion::new("chr1".to_string(), 900, 1100, None)];
        let result = great.analyze(regions).unwrap();
        assert_eq!(result.tables["test"].records[0].total_genes, 2);
    }

    #[test]
    fn test_filtered_tables_are_monotone_subsets() {
        let mut rng = Lcg(17);
        let catalog = random_catalog(&mut rng, 300);
        let ids: Vec<String> = catalog.genes().iter().map(|g| g.gene_id.clone()).collect();

        // Terms of consecutive genes, so some sit under dense regions
        let terms: Vec<Term> = ids
            .chunks(15)
            .enumerate()
            .map(|(i, chunk)| {
                Term::new(
                    format!("T{:03}", i),
                    format!("block {}", i),
                    "blocks".to_string(),
                    chunk.to_vec(),
                )
            })
            .collect();
        let great = LocalGreat::new(catalog, terms, Config::default()).unwrap();

        let mut regions = random_regions(&mut rng, 300);
        let dense_gene = great.catalog().genes_on("chr1")[20].clone();
        for i in 0..40 {
            regions.push(GenomicRegion::new(
                "chr1".to_string(),
                dense_gene.tss + i * 10,
                dense_gene.tss + i * 10 + 50,
                None,
            ));
        }
        let result = great.analyze(regions).unwrap();

        let full = &result.tables["blocks"];
        let strict_tables = result.get_enrichment_tables(5, 0.05);
        let strict = &strict_tables["blocks"];
        for record in &strict.records {
            assert!(record.observed_genes >= 5);
            assert!(record.binom_fdr <= 0.05);
            assert!(full.records.contains(record));
        }

        let mut previous = usize::MAX;
        for max_fdr in [1.0, 0.5, 0.1, 0.05, 0.01, 0.0] {
            let rows = result.get_enrichment_tables(1, max_fdr)["blocks"].len();
            assert!(rows <= previous);
            previous = rows;
        }
    }

    #[test]
    fn test_corrections_bound_raw_pvalues() {
        let mut rng = Lcg(23);
        let catalog = random_catalog(&mut rng, 200);
        let ids: Vec<String> = catalog.genes().iter().map(|g| g.gene_id.clone()).collect();
        let terms: Vec<Term> = ids
            .chunks(7)
            .enumerate()
            .map(|(i, chunk)| Term::new(format!("T{}", i), String::new(), "c".to_string(), chunk.to_vec()))
            .collect();
        let great = LocalGreat::new(catalog, terms, Config::default()).unwrap();
        let result = great.analyze(random_regions(&mut rng, 500)).unwrap();

        let records = &result.tables["c"].records;
        for record in records {
            assert!(record.binom_fdr >= record.binom_p);
            assert!(record.binom_bonferroni >= record.binom_p);
            assert!(record.hyper_fdr >= record.hyper_p);
            assert!(record.hyper_bonferroni >= record.hyper_p);
            assert!(record.binom_fdr <= 1.0 && record.hyper_fdr <= 1.0);
        }
        // Rows are in binomial rank order, so the q-values never decrease
        for pair in records.windows(2) {
            assert_eq!(pair[0].binom_rank + 1, pair[1].binom_rank);
            assert!(pair[0].binom_fdr <= pair[1].binom_fdr);
        }
    }

    #[test]
    fn test_results_identical_across_thread_pools() {
        let run = |threads: usize| {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap();
            pool.install(|| {
                let mut rng = Lcg(31);
                let catalog = random_catalog(&mut rng, 250);
                let ids: Vec<String> = catalog.genes().iter().map(|g| g.gene_id.clone()).collect();
                let terms: Vec<Term> = ids
                    .chunks(10)
                    .enumerate()
                    .map(|(i, c)| Term::new(format!("T{}", i), String::new(), "c".to_string(), c.to_vec()))
                    .collect();
                let great = LocalGreat::new(catalog, terms, Config::default()).unwrap();
                great.analyze(random_regions(&mut rng, 400)).unwrap().tables
            })
        };

        assert_eq!(run(1), run(4));
    }

    #[test]
    fn test_rank_and_correct_orders_ties_by_id() {
        let adjusted = rank_and_correct(&[1.0, 1.0, 0.5], &["b", "a", "c"]);
        assert_eq!(adjusted[0].rank, 3);
        assert_eq!(adjusted[1].rank, 2);
        assert_eq!(adjusted[2].rank, 1);
    }
}
