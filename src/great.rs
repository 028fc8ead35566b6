//! Orchestration of a full enrichment run.
//!
//! [`LocalGreat`] holds everything that does not depend on the input regions
//! (catalog, domains, domain index, term index), so one engine can analyze
//! several region sets.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::associate::{associate_regions, association_rows, AssociationRow, DomainIndex};
use crate::catalog::GeneCatalog;
use crate::config::Config;
use crate::domain::{build_domains, DomainSet};
use crate::enrichment::{evaluate_category, EnrichmentContext};
use crate::error::Result;
use crate::output::EnrichmentTable;
use crate::parser::{
    parse_bed, parse_chrom_sizes, parse_gaf, parse_gene_bed, parse_gmt, parse_gtf, parse_msigdb_gmt, parse_obo,
    RegionSet,
};
use crate::terms::TermIndex;
use crate::types::{GenomicRegion, Term};

/// Run-level figures reported alongside the tables.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rule: String,
    pub upstream: i64,
    pub downstream: i64,
    pub max_extension: i64,
    /// Regions that passed validation.
    pub regions: usize,
    pub skipped_regions: usize,
    pub hit_genes: usize,
    pub genome_length: i64,
    pub dropped_symbols: usize,
    pub filtered_terms: usize,
    /// Report filter taken from the configuration.
    pub min_genes: usize,
    pub max_fdr: f64,
}

/// Tables and associations of one run.
#[derive(Debug, Clone)]
pub struct GreatResult {
    /// Category -> unfiltered table, categories in input order.
    pub tables: IndexMap<String, EnrichmentTable>,
    pub associations: Vec<AssociationRow>,
    pub summary: RunSummary,
}

impl GreatResult {
    /// Tables restricted to rows with `observed_genes >= min_genes` and
    /// `binom_fdr <= max_fdr`.
    pub fn get_enrichment_tables(&self, min_genes: usize, max_fdr: f64) -> IndexMap<String, EnrichmentTable> {
        self.tables
            .iter()
            .map(|(category, table)| (category.clone(), table.filter(min_genes, max_fdr)))
            .collect()
    }

    /// Tables restricted by the configured `min_genes` and `max_fdr`.
    pub fn reported_tables(&self) -> IndexMap<String, EnrichmentTable> {
        self.get_enrichment_tables(self.summary.min_genes, self.summary.max_fdr)
    }
}

/// Gene annotation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationSource {
    Gtf(PathBuf),
    /// BED6 with the gene name in column 4.
    Bed(PathBuf),
}

impl AnnotationSource {
    pub fn path(&self) -> &Path {
        match self {
            AnnotationSource::Gtf(path) | AnnotationSource::Bed(path) => path.as_path(),
        }
    }

    /// Read the annotation into a catalog.
    pub fn load(&self, config: &Config) -> Result<GeneCatalog> {
        match self {
            AnnotationSource::Gtf(path) => parse_gtf(path, &config.gene_id_tag, &config.gene_name_tag),
            AnnotationSource::Bed(path) => parse_gene_bed(path),
        }
    }
}

/// A gene-set input and how its terms are split into categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneSetSource {
    /// One category, named explicitly or after the file.
    Gmt { category: Option<String>, path: PathBuf },
    /// One category per MSigDB id prefix.
    MsigDb(PathBuf),
    /// One category per GO aspect, with names from an optional OBO file.
    Gaf { path: PathBuf, obo: Option<PathBuf> },
}

impl GeneSetSource {
    /// Parse a GMT argument, `CATEGORY=PATH` or a bare `PATH`.
    pub fn parse(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((category, path)) if !category.is_empty() && !path.is_empty() => GeneSetSource::Gmt {
                category: Some(category.to_string()),
                path: PathBuf::from(path),
            },
            _ => GeneSetSource::Gmt {
                category: None,
                path: PathBuf::from(arg),
            },
        }
    }

    /// Every file this source reads.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            GeneSetSource::Gmt { path, .. } | GeneSetSource::MsigDb(path) => vec![path.as_path()],
            GeneSetSource::Gaf { path, obo } => {
                let mut paths = vec![path.as_path()];
                paths.extend(obo.as_deref());
                paths
            }
        }
    }

    pub fn load(&self) -> Result<Vec<Term>> {
        match self {
            GeneSetSource::Gmt { category, path } => parse_gmt(path, category.as_deref()),
            GeneSetSource::MsigDb(path) => parse_msigdb_gmt(path),
            GeneSetSource::Gaf { path, obo } => {
                let ontology = obo.as_deref().map(parse_obo).transpose()?;
                parse_gaf(path, ontology.as_ref())
            }
        }
    }
}

/// Local enrichment engine.
#[derive(Debug, Clone)]
pub struct LocalGreat {
    catalog: GeneCatalog,
    terms: TermIndex,
    domains: DomainSet,
    index: DomainIndex,
    config: Config,
}

impl LocalGreat {
    /// Validate the configuration, build domains and resolve the terms.
    pub fn new(catalog: GeneCatalog, terms: Vec<Term>, config: Config) -> Result<Self> {
        config.validate()?;

        let domains = build_domains(&catalog, &config);
        let index = DomainIndex::new(&domains);
        let terms = TermIndex::build(terms, &catalog, config.min_term_size, config.max_term_size)?;
        info!(
            terms = terms.len(),
            categories = terms.categories().count(),
            "Indexed gene-set terms"
        );

        Ok(LocalGreat {
            catalog,
            terms,
            domains,
            index,
            config,
        })
    }

    /// Load the annotation, optional chromosome sizes and gene-set files.
    pub fn from_files(
        annotation: &AnnotationSource,
        gene_sets: &[GeneSetSource],
        chrom_sizes: Option<&Path>,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;

        let mut catalog = annotation.load(&config)?;
        if let Some(path) = chrom_sizes {
            catalog = catalog.with_chrom_sizes(parse_chrom_sizes(path)?);
        }

        let mut terms = Vec::new();
        for source in gene_sets {
            terms.extend(source.load()?);
        }

        Self::new(catalog, terms, config)
    }

    pub fn catalog(&self) -> &GeneCatalog {
        &self.catalog
    }

    pub fn domains(&self) -> &DomainSet {
        &self.domains
    }

    pub fn terms(&self) -> &TermIndex {
        &self.terms
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse a BED file with the configured coordinate convention and analyze it.
    pub fn analyze_bed(&self, path: &Path) -> Result<GreatResult> {
        self.analyze(parse_bed(path, self.config.zero_based)?)
    }

    /// Associate regions with genes and test every term.
    pub fn analyze(&self, regions: Vec<GenomicRegion>) -> Result<GreatResult> {
        let region_set = RegionSet::validate(regions, &self.catalog)?;
        let regions = &region_set.regions;

        let associations = associate_regions(regions, &self.index);
        let context = EnrichmentContext::new(regions, &associations, &self.domains, &self.catalog);

        let mut tables = IndexMap::new();
        for (category, terms) in self.terms.categories() {
            let records = evaluate_category(terms, &context, &self.domains, &self.catalog);
            info!(category, terms = records.len(), "Tested category");
            tables.insert(category.to_string(), EnrichmentTable::new(category.to_string(), records));
        }

        let summary = RunSummary {
            rule: self.config.rule.to_string(),
            upstream: self.config.upstream,
            downstream: self.config.downstream,
            max_extension: self.config.max_extension,
            regions: region_set.len(),
            skipped_regions: region_set.skipped,
            hit_genes: context.hit_genes(),
            genome_length: context.genome_length,
            dropped_symbols: self.terms.dropped_symbols(),
            filtered_terms: self.terms.filtered_terms(),
            min_genes: self.config.min_genes,
            max_fdr: self.config.max_fdr,
        };

        Ok(GreatResult {
            tables,
            associations: association_rows(regions, &associations, &self.catalog),
            summary,
        })
    }
}
