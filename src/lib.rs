//! localgreat - Local genomic region enrichment library.
//!
//! This library tests gene-set terms for enrichment near a set of genomic
//! regions without contacting a remote service. Regions are linked to genes
//! through per-gene regulatory domains; terms are scored with a binomial test
//! over regions and a hypergeometric test over genes.
//!
//! # Features
//!
//! - Parse GTF or BED6 gene annotations, region BED, chromosome sizes and
//!   gene sets from GMT, MSigDB GMT or GO annotation (GAF + OBO) files,
//!   with gzip support
//! - Build regulatory domains under the basalPlusExt, twoClosest and
//!   oneClosest association rules
//! - Associate regions with genes through an interval index
//! - Rank terms with Bonferroni and Benjamini-Hochberg correction
//! - Write byte-reproducible TSV tables
//!
//! # Example
//!
//! ```ignore
//! use localgreat::config::Config;
//! use localgreat::great::{AnnotationSource, GeneSetSource, LocalGreat};
//! use std::path::{Path, PathBuf};
//!
//! let annotation = AnnotationSource::Gtf(PathBuf::from("genes.gtf"));
//! let sources = vec![GeneSetSource::parse("GO=go_bp.gmt")];
//! let config = Config {
//!     min_genes: 5,
//!     max_fdr: 0.05,
//!     ..Config::default()
//! };
//! let great = LocalGreat::from_files(&annotation, &sources, None, config)?;
//! let result = great.analyze_bed(Path::new("peaks.bed"))?;
//!
//! for (category, table) in result.reported_tables() {
//!     println!("{}: {} terms", category, table.len());
//! }
//! ```

pub mod associate;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod enrichment;
pub mod error;
pub mod great;
pub mod output;
pub mod parser;
pub mod terms;
pub mod types;

pub use catalog::GeneCatalog;
pub use config::Config;
pub use enrichment::EnrichmentRecord;
pub use error::{GreatError, Result};
pub use great::{AnnotationSource, GeneSetSource, GreatResult, LocalGreat};
pub use output::EnrichmentTable;
pub use parser::RegionSet;
pub use types::{AssociationRule, Gene, GenomicRegion, RegulatoryDomain, Strand, Term};
