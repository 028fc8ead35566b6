//! Parsers for genomic file formats.

pub mod bed;
pub mod chrom_sizes;
pub mod gaf;
pub mod gene_bed;
pub mod gmt;
pub mod gtf;
pub mod obo;
pub mod util;

pub use bed::{parse_bed, RegionSet};
pub use chrom_sizes::parse_chrom_sizes;
pub use gaf::parse_gaf;
pub use gene_bed::parse_gene_bed;
pub use gmt::{parse_gmt, parse_msigdb_gmt};
pub use gtf::parse_gtf;
pub use obo::parse_obo;
