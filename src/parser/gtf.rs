//! GTF gene annotation parser with gzip support.
//!
//! Reads `gene` feature rows from a GTF (or GFF3-style attribute) file and
//! builds the [`GeneCatalog`]. Coordinates are converted from one-based
//! inclusive to zero-based half-open on read.

use std::fs::File;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::GeneCatalog;
use crate::error::{GreatError, Result};
use crate::parser::util::create_buffered_reader;
use crate::types::{Gene, Strand};

/// Parse a GTF file into a gene catalog.
///
/// Supports both plain text and gzip-compressed GTF files. Any malformed
/// `gene` row aborts parsing; no partial catalog is returned.
pub fn parse_gtf(path: &Path, gene_id_tag: &str, gene_name_tag: &str) -> Result<GeneCatalog> {
    let file = File::open(path)?;
    let reader = create_buffered_reader(file, path);

    let catalog = parse_gtf_reader(reader, gene_id_tag, gene_name_tag)?;
    info!(
        genes = catalog.len(),
        chromosomes = catalog.chromosomes().count(),
        path = %path.display(),
        "Loaded gene catalog"
    );
    Ok(catalog)
}

/// Parse GTF data from a reader.
pub(crate) fn parse_gtf_reader<R: BufRead>(
    reader: R,
    gene_id_tag: &str,
    gene_name_tag: &str,
) -> Result<GeneCatalog> {
    let mut genes = Vec::new();
    let mut skipped_features = 0usize;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line_result?;

        // Skip empty lines and comments
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let malformed = |reason: String| GreatError::MalformedAnnotation {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            return Err(malformed(format!(
                "expected 9 tab-separated columns, found {}",
                fields.len()
            )));
        }

        if fields[2] != "gene" {
            skipped_features += 1;
            continue;
        }

        let chrom = fields[0].trim();
        if chrom.is_empty() {
            return Err(malformed("missing chromosome".to_string()));
        }

        let start: i64 = fields[3]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("invalid start coordinate '{}'", fields[3])))?;
        let end: i64 = fields[4]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("invalid end coordinate '{}'", fields[4])))?;
        if start < 1 || end < start {
            return Err(malformed(format!("invalid coordinate pair {}-{}", start, end)));
        }

        let attributes = fields[8];
        let gene_id = extract_attribute(attributes, gene_id_tag)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| malformed(format!("missing {} attribute", gene_id_tag)))?;
        let gene_name = extract_attribute(attributes, gene_name_tag)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| gene_id.clone());

        let strand = Strand::from_annotation(fields[6].trim());

        genes.push(Gene::new(
            gene_id,
            gene_name,
            chrom.to_string(),
            start - 1,
            end,
            strand,
        ));
    }

    debug!(skipped_features, "Ignored non-gene feature rows");

    Ok(GeneCatalog::from_genes(genes))
}

/// Extract an attribute value from the GTF attributes string.
///
/// Accepts GTF (`key "value";`) and GFF3 (`key=value;`) forms.
fn extract_attribute(attributes: &str, key: &str) -> Option<String> {
    for attr in attributes.trim().trim_end_matches(';').split(';') {
        let attr = attr.trim();
        if attr.is_empty() {
            continue;
        }

        // Whichever separator comes first decides between GFF3 and GTF form
        let split_at = match (attr.find('='), attr.find(' ')) {
            (Some(eq), Some(sp)) => eq.min(sp),
            (Some(pos), None) | (None, Some(pos)) => pos,
            (None, None) => continue,
        };
        let (name, value) = (&attr[..split_at], &attr[split_at + 1..]);

        if name.trim() == key {
            return Some(value.trim().trim_matches('"').to_string());
        }
    }
    None
}
