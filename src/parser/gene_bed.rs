//! BED6 gene annotation parser.
//!
//! An alternative to GTF: `chrom, start, end, name[, score, strand]` with
//! zero-based half-open coordinates. The name serves as both gene id and
//! display name, and a missing strand column means `+`.

use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

use crate::catalog::GeneCatalog;
use crate::error::{GreatError, Result};
use crate::parser::util::open_input;
use crate::types::{Gene, Strand};

/// Parse a BED gene annotation into a gene catalog.
pub fn parse_gene_bed(path: &Path) -> Result<GeneCatalog> {
    let catalog = parse_gene_bed_reader(open_input(path)?)?;
    info!(
        genes = catalog.len(),
        chromosomes = catalog.chromosomes().count(),
        path = %path.display(),
        "Loaded gene catalog"
    );
    Ok(catalog)
}

pub(crate) fn parse_gene_bed_reader<R: BufRead>(reader: R) -> Result<GeneCatalog> {
    let mut genes = Vec::new();
    let mut short_rows = 0usize;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line_result?;
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("track")
            || trimmed.starts_with("browser")
        {
            continue;
        }

        let malformed = |reason: String| GreatError::MalformedAnnotation {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        if fields.len() < 4 {
            short_rows += 1;
            continue;
        }

        let start: i64 = fields[1]
            .parse()
            .map_err(|_| malformed(format!("invalid start coordinate '{}'", fields[1])))?;
        let end: i64 = fields[2]
            .parse()
            .map_err(|_| malformed(format!("invalid end coordinate '{}'", fields[2])))?;
        if start < 0 || end <= start {
            return Err(malformed(format!("invalid coordinate pair {}-{}", start, end)));
        }

        let (chrom, name) = (fields[0], fields[3]);
        if chrom.is_empty() || name.is_empty() {
            return Err(malformed("missing chromosome or gene name".to_string()));
        }
        let strand = Strand::from_annotation(fields.get(5).copied().unwrap_or("+"));

        genes.push(Gene::new(
            name.to_string(),
            name.to_string(),
            chrom.to_string(),
            start,
            end,
            strand,
        ));
    }

    if short_rows > 0 {
        warn!(short_rows, "Skipped gene rows with fewer than 4 columns");
    }

    Ok(GeneCatalog::from_genes(genes))
}
