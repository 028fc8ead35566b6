//! BED region parser with gzip support.
//!
//! Parses BED (Browser Extensible Data) files into [`GenomicRegion`]s and
//! validates them against the gene catalog before association.

use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::GeneCatalog;
use crate::error::{GreatError, Result};
use crate::parser::util::open_input;
use crate::types::GenomicRegion;

/// Input regions that survived validation, in file order.
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    pub regions: Vec<GenomicRegion>,
    /// Regions dropped as invalid or on a chromosome without genes.
    pub skipped: usize,
}

impl RegionSet {
    /// Keep regions with `start < end`, a non-negative start and a chromosome
    /// known to the catalog.
    ///
    /// Fails with [`GreatError::EmptyInput`] if nothing remains.
    pub fn validate(regions: Vec<GenomicRegion>, catalog: &GeneCatalog) -> Result<RegionSet> {
        let mut kept = Vec::with_capacity(regions.len());
        let mut skipped = 0usize;

        for region in regions {
            match check_region(&region, catalog) {
                Ok(()) => kept.push(region),
                Err(err) => {
                    debug!("{}", err);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, kept = kept.len(), "Skipped invalid input regions");
        }
        if kept.is_empty() {
            return Err(GreatError::EmptyInput { skipped });
        }

        Ok(RegionSet {
            regions: kept,
            skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn check_region(region: &GenomicRegion, catalog: &GeneCatalog) -> Result<()> {
    let reason = if region.start < 0 {
        "negative start"
    } else if region.start >= region.end {
        "start is not before end"
    } else if !catalog.has_chrom(&region.chrom) {
        "chromosome has no annotated genes"
    } else {
        return Ok(());
    };

    Err(GreatError::InvalidRegion {
        region: format!("{}:{}-{}", region.chrom, region.start, region.end),
        reason: reason.to_string(),
    })
}

/// Parse a BED file into regions in file order.
///
/// Supports both plain text and gzip-compressed BED files. One-based starts
/// are shifted to zero-based when `zero_based` is false.
pub fn parse_bed(path: &Path, zero_based: bool) -> Result<Vec<GenomicRegion>> {
    let regions = parse_bed_reader(open_input(path)?, zero_based)?;
    info!(regions = regions.len(), path = %path.display(), "Loaded input regions");
    Ok(regions)
}

/// Parse BED data from a reader.
pub(crate) fn parse_bed_reader<R: BufRead>(reader: R, zero_based: bool) -> Result<Vec<GenomicRegion>> {
    let mut regions = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        let line = line.trim_end();

        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with("track")
            || line.starts_with("browser")
        {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();

        // Need at least 3 columns: chrom, start, end
        if fields.len() < 3 {
            continue;
        }

        // Header lines have non-numeric coordinates
        let (Ok(mut start), Ok(end)) = (fields[1].trim().parse::<i64>(), fields[2].trim().parse::<i64>())
        else {
            continue;
        };
        if !zero_based {
            start -= 1;
        }

        let name = fields
            .get(3)
            .map(|n| n.trim())
            .filter(|n| !n.is_empty() && *n != ".")
            .map(str::to_string);

        regions.push(GenomicRegion::new(fields[0].to_string(), start, end, name));
    }

    Ok(regions)
}
