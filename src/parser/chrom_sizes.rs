//! Chromosome sizes parser (`chrom<TAB>size`, UCSC `.chrom.sizes` layout).

use ahash::AHashMap;
use std::io::BufRead;
use std::path::Path;

use crate::error::{GreatError, Result};
use crate::parser::util::open_input;

/// Parse a chromosome sizes file.
pub fn parse_chrom_sizes(path: &Path) -> Result<AHashMap<String, i64>> {
    parse_chrom_sizes_reader(open_input(path)?)
}

pub(crate) fn parse_chrom_sizes_reader<R: BufRead>(reader: R) -> Result<AHashMap<String, i64>> {
    let mut sizes = AHashMap::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let (Some(chrom), Some(size)) = (fields.next(), fields.next()) else {
            return Err(GreatError::MalformedInput {
                kind: "chromosome sizes",
                line: idx + 1,
                reason: "expected chromosome and size columns".to_string(),
            });
        };

        let size: i64 = match size.parse() {
            Ok(v) if v > 0 => v,
            _ => {
                return Err(GreatError::MalformedInput {
                    kind: "chromosome sizes",
                    line: idx + 1,
                    reason: format!("invalid size '{}'", size),
                })
            }
        };
        sizes.insert(chrom.to_string(), size);
    }

    Ok(sizes)
}
